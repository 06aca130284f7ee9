#![warn(missing_docs)]
//! The sounding analysis pipeline behind a soaring weather chart service.
//!
//! Raw fixed width sounding tables are fetched from upstream providers and parsed
//! into a [`VerticalProfile`]; a [`ChartAnalysis`] of convective trigger and ceiling
//! indices is computed from a profile together with a ground temperature and a ground
//! elevation; and short lived caches with single flight coalescing sit at every
//! upstream boundary because the providers are slow, rate sensitive and occasionally
//! missing data. The [`SoundingService`] ties the pieces together for the web layer,
//! handing finished analyses to an external [`ChartRenderer`].

//
// API
//
pub use crate::{
    analysis::{calculate, ChartAnalysis, DALR, LIM_H, LIM_T, TRIGGER_HEIGHT},
    cache::TtlCache,
    error::{Result, SoundingError},
    fetch::{HttpTextFetcher, TextFetcher},
    interpolation::linear_interpolate,
    parse::TableFormat,
    service::{ChartRenderer, SoundingService},
    sounding::{Station, StationTable, VerticalProfile, MAX_PROFILE_HEIGHT, MIN_PROFILE_LEN},
    sources::{SoundingSite, SourceAdapter, MAX_FORECAST_DAYS},
    temperature::{TemperatureEndpoints, TemperatureProvider},
};

pub mod timefmt;

//
// Internal use only
//

mod analysis;
mod cache;
mod error;
mod fetch;
mod interpolation;
mod parse;
mod service;
mod sounding;
mod sources;
mod temperature;

#[cfg(test)]
mod test_data;
