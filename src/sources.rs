//! Fetch vertical profiles from the upstream sounding providers.
//!
//! One adapter instance owns its HTTP transport and its cache; there is no process
//! wide state. Current conditions come from the university observation site, forecast
//! profiles from the GSD model sounding service. Both providers publish on fixed
//! observation slots, and a slot that comes up empty is retried exactly once at a
//! fallback slot before the fetch is reported as having no data.

use std::{sync::Arc, time::Duration};

use chrono::{Local, NaiveDate, NaiveDateTime, Timelike};
use tracing::{info, warn};

use crate::{
    cache::TtlCache,
    error::{Result, SoundingError},
    fetch::TextFetcher,
    parse::TableFormat,
    sounding::VerticalProfile,
};

pub(crate) mod gsd;
pub(crate) mod uwyo;

/// How long a fetched (or known empty) slot is served from memory.
const SOUNDING_CACHE_TTL: Duration = Duration::from_secs(60 * 60);

/// Forecast requests further ahead than this are rejected outright.
pub const MAX_FORECAST_DAYS: i64 = 5;

/// The fixed geographic point soundings are requested for.
///
/// All ground stations share one sounding site: the upper air profile varies far less
/// across the covered region than the surface conditions do.
#[derive(Debug, Clone, PartialEq)]
pub struct SoundingSite {
    /// Region name at the observation provider.
    pub region: String,
    /// Station number at the observation provider.
    pub station_num: u32,
    /// Latitude and longitude for model soundings.
    pub coord: (f64, f64),
}

/// Fetches and caches vertical profiles from the upstream providers.
#[derive(Debug)]
pub struct SourceAdapter<F> {
    pub(crate) fetcher: F,
    site: SoundingSite,
    cache: TtlCache<String, Option<Arc<VerticalProfile>>>,
}

impl<F: TextFetcher> SourceAdapter<F> {
    /// Create an adapter for one sounding site.
    pub fn new(fetcher: F, site: SoundingSite) -> Self {
        SourceAdapter {
            fetcher,
            site,
            cache: TtlCache::new(),
        }
    }

    /// Fetch today's observed sounding.
    ///
    /// Tries the noon observation first and falls back to midnight, returning the
    /// profile together with the slot it came from.
    pub fn current(&self) -> Result<(Arc<VerticalProfile>, NaiveDateTime)> {
        self.current_at(Local::now().naive_local())
    }

    /// The testable seam behind [`SourceAdapter::current`].
    pub fn current_at(&self, now: NaiveDateTime) -> Result<(Arc<VerticalProfile>, NaiveDateTime)> {
        let noon = at_hour(now.date(), 12);
        let midnight = at_hour(now.date(), 0);

        for slot in [noon, midnight].iter().copied() {
            let url = uwyo::url(&self.site, slot);
            if let Some(profile) = self.fetch_slot(&url, TableFormat::Uwyo)? {
                return Ok((profile, slot));
            }
            warn!(slot = %slot, "no observed sounding for slot");
        }

        Err(SoundingError::NoSoundingData)
    }

    /// Fetch a forecast sounding valid near `reference`.
    ///
    /// The reference time is rounded down to the provider's three hour slot grid; if
    /// that slot has no data the midnight slot of the same day is tried once.
    pub fn forecast(&self, reference: NaiveDateTime) -> Result<(Arc<VerticalProfile>, NaiveDateTime)> {
        self.forecast_at(reference, Local::now().naive_local())
    }

    /// The testable seam behind [`SourceAdapter::forecast`].
    pub fn forecast_at(
        &self,
        reference: NaiveDateTime,
        now: NaiveDateTime,
    ) -> Result<(Arc<VerticalProfile>, NaiveDateTime)> {
        if reference > now + chrono::Duration::days(MAX_FORECAST_DAYS) {
            return Err(SoundingError::InvalidTimeRange);
        }

        let primary = observation_slot(reference);
        let fallback = at_hour(primary.date(), 0);

        let mut slots = vec![primary];
        if fallback != primary {
            slots.push(fallback);
        }

        for slot in slots {
            let url = gsd::url(&self.site, slot);
            if let Some(profile) = self.fetch_slot(&url, TableFormat::Gsd)? {
                return Ok((profile, slot));
            }
            warn!(slot = %slot, "no forecast sounding for slot");
        }

        Err(SoundingError::NoSoundingData)
    }

    // One cached network round trip for one constructed URL. An empty-but-healthy
    // response is cached as `None` so the fallback decision inside the expiry window
    // does not re-hit the network either.
    fn fetch_slot(
        &self,
        url: &str,
        format: TableFormat,
    ) -> Result<Option<Arc<VerticalProfile>>> {
        self.cache
            .get_or_try_insert_with(url.to_string(), SOUNDING_CACHE_TTL, || {
                info!(%url, "collecting sounding data");

                let body = self.fetcher.fetch_text(url)?;

                let table = match format {
                    TableFormat::Uwyo => match uwyo::extract_preformatted(&body) {
                        Some(table) => table.to_string(),
                        None => {
                            warn!(%url, "no preformatted data block in response");
                            return Ok(None);
                        }
                    },
                    TableFormat::Gsd => body,
                };

                match format.parse(&table) {
                    Ok(profile) => Ok(Some(Arc::new(profile))),
                    Err(SoundingError::Parse) | Err(SoundingError::InsufficientData(_)) => {
                        warn!(%url, "response held no usable sounding table");
                        Ok(None)
                    }
                    Err(err) => Err(err),
                }
            })
    }
}

/// Round a time down to the provider's three hour observation slot grid.
pub(crate) fn observation_slot(t: NaiveDateTime) -> NaiveDateTime {
    at_hour(t.date(), t.hour() - t.hour() % 3)
}

fn at_hour(date: NaiveDate, hour: u32) -> NaiveDateTime {
    date.and_hms_opt(hour, 0, 0).expect("hour out of range")
}
