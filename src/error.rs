//! Error types for the sounding-convect crate.
use chrono::NaiveDate;
use thiserror::Error;

/// Error type for the crate.
#[derive(Clone, PartialEq, Eq, Debug, Error)]
pub enum SoundingError {
    /// The upstream response did not contain a recognizable data table.
    #[error("no sounding data table found in the upstream response")]
    Parse,
    /// The data table was found but the valid run of levels is too short.
    #[error("sounding has {0} valid levels, fewer than the minimum")]
    InsufficientData(usize),
    /// Both the primary and the fallback observation slots came up empty.
    #[error("no sounding data available for the requested time")]
    NoSoundingData,
    /// The requested time is too far in the future to have a sounding.
    #[error("requested time is out of the supported range")]
    InvalidTimeRange,
    /// Transport failure or non-200 status from an upstream provider.
    #[error("upstream provider unavailable: {0}")]
    UpstreamUnavailable(String),
    /// The temperature provider has no forecast for the requested date.
    #[error("no temperature forecast available for {0}")]
    NoForecastForDate(NaiveDate),
    /// The named station is not in the station table.
    #[error("station not found: {0}")]
    StationNotFound(String),
    /// A user supplied date token did not match the expected format.
    #[error("invalid date format: {0}")]
    InvalidDateFormat(String),
}

/// Shorthand for results.
pub type Result<T> = std::result::Result<T, SoundingError>;
