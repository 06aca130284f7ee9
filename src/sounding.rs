//! Data type and methods to store a vertical atmospheric profile.

use metfor::{Celsius, Feet, HectoPascal, Knots, WindSpdDir};
use optional::Optioned;

pub use self::station::{Station, StationTable};

/// Minimum number of levels for a profile to be usable in an analysis.
pub const MIN_PROFILE_LEN: usize = 5;

/// Levels above this height are discarded when a profile is built.
pub const MAX_PROFILE_HEIGHT: Feet = Feet(15_000.0);

/// A vertical profile of the atmosphere above a single point.
///
/// The upper air variables are stored in parallel vectors indexed by level, ordered by
/// ascending height. Height is required at every level; any other variable may be
/// missing at any level. All vectors have the same length.
///
/// A profile is built once from an upstream data table and never modified afterwards,
/// so it can be shared freely between analyses.
#[derive(Clone, Debug, Default)]
pub struct VerticalProfile {
    height: Vec<Feet>,
    pressure: Vec<Optioned<HectoPascal>>,
    temperature: Vec<Optioned<Celsius>>,
    dew_point: Vec<Optioned<Celsius>>,
    wind: Vec<Optioned<WindSpdDir<Knots>>>,
}

impl VerticalProfile {
    /// Build a profile from parallel level data.
    ///
    /// The inputs are truncated to their common length, levels above
    /// [`MAX_PROFILE_HEIGHT`] are discarded, and the result is rejected with
    /// [`crate::SoundingError::InsufficientData`] when fewer than [`MIN_PROFILE_LEN`]
    /// levels remain.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use metfor::{Celsius, Feet};
    /// use optional::some;
    /// use sounding_convect::VerticalProfile;
    ///
    /// let height: Vec<_> = (0..10).map(|i| Feet(f64::from(i) * 1000.0)).collect();
    /// let temp: Vec<_> = (0..10).map(|i| some(Celsius(25.0 - f64::from(i) * 2.0))).collect();
    /// let dew: Vec<_> = (0..10).map(|i| some(Celsius(10.0 - f64::from(i) * 2.0))).collect();
    ///
    /// let profile = VerticalProfile::new(height, vec![], temp, dew, vec![]).unwrap();
    /// assert_eq!(profile.len(), 10);
    /// ```
    pub fn new(
        height: Vec<Feet>,
        pressure: Vec<Optioned<HectoPascal>>,
        temperature: Vec<Optioned<Celsius>>,
        dew_point: Vec<Optioned<Celsius>>,
        wind: Vec<Optioned<WindSpdDir<Knots>>>,
    ) -> crate::error::Result<Self> {
        let mut profile = VerticalProfile {
            height,
            pressure,
            temperature,
            dew_point,
            wind,
        };

        let keep = profile
            .height
            .iter()
            .take_while(|&&h| h <= MAX_PROFILE_HEIGHT)
            .count();

        profile.height.truncate(keep);
        profile.pressure.resize(keep, Optioned::default());
        profile.temperature.resize(keep, Optioned::default());
        profile.dew_point.resize(keep, Optioned::default());
        profile.wind.resize(keep, Optioned::default());

        if profile.height.len() < MIN_PROFILE_LEN {
            return Err(crate::error::SoundingError::InsufficientData(
                profile.height.len(),
            ));
        }

        Ok(profile)
    }

    /// The number of levels in the profile.
    #[inline]
    pub fn len(&self) -> usize {
        self.height.len()
    }

    /// Returns `true` when the profile holds no levels at all.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.height.is_empty()
    }

    /// Get the height profile, ascending, in feet.
    #[inline]
    pub fn height_profile(&self) -> &[Feet] {
        &self.height
    }

    /// Get the pressure profile.
    #[inline]
    pub fn pressure_profile(&self) -> &[Optioned<HectoPascal>] {
        &self.pressure
    }

    /// Get the temperature profile.
    #[inline]
    pub fn temperature_profile(&self) -> &[Optioned<Celsius>] {
        &self.temperature
    }

    /// Get the dew point profile.
    #[inline]
    pub fn dew_point_profile(&self) -> &[Optioned<Celsius>] {
        &self.dew_point
    }

    /// Get the wind profile.
    #[inline]
    pub fn wind_profile(&self) -> &[Optioned<WindSpdDir<Knots>>] {
        &self.wind
    }
}

mod station;
