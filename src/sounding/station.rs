use metfor::{Feet, Quantity};
use serde::Deserialize;

use crate::error::{Result, SoundingError};

/// A ground station charts are produced for.
///
/// Station records are loaded from external configuration and shared read-only by
/// every analysis.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Station {
    name: String,
    coord: Coordinate,
    /// Ground elevation in feet.
    elevation: f64,
    /// Identifier of this station at the surface temperature provider.
    temp_station_id: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
struct Coordinate {
    lat: f64,
    lon: f64,
}

impl Station {
    /// Create a new station record.
    pub fn new<S>(name: S, lat: f64, lon: f64, elevation: Feet, temp_station_id: u32) -> Self
    where
        S: Into<String>,
    {
        Station {
            name: name.into(),
            coord: Coordinate { lat, lon },
            elevation: elevation.unpack(),
            temp_station_id,
        }
    }

    /// The display name of the station.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Latitude and longitude.
    #[inline]
    pub fn location(&self) -> (f64, f64) {
        (self.coord.lat, self.coord.lon)
    }

    /// Ground elevation.
    #[inline]
    pub fn elevation(&self) -> Feet {
        Feet(self.elevation)
    }

    /// Identifier of this station at the surface temperature provider.
    #[inline]
    pub fn temp_station_id(&self) -> u32 {
        self.temp_station_id
    }
}

/// The full set of known stations, looked up by display name.
#[derive(Debug, Clone, Default)]
pub struct StationTable {
    stations: Vec<Station>,
}

impl StationTable {
    /// Build a table from station records, ordered north to south.
    pub fn new(mut stations: Vec<Station>) -> Self {
        stations.sort_by(|a, b| {
            b.coord
                .lat
                .partial_cmp(&a.coord.lat)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        StationTable { stations }
    }

    /// Look a station up by its display name.
    pub fn get(&self, name: &str) -> Result<&Station> {
        self.stations
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| SoundingError::StationNotFound(name.to_string()))
    }

    /// All station names, north to south.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.stations.iter().map(|s| s.name.as_str())
    }

    /// The number of stations in the table.
    #[inline]
    pub fn len(&self) -> usize {
        self.stations.len()
    }

    /// Returns `true` when the table holds no stations.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }
}
