//! Resolve a ground station's maximum surface temperature from the forecast
//! provider.
//!
//! The provider has two endpoint shapes: a "latest reading" channel list used for
//! today's conditions and a "daily forecast" mapping keyed by ISO date used for the
//! days ahead. Both responses are cached per station so a page of charts does not
//! hammer the provider.

use std::{collections::BTreeMap, sync::Arc, time::Duration};

use chrono::{Local, NaiveDate};
use metfor::Celsius;
use serde::Deserialize;
use tracing::{info, warn};

use crate::{
    cache::TtlCache,
    error::{Result, SoundingError},
    fetch::TextFetcher,
    sounding::Station,
};

const RESPONSE_CACHE_TTL: Duration = Duration::from_secs(60 * 60);
const FORECAST_DATES_TTL: Duration = Duration::from_secs(3 * 60 * 60);

/// Name of the daily maximum temperature channel in latest-reading responses.
const MAX_TEMP_CHANNEL: &str = "TDmax";

/// Endpoint bases of the temperature provider; the station id is appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemperatureEndpoints {
    /// Daily forecast mapping endpoint.
    pub forecast_base: String,
    /// Latest reading channel list endpoint.
    pub latest_base: String,
}

impl Default for TemperatureEndpoints {
    fn default() -> Self {
        TemperatureEndpoints {
            forecast_base: "https://ims.gov.il/he/full_forecast_data".to_string(),
            latest_base: "https://api.ims.gov.il/v1/envista/stations/latest".to_string(),
        }
    }
}

/// Fetches and caches surface temperature readings and forecasts.
#[derive(Debug)]
pub struct TemperatureProvider<F> {
    pub(crate) fetcher: F,
    endpoints: TemperatureEndpoints,
    forecast_cache: TtlCache<u32, Arc<BTreeMap<NaiveDate, Celsius>>>,
    latest_cache: TtlCache<u32, Celsius>,
    dates_cache: TtlCache<u32, Arc<Vec<NaiveDate>>>,
}

// The daily forecast body: a mapping from ISO date to per-day blocks. Values arrive
// as strings.
#[derive(Debug, Deserialize)]
struct DayForecast {
    daily: DailyValues,
}

#[derive(Debug, Deserialize)]
struct DailyValues {
    maximum_temperature: String,
}

// The latest reading body: a list of named channels.
#[derive(Debug, Deserialize)]
struct LatestReading {
    channels: Vec<Channel>,
}

#[derive(Debug, Deserialize)]
struct Channel {
    name: String,
    value: f64,
}

impl<F: TextFetcher> TemperatureProvider<F> {
    /// Create a provider against the default endpoints.
    pub fn new(fetcher: F) -> Self {
        Self::with_endpoints(fetcher, TemperatureEndpoints::default())
    }

    /// Create a provider against explicit endpoints.
    pub fn with_endpoints(fetcher: F, endpoints: TemperatureEndpoints) -> Self {
        TemperatureProvider {
            fetcher,
            endpoints,
            forecast_cache: TtlCache::new(),
            latest_cache: TtlCache::new(),
            dates_cache: TtlCache::new(),
        }
    }

    /// Today's maximum surface temperature at a station, from the latest reading
    /// endpoint.
    pub fn current_max(&self, station: &Station) -> Result<Celsius> {
        let station_id = station.temp_station_id();

        self.latest_cache
            .get_or_try_insert_with(station_id, RESPONSE_CACHE_TTL, || {
                info!(station_id, "collecting latest temperature reading");

                let url = format!("{}/{}", self.endpoints.latest_base, station_id);
                let body = self.fetcher.fetch_text(&url)?;
                let reading: LatestReading = serde_json::from_str(&body)
                    .map_err(|err| SoundingError::UpstreamUnavailable(err.to_string()))?;

                reading
                    .channels
                    .iter()
                    .find(|c| c.name == MAX_TEMP_CHANNEL)
                    .map(|c| Celsius(c.value))
                    .ok_or_else(|| {
                        warn!(station_id, "latest reading has no {} channel", MAX_TEMP_CHANNEL);
                        SoundingError::NoForecastForDate(Local::now().date_naive())
                    })
            })
    }

    /// Maximum surface temperature forecast for a station on an exact date.
    pub fn forecast_max(&self, station: &Station, date: NaiveDate) -> Result<Celsius> {
        let forecast = self.forecast_table(station)?;

        forecast.get(&date).copied().ok_or_else(|| {
            warn!(
                station_id = station.temp_station_id(),
                %date,
                available = forecast.len(),
                "no temperature forecast for date"
            );
            SoundingError::NoForecastForDate(date)
        })
    }

    /// The temperature for a station on a date, routed to the right endpoint.
    ///
    /// Comparison with `today` is by calendar date only, so a request for any hour of
    /// the current day reads the latest observation rather than the forecast table.
    pub fn max_for(&self, station: &Station, date: NaiveDate, today: NaiveDate) -> Result<Celsius> {
        if date == today {
            self.current_max(station)
        } else {
            self.forecast_max(station, date)
        }
    }

    /// The dates the provider currently has forecasts for, ascending.
    pub fn forecast_dates(&self, station: &Station) -> Result<Arc<Vec<NaiveDate>>> {
        let station_id = station.temp_station_id();

        self.dates_cache
            .get_or_try_insert_with(station_id, FORECAST_DATES_TTL, || {
                let forecast = self.forecast_table(station)?;
                Ok(Arc::new(forecast.keys().copied().collect()))
            })
    }

    fn forecast_table(&self, station: &Station) -> Result<Arc<BTreeMap<NaiveDate, Celsius>>> {
        let station_id = station.temp_station_id();

        self.forecast_cache
            .get_or_try_insert_with(station_id, RESPONSE_CACHE_TTL, || {
                info!(station_id, "collecting temperature forecast");

                let url = format!("{}/{}", self.endpoints.forecast_base, station_id);
                let body = self.fetcher.fetch_text(&url)?;
                let days: BTreeMap<String, DayForecast> = serde_json::from_str(&body)
                    .map_err(|err| SoundingError::UpstreamUnavailable(err.to_string()))?;

                let mut forecast = BTreeMap::new();
                for (date_text, day) in days {
                    let date = match NaiveDate::parse_from_str(&date_text, "%Y-%m-%d") {
                        Ok(date) => date,
                        Err(_) => {
                            warn!(station_id, key = %date_text, "skipping unparseable forecast key");
                            continue;
                        }
                    };
                    match day.daily.maximum_temperature.parse::<f64>() {
                        Ok(value) => {
                            forecast.insert(date, Celsius(value));
                        }
                        Err(_) => {
                            warn!(station_id, %date, "skipping unparseable forecast value");
                        }
                    }
                }

                Ok(Arc::new(forecast))
            })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test_data::ScriptedFetcher;
    use metfor::{Feet, Quantity};

    fn station() -> Station {
        Station::new("Midlands", 32.6, 35.2, Feet(300.0), 513)
    }

    fn endpoints() -> TemperatureEndpoints {
        TemperatureEndpoints {
            forecast_base: "http://temps.test/forecast".to_string(),
            latest_base: "http://temps.test/latest".to_string(),
        }
    }

    const FORECAST_BODY: &str = r#"{
        "2018-08-13": {"daily": {"maximum_temperature": "32", "minimum_temperature": "21"}},
        "2018-08-14": {"daily": {"maximum_temperature": "33", "minimum_temperature": "22"}},
        "2018-08-15": {"daily": {"maximum_temperature": "31", "minimum_temperature": "20"}}
    }"#;

    const LATEST_BODY: &str = r#"{
        "channels": [
            {"name": "TD", "value": 28.4},
            {"name": "TDmax", "value": 31.2},
            {"name": "WS", "value": 6.1}
        ]
    }"#;

    fn provider(fetcher: ScriptedFetcher) -> TemperatureProvider<ScriptedFetcher> {
        TemperatureProvider::with_endpoints(fetcher, endpoints())
    }

    fn scripted() -> ScriptedFetcher {
        ScriptedFetcher::new(|url: &str| {
            if url.starts_with("http://temps.test/forecast") {
                Ok(FORECAST_BODY.to_string())
            } else {
                Ok(LATEST_BODY.to_string())
            }
        })
    }

    #[test]
    fn forecast_lookup_is_exact_date() {
        let provider = provider(scripted());
        let date = NaiveDate::from_ymd_opt(2018, 8, 14).unwrap();

        let max = provider.forecast_max(&station(), date).unwrap();
        assert!((max.unpack() - 33.0).abs() < 1.0e-9);
    }

    #[test]
    fn absent_date_is_a_no_forecast_error() {
        let provider = provider(scripted());
        let date = NaiveDate::from_ymd_opt(2018, 8, 17).unwrap();

        match provider.forecast_max(&station(), date) {
            Err(SoundingError::NoForecastForDate(d)) => assert_eq!(d, date),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn today_routes_to_the_latest_reading_endpoint() {
        let provider = provider(scripted());
        let today = NaiveDate::from_ymd_opt(2018, 8, 13).unwrap();

        let max = provider.max_for(&station(), today, today).unwrap();

        assert!((max.unpack() - 31.2).abs() < 1.0e-9);
        let urls = provider.fetcher.requested_urls();
        assert_eq!(urls.len(), 1);
        assert!(urls[0].starts_with("http://temps.test/latest"));
    }

    #[test]
    fn responses_are_cached_per_station() {
        let provider = provider(scripted());
        let date = NaiveDate::from_ymd_opt(2018, 8, 14).unwrap();

        provider.forecast_max(&station(), date).unwrap();
        provider
            .forecast_max(&station(), date.succ_opt().unwrap())
            .unwrap();

        assert_eq!(provider.fetcher.calls(), 1);
    }

    #[test]
    fn forecast_dates_lists_the_window() {
        let provider = provider(scripted());

        let dates = provider.forecast_dates(&station()).unwrap();

        assert_eq!(dates.len(), 3);
        assert_eq!(dates[0], NaiveDate::from_ymd_opt(2018, 8, 13).unwrap());
        assert_eq!(dates[2], NaiveDate::from_ymd_opt(2018, 8, 15).unwrap());
    }
}
