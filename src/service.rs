//! Tie the pipeline together: stations in, rendered chart bytes out.

use std::{sync::Arc, time::Duration};

use chrono::{Local, NaiveDateTime};
use tracing::info;

use crate::{
    analysis::{calculate, ChartAnalysis},
    cache::TtlCache,
    error::Result,
    fetch::TextFetcher,
    sounding::StationTable,
    sources::SourceAdapter,
    temperature::TemperatureProvider,
    timefmt,
};

/// Renders one analysis into encoded image bytes.
///
/// The renderer only ever borrows the analysis; ownership of the underlying arrays
/// stays with the cache entry.
pub trait ChartRenderer {
    /// Draw the chart and return the encoded image.
    fn render(&self, analysis: &ChartAnalysis) -> Result<Vec<u8>>;
}

const ANALYSIS_CACHE_TTL: Duration = Duration::from_secs(60 * 60);
const IMAGE_CACHE_TTL: Duration = Duration::from_secs(60);

type ChartKey = (String, NaiveDateTime);

/// The sounding analysis pipeline behind the web layer.
///
/// Owns its collaborators explicitly; construct one per process and share it. All
/// entry points are synchronous, and concurrent requests for the same chart coalesce
/// in the caches.
pub struct SoundingService<F, R> {
    stations: StationTable,
    sources: SourceAdapter<F>,
    temperatures: TemperatureProvider<F>,
    renderer: R,
    analyses: TtlCache<ChartKey, Arc<ChartAnalysis>>,
    images: TtlCache<ChartKey, Arc<Vec<u8>>>,
}

impl<F, R> SoundingService<F, R>
where
    F: TextFetcher,
    R: ChartRenderer,
{
    /// Assemble a service from its collaborators.
    pub fn new(
        stations: StationTable,
        sources: SourceAdapter<F>,
        temperatures: TemperatureProvider<F>,
        renderer: R,
    ) -> Self {
        SoundingService {
            stations,
            sources,
            temperatures,
            renderer,
            analyses: TtlCache::new(),
            images: TtlCache::new(),
        }
    }

    /// Station names available for charting, north to south.
    pub fn station_names(&self) -> Vec<String> {
        self.stations.names().map(str::to_string).collect()
    }

    /// Days the temperature provider can support forecast charts for.
    pub fn forecast_dates(&self, station_name: &str) -> Result<Vec<String>> {
        let station = self.stations.get(station_name)?;
        let dates = self.temperatures.forecast_dates(station)?;
        Ok(dates.iter().map(|&d| timefmt::format_day(d)).collect())
    }

    /// Today's chart for a station, from the latest observed sounding.
    pub fn current_chart(&self, station_name: &str) -> Result<Arc<Vec<u8>>> {
        let (analysis, effective) = self.current_keyed(station_name)?;
        self.render_cached(station_name, effective, &analysis)
    }

    /// A forecast chart for a station at a `DD-MM-YYYY` or `DD-MM-YYYY HH:00` token.
    pub fn forecast_chart(&self, station_name: &str, date_token: &str) -> Result<Arc<Vec<u8>>> {
        let (analysis, effective) = self.forecast_keyed(station_name, date_token)?;
        self.render_cached(station_name, effective, &analysis)
    }

    /// Today's analysis for a station, without rendering.
    pub fn current_analysis(&self, station_name: &str) -> Result<Arc<ChartAnalysis>> {
        self.current_keyed(station_name)
            .map(|(analysis, _)| analysis)
    }

    /// The analysis behind a forecast chart, without rendering.
    pub fn forecast_analysis(
        &self,
        station_name: &str,
        date_token: &str,
    ) -> Result<Arc<ChartAnalysis>> {
        self.forecast_keyed(station_name, date_token)
            .map(|(analysis, _)| analysis)
    }

    fn current_keyed(&self, station_name: &str) -> Result<(Arc<ChartAnalysis>, NaiveDateTime)> {
        let station = self.stations.get(station_name)?;

        let (profile, effective) = self.sources.current()?;
        let key = (station_name.to_string(), effective);

        let analysis = self
            .analyses
            .get_or_try_insert_with(key, ANALYSIS_CACHE_TTL, || {
                info!(station = station_name, %effective, "calculating analysis");
                let t0 = self.temperatures.current_max(station)?;
                Ok(Arc::new(calculate(&profile, t0, station.elevation())))
            })?;

        Ok((analysis, effective))
    }

    fn forecast_keyed(
        &self,
        station_name: &str,
        date_token: &str,
    ) -> Result<(Arc<ChartAnalysis>, NaiveDateTime)> {
        let station = self.stations.get(station_name)?;
        let reference = parse_token(date_token)?;

        let (profile, effective) = self.sources.forecast(reference)?;
        let key = (station_name.to_string(), effective);

        let analysis = self
            .analyses
            .get_or_try_insert_with(key, ANALYSIS_CACHE_TTL, || {
                info!(station = station_name, %effective, "calculating analysis");
                let today = Local::now().date_naive();
                let t0 = self.temperatures.max_for(station, reference.date(), today)?;
                Ok(Arc::new(calculate(&profile, t0, station.elevation())))
            })?;

        Ok((analysis, effective))
    }

    fn render_cached(
        &self,
        station_name: &str,
        effective: NaiveDateTime,
        analysis: &Arc<ChartAnalysis>,
    ) -> Result<Arc<Vec<u8>>> {
        let key = (station_name.to_string(), effective);

        self.images.get_or_try_insert_with(key, IMAGE_CACHE_TTL, || {
            info!(station = station_name, %effective, "rendering chart");
            self.renderer.render(analysis).map(Arc::new)
        })
    }
}

// Accept an hour token first, then a day token.
fn parse_token(date_token: &str) -> Result<NaiveDateTime> {
    timefmt::parse(date_token).or_else(|_| timefmt::parse_day(date_token))
}
