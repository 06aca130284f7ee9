//! URL construction for the GSD format model sounding service.

use chrono::{Datelike, NaiveDateTime, Timelike};

use super::SoundingSite;

const BASE_URL: &str = "https://rucsoundings.noaa.gov/get_soundings.cgi";

/// Build the request URL for one observation slot.
pub(crate) fn url(site: &SoundingSite, slot: NaiveDateTime) -> String {
    let start_secs = slot.and_utc().timestamp();
    let end_secs = start_secs + 3600;
    let (lat, lon) = site.coord;

    format!(
        "{base}?data_source=GFS\
         &start_year={year}&start_month_name={month}&start_mday={day}\
         &start_hour={hour}&start_min=0&n_hrs=1.0&fcst_len=shortest\
         &airport={lat}%2C{lon}\
         &text=Ascii%20text%20%28GSD%20format%29&hydrometeors=false\
         &startSecs={start_secs}&endSecs={end_secs}",
        base = BASE_URL,
        year = slot.year(),
        month = slot.format("%b"),
        day = slot.day(),
        hour = slot.hour(),
        lat = lat,
        lon = lon,
        start_secs = start_secs,
        end_secs = end_secs,
    )
}
