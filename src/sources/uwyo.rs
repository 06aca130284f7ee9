//! URL construction and response handling for the university observation site.
//!
//! The site serves an HTML page; the sounding table lives inside the first
//! preformatted block. A page without one is the provider's way of saying there is no
//! observation for the requested slot.

use chrono::{Datelike, NaiveDateTime, Timelike};

use super::SoundingSite;

const BASE_URL: &str = "http://weather.uwyo.edu/cgi-bin/sounding";

/// Build the request URL for one observation slot.
pub(crate) fn url(site: &SoundingSite, slot: NaiveDateTime) -> String {
    format!(
        "{base}?region={region}&TYPE=TEXT%3ALIST\
         &YEAR={year}&MONTH={month}\
         &FROM={day:02}{hour:02}&TO={day:02}{hour:02}&STNM={station}",
        base = BASE_URL,
        region = site.region,
        year = slot.year(),
        month = slot.month(),
        day = slot.day(),
        hour = slot.hour(),
        station = site.station_num,
    )
}

/// Pull the contents of the first preformatted block out of an HTML page.
///
/// Returns `None` when the page has no such block. A single leading newline left
/// over from the opening tag is stripped so the table starts at its first header
/// line.
pub(crate) fn extract_preformatted(html: &str) -> Option<&str> {
    let lowered = html.to_ascii_lowercase();

    let open = lowered.find("<pre")?;
    let content_start = open + lowered[open..].find('>')? + 1;
    let content_end = content_start + lowered[content_start..].find("</pre")?;

    let inner = &html[content_start..content_end];
    Some(inner.strip_prefix('\n').unwrap_or(inner))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test_data::{uwyo_page, UWYO_TABLE};
    use chrono::NaiveDate;

    #[test]
    fn url_is_zero_padded() {
        let site = SoundingSite {
            region: "mideast".to_string(),
            station_num: 40_179,
            coord: (32.6, 35.23),
        };
        let slot = NaiveDate::from_ymd_opt(2018, 8, 3)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();

        let url = url(&site, slot);

        assert!(url.contains("region=mideast"));
        assert!(url.contains("FROM=0300&TO=0300"));
        assert!(url.contains("STNM=40179"));
    }

    #[test]
    fn first_preformatted_block_is_extracted() {
        let page = uwyo_page(UWYO_TABLE);
        let table = extract_preformatted(&page).unwrap();
        assert_eq!(table, UWYO_TABLE);
    }

    #[test]
    fn page_without_a_block_yields_nothing() {
        assert!(extract_preformatted("<HTML><BODY>Sorry, no data</BODY></HTML>").is_none());
    }
}
