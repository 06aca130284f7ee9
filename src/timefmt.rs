//! Formatting and strict parsing of the external date tokens.
//!
//! Day tokens look like `13-08-2018`, hour tokens like `13-08-2018 09:00`. Fields are
//! always zero padded and minutes are always `00`. On input the separator between the
//! date and the hour may be any single character, since tokens arrive through URLs
//! where the space is often substituted.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};

use crate::error::{Result, SoundingError};

/// Hour assigned to a day-only token when it is parsed.
const DEFAULT_HOUR: u32 = 12;

/// Format an hour token, `13-08-2018 09:00`.
pub fn format(t: NaiveDateTime) -> String {
    format!("{} {:02}:00", format_day(t.date()), t.hour())
}

/// Format a day token, `13-08-2018`.
pub fn format_day(d: NaiveDate) -> String {
    format!("{:02}-{:02}-{:04}", d.day(), d.month(), d.year())
}

/// Parse an hour token.
pub fn parse(s: &str) -> Result<NaiveDateTime> {
    let bad = || SoundingError::InvalidDateFormat(s.to_string());
    let b = s.as_bytes();

    if b.len() != 16 || b[13] != b':' || b[14] != b'0' || b[15] != b'0' {
        return Err(bad());
    }

    let date = parse_date_fields(&b[0..10]).ok_or_else(bad)?;
    let hour = two_digits(&b[11..13]).ok_or_else(bad)?;

    date.and_hms_opt(hour, 0, 0).ok_or_else(bad)
}

/// Parse a day token. The result is pinned to a fixed midday hour so that rounding to
/// an observation slot behaves the same as an explicit noon request.
pub fn parse_day(s: &str) -> Result<NaiveDateTime> {
    let bad = || SoundingError::InvalidDateFormat(s.to_string());
    let b = s.as_bytes();

    if b.len() != 10 {
        return Err(bad());
    }

    let date = parse_date_fields(b).ok_or_else(bad)?;
    date.and_hms_opt(DEFAULT_HOUR, 0, 0).ok_or_else(bad)
}

fn parse_date_fields(b: &[u8]) -> Option<NaiveDate> {
    debug_assert_eq!(b.len(), 10);

    if b[2] != b'-' || b[5] != b'-' {
        return None;
    }

    let day = two_digits(&b[0..2])?;
    let month = two_digits(&b[3..5])?;
    let year = digits(&b[6..10])?;

    NaiveDate::from_ymd_opt(year as i32, month, day)
}

fn two_digits(b: &[u8]) -> Option<u32> {
    debug_assert_eq!(b.len(), 2);
    digits(b)
}

fn digits(b: &[u8]) -> Option<u32> {
    b.iter().try_fold(0u32, |acc, &c| {
        if c.is_ascii_digit() {
            Some(acc * 10 + u32::from(c - b'0'))
        } else {
            None
        }
    })
}
