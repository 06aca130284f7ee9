//! Parse the fixed width text tables the upstream sounding providers return.

use metfor::{Celsius, Feet, HectoPascal, Knots, Meters, WindSpdDir};
use optional::Optioned;
use strum_macros::EnumIter;

use crate::{
    error::{Result, SoundingError},
    sounding::VerticalProfile,
};

/// The table layouts produced by the supported sounding providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
pub enum TableFormat {
    /// GSD format model soundings. Pressure, temperature and dew point are encoded
    /// ×10, missing values are the 99999 sentinel.
    Gsd,
    /// University style observation tables. Values are plain, missing fields are
    /// blank.
    Uwyo,
}

// Column byte spans of each variable within a data row.
struct Layout {
    header_lines: usize,
    pressure: (usize, usize),
    height: (usize, usize),
    temperature: (usize, usize),
    dew_point: (usize, usize),
    direction: (usize, usize),
    speed: (usize, usize),
    // Divisor for pressure, temperature and dew point.
    decimal_scale: f64,
    sentinel: Option<f64>,
}

const GSD_LAYOUT: Layout = Layout {
    header_lines: 6,
    pressure: (7, 14),
    height: (14, 21),
    temperature: (21, 28),
    dew_point: (28, 35),
    direction: (35, 42),
    speed: (42, 49),
    decimal_scale: 10.0,
    sentinel: Some(99_999.0),
};

const UWYO_LAYOUT: Layout = Layout {
    header_lines: 4,
    pressure: (0, 7),
    height: (7, 14),
    temperature: (14, 21),
    dew_point: (21, 28),
    direction: (42, 49),
    speed: (49, 56),
    decimal_scale: 1.0,
    sentinel: None,
};

#[derive(Default)]
struct RawLevel {
    pressure: Option<f64>,
    height: Option<f64>,
    temperature: Option<f64>,
    dew_point: Option<f64>,
    direction: Option<f64>,
    speed: Option<f64>,
}

impl RawLevel {
    fn is_all_missing(&self) -> bool {
        self.temperature.is_none()
            && self.dew_point.is_none()
            && self.direction.is_none()
            && self.speed.is_none()
    }
}

impl TableFormat {
    /// Parse a raw provider table into a profile.
    ///
    /// Rows where temperature, dew point, wind direction and wind speed are all
    /// missing are dropped; rows with partial data are kept with holes. The valid run
    /// ends at the first row without a height, and levels above the profile ceiling
    /// are discarded. Fails with [`SoundingError::Parse`] when the text holds no data
    /// rows at all and [`SoundingError::InsufficientData`] when fewer than the
    /// minimum number of levels survive.
    pub fn parse(self, text: &str) -> Result<VerticalProfile> {
        let layout = self.layout();

        let mut height: Vec<Feet> = vec![];
        let mut pressure: Vec<Optioned<HectoPascal>> = vec![];
        let mut temperature: Vec<Optioned<Celsius>> = vec![];
        let mut dew_point: Vec<Optioned<Celsius>> = vec![];
        let mut wind: Vec<Optioned<WindSpdDir<Knots>>> = vec![];

        let mut data_lines = 0usize;
        for line in text.lines().skip(layout.header_lines) {
            if line.trim().is_empty() {
                continue;
            }
            data_lines += 1;

            let level = layout.parse_row(line);
            if level.is_all_missing() {
                continue;
            }

            // Without a height the level cannot be placed on the axis, and nothing
            // above it can be trusted to line up either.
            let h = match level.height {
                Some(h) => h,
                None => break,
            };

            height.push(Feet::from(Meters(h)));
            pressure.push(Optioned::from(level.pressure.map(HectoPascal)));
            temperature.push(Optioned::from(level.temperature.map(Celsius)));
            dew_point.push(Optioned::from(level.dew_point.map(Celsius)));
            wind.push(Optioned::from(match (level.speed, level.direction) {
                (Some(speed), Some(direction)) => Some(WindSpdDir {
                    speed: Knots(speed),
                    direction,
                }),
                _ => None,
            }));
        }

        if data_lines == 0 {
            return Err(SoundingError::Parse);
        }

        VerticalProfile::new(height, pressure, temperature, dew_point, wind)
    }

    fn layout(self) -> &'static Layout {
        match self {
            TableFormat::Gsd => &GSD_LAYOUT,
            TableFormat::Uwyo => &UWYO_LAYOUT,
        }
    }
}

impl Layout {
    fn parse_row(&self, line: &str) -> RawLevel {
        RawLevel {
            pressure: self.scaled(line, self.pressure),
            height: self.field(line, self.height),
            temperature: self.scaled(line, self.temperature),
            dew_point: self.scaled(line, self.dew_point),
            direction: self.field(line, self.direction),
            speed: self.field(line, self.speed),
        }
    }

    fn field(&self, line: &str, span: (usize, usize)) -> Option<f64> {
        let (start, end) = span;
        let token = line.get(start..end.min(line.len()))?.trim();
        let value: f64 = token.parse().ok()?;

        match self.sentinel {
            Some(sentinel) if (value - sentinel).abs() < std::f64::EPSILON => None,
            _ => Some(value),
        }
    }

    fn scaled(&self, line: &str, span: (usize, usize)) -> Option<f64> {
        self.field(line, span).map(|v| v / self.decimal_scale)
    }
}
