//! Compute the convective trigger and ceiling indices for a chart from a vertical
//! profile, a ground temperature, and a ground elevation.

use itertools::izip;
use metfor::{Celsius, CelsiusDiff, Feet, Knots, Quantity, WindUV};
use optional::Optioned;

use crate::{
    interpolation::{inverse_linear_interpolate, linear_interpolate},
    sounding::VerticalProfile,
};

/// Dry adiabatic lapse rate used for the parcel ascent line, in °C per foot.
pub const DALR: f64 = -3.0 / 1000.0;

/// Reference height for the trigger temperature.
pub const TRIGGER_HEIGHT: Feet = Feet(4000.0);

/// Height axis limits of the rendered chart.
pub const LIM_H: (Feet, Feet) = (Feet(0.0), Feet(15_000.0));

/// Temperature axis limits of the rendered chart.
pub const LIM_T: (Celsius, Celsius) = (Celsius(-20.0), Celsius(40.0));

/// Everything the chart renderer needs to draw one sounding chart.
///
/// Derived once per (profile, ground temperature, ground elevation) triple and never
/// mutated afterwards. The field names are a stable contract with the renderer.
#[derive(Debug, Clone)]
pub struct ChartAnalysis {
    /// Height axis, ascending, capped at the chart ceiling.
    pub height: Vec<Feet>,
    /// Environmental temperature curve.
    pub temp: Vec<Optioned<Celsius>>,
    /// Environmental dew point curve.
    pub dew: Vec<Optioned<Celsius>>,
    /// Dry adiabatic parcel ascent anchored at `(h0, t0)`.
    pub temp_max: Vec<Celsius>,
    /// Trigger temperature line anchored at the trigger reference height. Empty when
    /// the profile has no temperature data at all.
    pub trig: Vec<Celsius>,
    /// Ground elevation the analysis was run for.
    pub h0: Feet,
    /// Ground temperature the analysis was run for.
    pub t0: Celsius,
    /// Trigger temperature at ground level.
    pub trig_0: Optioned<Celsius>,
    /// Thermal ceiling: the height where the parcel ascent meets the environment.
    pub tol: Optioned<Feet>,
    /// Conservative ceiling, three degrees cooler than `tol`.
    pub tol_minus_3: Optioned<Feet>,
    /// Estimated condensation level, when the dew point at the ground is known.
    pub cloud_base: Optioned<Feet>,
    /// Height axis limits for rendering.
    pub lim_h: (Feet, Feet),
    /// Temperature axis limits for rendering.
    pub lim_t: (Celsius, Celsius),
    /// Zonal wind component per level.
    pub wind_u: Vec<Optioned<Knots>>,
    /// Meridional wind component per level.
    pub wind_v: Vec<Optioned<Knots>>,
}

/// Run the convective analysis.
///
/// Pure function of its three inputs. Degenerate situations (ground level outside the
/// profile, a parcel that never meets the environment) degrade to clamped boundary
/// values the same way the interpolation does, they are not errors.
pub fn calculate(profile: &VerticalProfile, t0: Celsius, h0: Feet) -> ChartAnalysis {
    let height = profile.height_profile().to_vec();
    let temp = profile.temperature_profile().to_vec();
    let dew = profile.dew_point_profile().to_vec();

    // The parcel ascent line starts at (h0, t0) and follows the dry adiabatic slope.
    let temp_max: Vec<Celsius> = height
        .iter()
        .map(|&h| t0 + CelsiusDiff(DALR * (h - h0).unpack()))
        .collect();

    let dew_h0 = linear_interpolate(h0, &height, &dew);
    let cloud_base: Optioned<Feet> =
        dew_h0.map_t(|dew_h0| Feet(1000.0 / 1.5 * (t0 - dew_h0).unpack() + h0.unpack()));

    // trig_h is the environmental temperature at the trigger reference height.
    let trig_h = linear_interpolate(TRIGGER_HEIGHT, &height, &temp);
    let trig: Vec<Celsius> = match trig_h.into_option() {
        Some(trig_h) => height
            .iter()
            .map(|&h| trig_h + CelsiusDiff(DALR * (h - TRIGGER_HEIGHT).unpack()))
            .collect(),
        None => vec![],
    };
    let trig_0: Optioned<Celsius> =
        trig_h.map_t(|trig_h| trig_h + CelsiusDiff(DALR * (h0 - TRIGGER_HEIGHT).unpack()));

    let tol = ceiling_crossing(&height, &temp, &temp_max, CelsiusDiff(0.0));
    let tol_minus_3 = ceiling_crossing(&height, &temp, &temp_max, CelsiusDiff(3.0));

    let (wind_u, wind_v) = wind_components(profile);

    ChartAnalysis {
        height,
        temp,
        dew,
        temp_max,
        trig,
        h0,
        t0,
        trig_0,
        tol,
        tol_minus_3,
        cloud_base,
        lim_h: LIM_H,
        lim_t: LIM_T,
        wind_u,
        wind_v,
    }
}

/// Find the height where the parcel ascent line crosses the environmental
/// temperature, offset `deficit` degrees toward the environment.
///
/// The difference series is flipped to descending height order and inverse
/// interpolated against zero, so the first crossing seen from the top of the profile
/// down is the one reported. Levels with a missing environmental temperature do not
/// take part in the search.
fn ceiling_crossing(
    height: &[Feet],
    temp: &[Optioned<Celsius>],
    temp_max: &[Celsius],
    deficit: CelsiusDiff,
) -> Optioned<Feet> {
    let pairs: Vec<(CelsiusDiff, Feet)> = izip!(height, temp, temp_max)
        // Skip levels with no environmental temperature.
        .filter_map(|(&h, t, &tm)| {
            t.into_option()
                .map(|t| (CelsiusDiff((tm - t).unpack() - deficit.unpack()), h))
        })
        .collect();

    // Flip to descending height order.
    let (diff, heights): (Vec<CelsiusDiff>, Vec<Feet>) = pairs.into_iter().rev().unzip();

    Optioned::from(inverse_linear_interpolate(CelsiusDiff(0.0), &diff, &heights))
}

fn wind_components(profile: &VerticalProfile) -> (Vec<Optioned<Knots>>, Vec<Optioned<Knots>>) {
    profile
        .wind_profile()
        .iter()
        .map(|w| match w.into_option() {
            Some(w) => {
                let WindUV::<Knots> { u, v } = WindUV::from(w);
                (Optioned::from(u), Optioned::from(v))
            }
            None => (Optioned::default(), Optioned::default()),
        })
        .unzip()
}
