//! Linear interpolation over height ordered series, including the inverse
//! interpolation used to locate the zero crossing of a parcel/environment
//! temperature difference.

use itertools::{izip, Itertools};
use metfor::Quantity;
use optional::{Noned, Optioned};
use std::ops::Sub;

/// Interpolate a value from parallel coordinate and value slices.
///
/// Levels where the value is missing are skipped, so a hole in the middle of a series
/// does not break interpolation; the points on either side of it are used instead.
/// A target outside the sampled range is clamped to the nearest end value rather than
/// extrapolated, and a target exactly equal to a sample coordinate returns that
/// sample's value exactly.
///
/// # Examples
///
/// ```rust
/// use metfor::{Celsius, Feet};
/// use optional::{none, some};
/// use sounding_convect::linear_interpolate;
///
/// let height = [Feet(0.0), Feet(1000.0), Feet(2000.0)];
/// let temp = [some(Celsius(20.0)), none(), some(Celsius(10.0))];
///
/// // The missing middle level is bridged.
/// assert_eq!(linear_interpolate(Feet(500.0), &height, &temp).unwrap(), Celsius(17.5));
/// // Exact sample coordinates return the sample exactly.
/// assert_eq!(linear_interpolate(Feet(2000.0), &height, &temp).unwrap(), Celsius(10.0));
/// // Outside the range the end value is used.
/// assert_eq!(linear_interpolate(Feet(9000.0), &height, &temp).unwrap(), Celsius(10.0));
/// ```
pub fn linear_interpolate<X, Y>(target_x: X, xs: &[X], ys: &[Optioned<Y>]) -> Optioned<Y>
where
    X: Quantity + PartialOrd + Sub<X> + Copy + std::fmt::Debug,
    <X as Sub<X>>::Output: Quantity,
    Y: Quantity + Noned + Sub<Y> + Copy,
    <Y as Sub<Y>>::Output: Quantity,
{
    let points: Vec<(X, Y)> = izip!(xs, ys)
        .filter(|(_, y)| y.is_some())
        .map(|(&x, y)| (x, y.unpack()))
        .collect();

    Optioned::from(interp_points(target_x, &points))
}

/// Inverse linear interpolation against fully populated slices.
///
/// This is the crossing search: callers pass the parcel/environment difference as the
/// coordinate axis and height as the value axis, both reversed to descending height
/// order, with a target of zero. The first bracket found scanning the flipped arrays
/// wins, so for the usual profile shape the crossing nearest the top of the sounding
/// is the one reported. When the difference never changes sign the nearest end height
/// is returned, which callers accept as a degenerate but valid answer.
pub(crate) fn inverse_linear_interpolate<X, Y>(target_x: X, xs: &[X], ys: &[Y]) -> Option<Y>
where
    X: Quantity + PartialOrd + Sub<X> + Copy + std::fmt::Debug,
    <X as Sub<X>>::Output: Quantity,
    Y: Quantity + Sub<Y> + Copy,
    <Y as Sub<Y>>::Output: Quantity,
{
    let points: Vec<(X, Y)> = izip!(xs, ys).map(|(&x, &y)| (x, y)).collect();
    interp_points(target_x, &points)
}

fn interp_points<X, Y>(target_x: X, points: &[(X, Y)]) -> Option<Y>
where
    X: Quantity + PartialOrd + Sub<X> + Copy + std::fmt::Debug,
    <X as Sub<X>>::Output: Quantity,
    Y: Quantity + Sub<Y> + Copy,
    <Y as Sub<Y>>::Output: Quantity,
{
    enum BracketType<X, Y> {
        Bracket((X, Y), (X, Y)),
        EndEqual((X, Y)),
    }

    let make_bracket = |pnt_0: (X, Y), pnt_1: (X, Y)| -> Option<BracketType<X, Y>> {
        let (x0, _) = pnt_0;
        let (x1, _) = pnt_1;

        if (x0 < target_x && x1 > target_x) || (x0 > target_x && x1 < target_x) {
            Some(BracketType::Bracket(pnt_0, pnt_1))
        } else if (x0 - target_x).unpack().abs() < std::f64::EPSILON {
            Some(BracketType::EndEqual(pnt_0))
        } else if (x1 - target_x).unpack().abs() < std::f64::EPSILON {
            Some(BracketType::EndEqual(pnt_1))
        } else {
            None
        }
    };

    let bracketed = points
        .iter()
        .copied()
        // Look at the levels two at a time.
        .tuple_windows::<(_, _)>()
        // Map pairs to brackets and drop everything that isn't one.
        .filter_map(|(pnt_0, pnt_1)| make_bracket(pnt_0, pnt_1))
        // The first bracket wins, even if the series crosses more than once.
        .next()
        .map(|bracket| match bracket {
            BracketType::Bracket((x0, y0), (x1, y1)) => linear_interp(target_x, x0, x1, y0, y1),
            BracketType::EndEqual((_, y)) => y,
        });

    // No bracket anywhere: clamp to the nearest end of the sampled range.
    bracketed.or_else(|| match (points.first(), points.last()) {
        (Some(&(x0, y0)), Some(&(_, yn))) => {
            if points.len() == 1 || target_x < x0 {
                Some(y0)
            } else {
                Some(yn)
            }
        }
        _ => None,
    })
}

#[inline]
pub(crate) fn linear_interp<X, Y>(x_val: X, x1: X, x2: X, y1: Y, y2: Y) -> Y
where
    X: Sub<X> + Copy + std::fmt::Debug + PartialEq,
    <X as Sub<X>>::Output: Quantity,
    Y: Quantity + Sub<Y>,
    <Y as Sub<Y>>::Output: Quantity,
{
    debug_assert_ne!(x1, x2);

    let run = (x2 - x1).unpack();
    let rise = (y2 - y1).unpack();
    let dx = (x_val - x1).unpack();

    Y::pack(y1.unpack() + dx * (rise / run))
}

#[cfg(test)]
mod test {
    use super::*;
    use metfor::{Celsius, CelsiusDiff, Feet};
    use optional::some;

    #[test]
    fn interpolates_between_samples() {
        let xs = [Feet(0.0), Feet(1000.0)];
        let ys = [some(Celsius(0.0)), some(Celsius(10.0))];

        assert_eq!(
            linear_interpolate(Feet(250.0), &xs, &ys).unwrap(),
            Celsius(2.5)
        );
    }

    #[test]
    fn exact_sample_returns_sample_value() {
        let xs: Vec<Feet> = (0..10).map(|i| Feet(f64::from(i) * 750.0)).collect();
        let ys: Vec<_> = (0..10)
            .map(|i| some(Celsius(21.3 - f64::from(i) * 1.7)))
            .collect();

        for (&x, y) in xs.iter().zip(ys.iter()) {
            assert_eq!(linear_interpolate(x, &xs, &ys).unwrap(), y.unpack());
        }
    }

    #[test]
    fn clamps_outside_the_sampled_range() {
        let xs = [Feet(1000.0), Feet(2000.0)];
        let ys = [some(Celsius(5.0)), some(Celsius(-5.0))];

        assert_eq!(
            linear_interpolate(Feet(0.0), &xs, &ys).unwrap(),
            Celsius(5.0)
        );
        assert_eq!(
            linear_interpolate(Feet(3000.0), &xs, &ys).unwrap(),
            Celsius(-5.0)
        );
    }

    #[test]
    fn all_missing_interpolates_to_none() {
        let xs = [Feet(0.0), Feet(1000.0)];
        let ys: [Optioned<Celsius>; 2] = [Optioned::default(), Optioned::default()];

        assert!(linear_interpolate(Feet(500.0), &xs, &ys).is_none());
    }

    #[test]
    fn crossing_search_takes_first_bracket_in_flipped_order() {
        // Difference series reversed to descending height order: negative aloft,
        // positive at the ground, with a second sign wiggle below the real crossing.
        let diff = [
            CelsiusDiff(-6.0),
            CelsiusDiff(-2.0),
            CelsiusDiff(2.0),
            CelsiusDiff(-0.5),
            CelsiusDiff(1.0),
        ];
        let height = [
            Feet(10_000.0),
            Feet(8_000.0),
            Feet(6_000.0),
            Feet(4_000.0),
            Feet(2_000.0),
        ];

        let crossing = inverse_linear_interpolate(CelsiusDiff(0.0), &diff, &height).unwrap();

        // The first bracket is (-2, 2) between 8000 ft and 6000 ft.
        assert_eq!(crossing, Feet(7_000.0));
    }

    #[test]
    fn crossing_search_clamps_when_no_sign_change() {
        let always_negative = [CelsiusDiff(-5.0), CelsiusDiff(-3.0), CelsiusDiff(-1.0)];
        let height = [Feet(9_000.0), Feet(6_000.0), Feet(3_000.0)];

        // Target above every sample: the last (lowest) height is reported.
        assert_eq!(
            inverse_linear_interpolate(CelsiusDiff(0.0), &always_negative, &height).unwrap(),
            Feet(3_000.0)
        );

        let always_positive = [CelsiusDiff(1.0), CelsiusDiff(3.0), CelsiusDiff(5.0)];
        assert_eq!(
            inverse_linear_interpolate(CelsiusDiff(0.0), &always_positive, &height).unwrap(),
            Feet(9_000.0)
        );
    }
}
