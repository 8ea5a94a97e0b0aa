use crate::types::measurement::Measurement;
use std::fmt;

/// Relative change between the first and last point below which a series is
/// considered stable.
pub const STABLE_RELATIVE_DELTA: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trend {
    Stable,
    Rising,
    Falling,
    InsufficientData,
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trend::Stable => write!(f, "stable"),
            Trend::Rising => write!(f, "rising"),
            Trend::Falling => write!(f, "falling"),
            Trend::InsufficientData => write!(f, "not enough data"),
        }
    }
}

/// Classifies the direction of a time-sorted slice from its two end points only.
///
/// This is a two-point heuristic, not a regression: everything between the
/// first and the last measurement is ignored. A change smaller than 10 % of the
/// first value is `Stable`. Identical end points are `Stable` as well, which
/// also covers a first value of zero.
pub fn classify_trend(points: &[Measurement]) -> Trend {
    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        return Trend::InsufficientData;
    };
    if points.len() < 2 {
        return Trend::InsufficientData;
    }

    let delta = last.value - first.value;
    if delta == 0.0 || delta.abs() < STABLE_RELATIVE_DELTA * first.value.abs() {
        Trend::Stable
    } else if delta > 0.0 {
        Trend::Rising
    } else {
        Trend::Falling
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn points(values: &[f64]) -> Vec<Measurement> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| Measurement {
                timestamp: at(i as u32),
                value: *v,
            })
            .collect()
    }

    #[test]
    fn test_reference_cases() {
        assert_eq!(classify_trend(&points(&[10.0, 10.5])), Trend::Stable);
        assert_eq!(classify_trend(&points(&[10.0, 12.0])), Trend::Rising);
        assert_eq!(classify_trend(&points(&[10.0, 8.0])), Trend::Falling);
        assert_eq!(classify_trend(&points(&[10.0])), Trend::InsufficientData);
        assert_eq!(classify_trend(&[]), Trend::InsufficientData);
    }

    #[test]
    fn test_only_end_points_matter() {
        assert_eq!(
            classify_trend(&points(&[10.0, 50.0, -20.0, 10.2])),
            Trend::Stable
        );
    }

    #[test]
    fn test_scale_invariant() {
        for scale in [0.01, 1.0, 3.0, 1000.0] {
            let scaled = |v: &[f64]| points(&v.iter().map(|x| x * scale).collect::<Vec<_>>());
            assert_eq!(classify_trend(&scaled(&[10.0, 10.5])), Trend::Stable);
            assert_eq!(classify_trend(&scaled(&[10.0, 12.0])), Trend::Rising);
            assert_eq!(classify_trend(&scaled(&[10.0, 8.0])), Trend::Falling);
        }
    }

    #[test]
    fn test_zero_start() {
        assert_eq!(classify_trend(&points(&[0.0, 0.0])), Trend::Stable);
        assert_eq!(classify_trend(&points(&[0.0, 0.5])), Trend::Rising);
        assert_eq!(classify_trend(&points(&[0.0, -0.5])), Trend::Falling);
    }
}
