use crate::types::measurement::{Measurement, MeasurementSeries};
use chrono::NaiveDateTime;
use ordered_float::OrderedFloat;
use std::fmt;

/// Aggregates over a non-empty set of measurements.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub count: usize,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Minimum: {:.1}, Maximum: {:.1}, Average: {:.1}, Measurements: {}",
            self.min, self.max, self.mean, self.count
        )
    }
}

/// Result of [`compute_statistics`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Statistics {
    Summary(Summary),
    /// Nothing fell inside the requested range.
    InsufficientData,
}

impl Statistics {
    pub fn summary(&self) -> Option<&Summary> {
        match self {
            Statistics::Summary(summary) => Some(summary),
            Statistics::InsufficientData => None,
        }
    }
}

impl fmt::Display for Statistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statistics::Summary(summary) => summary.fmt(f),
            Statistics::InsufficientData => write!(f, "Not enough data in the selected range"),
        }
    }
}

/// Min/max/mean/count over the points inside the closed `range`, or over the
/// whole series when no range is given.
pub fn compute_statistics(
    series: &MeasurementSeries,
    range: Option<(NaiveDateTime, NaiveDateTime)>,
) -> Statistics {
    match range {
        Some((start, end)) => summarize(series.within(start, end)),
        None => summarize(series.as_slice()),
    }
}

/// Aggregates an already filtered slice.
pub fn summarize(points: &[Measurement]) -> Statistics {
    let values = || points.iter().map(|m| OrderedFloat(m.value));
    let (Some(min), Some(max)) = (values().min(), values().max()) else {
        return Statistics::InsufficientData;
    };
    let sum: f64 = points.iter().map(|m| m.value).sum();

    Statistics::Summary(Summary {
        min: min.into_inner(),
        max: max.into_inner(),
        mean: sum / points.len() as f64,
        count: points.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn series(values: &[f64]) -> MeasurementSeries {
        MeasurementSeries::from_unsorted(
            values
                .iter()
                .enumerate()
                .map(|(i, v)| Measurement {
                    timestamp: at(i as u32),
                    value: *v,
                })
                .collect(),
        )
    }

    fn at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_full_series() {
        let stats = compute_statistics(&series(&[4.0, 10.0, 1.0, 5.0]), None);
        assert_eq!(
            stats,
            Statistics::Summary(Summary {
                min: 1.0,
                max: 10.0,
                mean: 5.0,
                count: 4
            })
        );
    }

    #[test]
    fn test_sub_range_is_closed() {
        let stats = compute_statistics(&series(&[4.0, 10.0, 1.0, 5.0]), Some((at(1), at(2))));
        let summary = stats.summary().copied().unwrap();
        assert_eq!(summary.count, 2);
        assert_eq!(summary.min, 1.0);
        assert_eq!(summary.max, 10.0);
        assert_eq!(summary.mean, 5.5);
    }

    #[test]
    fn test_empty_range_is_insufficient() {
        let data = series(&[1.0, 2.0]);
        assert_eq!(
            compute_statistics(&data, Some((at(5), at(9)))),
            Statistics::InsufficientData
        );
        assert_eq!(
            compute_statistics(&data, Some((at(1), at(0)))),
            Statistics::InsufficientData
        );
        assert_eq!(
            compute_statistics(&MeasurementSeries::default(), None),
            Statistics::InsufficientData
        );
    }

    #[test]
    fn test_summary_display() {
        let summary = Summary {
            min: 1.04,
            max: 9.96,
            mean: 5.0,
            count: 3,
        };
        assert_eq!(
            summary.to_string(),
            "Minimum: 1.0, Maximum: 10.0, Average: 5.0, Measurements: 3"
        );
    }
}
