//! Contains `SeriesLazyFrame`, a Polars view over a measurement series for
//! front ends that chart or export the data.

use crate::types::measurement::MeasurementSeries;
use chrono::NaiveDateTime;
use polars::prelude::*;

/// A wrapper around a Polars `LazyFrame` with a `datetime` and a `value` column,
/// one row per measurement, ascending by `datetime`.
#[derive(Clone)]
pub struct SeriesLazyFrame {
    /// The underlying Polars LazyFrame.
    pub frame: LazyFrame,
}

impl SeriesLazyFrame {
    pub fn new(frame: LazyFrame) -> Self {
        Self { frame }
    }

    /// Builds the frame from an already sorted series.
    pub fn from_series(series: &MeasurementSeries) -> PolarsResult<Self> {
        let datetimes: Vec<NaiveDateTime> = series.iter().map(|m| m.timestamp).collect();
        let values: Vec<f64> = series.iter().map(|m| m.value).collect();
        let frame = df!(
            "datetime" => datetimes,
            "value" => values
        )?;
        Ok(Self::new(frame.lazy()))
    }

    /// Filters rows lazily with an arbitrary predicate.
    pub fn filter(&self, predicate: Expr) -> SeriesLazyFrame {
        SeriesLazyFrame::new(self.frame.clone().filter(predicate))
    }

    /// Keeps the rows with `start <= datetime <= end`.
    pub fn get_range(&self, start: NaiveDateTime, end: NaiveDateTime) -> SeriesLazyFrame {
        self.filter(
            col("datetime")
                .cast(DataType::Datetime(TimeUnit::Milliseconds, None))
                .gt_eq(lit(start))
                .and(
                    col("datetime")
                        .cast(DataType::Datetime(TimeUnit::Milliseconds, None))
                        .lt_eq(lit(end)),
                ),
        )
    }
}
