use crate::types::measurement::MeasurementSeries;
use chrono::{Duration, NaiveDateTime};

fn clamp_percent(percent: f64) -> f64 {
    if percent.is_nan() {
        0.0
    } else {
        percent.clamp(0.0, 100.0)
    }
}

fn interpolate(percent: f64, min: NaiveDateTime, max: NaiveDateTime) -> NaiveDateTime {
    let span_ms = (max - min).num_milliseconds() as f64;
    let offset_ms = (span_ms * percent / 100.0).round() as i64;
    min + Duration::milliseconds(offset_ms)
}

/// Maps a pair of 0–100 slider positions linearly onto `[min, max]`.
///
/// Out-of-range percentages are clamped into 0..=100 and a start above the end
/// is pulled down to the end, so the result never crosses.
pub fn map_range_to_timestamps(
    start_percent: f64,
    end_percent: f64,
    min: NaiveDateTime,
    max: NaiveDateTime,
) -> (NaiveDateTime, NaiveDateTime) {
    let end = clamp_percent(end_percent);
    let start = clamp_percent(start_percent).min(end);
    (interpolate(start, min, max), interpolate(end, min, max))
}

/// The two handles of a range slider.
///
/// Whichever handle is moved gives way: the start can't pass the end and the
/// end can't pass the start.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeSelection {
    start: f64,
    end: f64,
}

impl Default for RangeSelection {
    fn default() -> Self {
        RangeSelection {
            start: 0.0,
            end: 100.0,
        }
    }
}

impl RangeSelection {
    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn end(&self) -> f64 {
        self.end
    }

    pub fn set_start(&mut self, percent: f64) {
        self.start = clamp_percent(percent).min(self.end);
    }

    pub fn set_end(&mut self, percent: f64) {
        self.end = clamp_percent(percent).max(self.start);
    }

    pub fn timestamps(&self, min: NaiveDateTime, max: NaiveDateTime) -> (NaiveDateTime, NaiveDateTime) {
        map_range_to_timestamps(self.start, self.end, min, max)
    }

    /// The selected window over the series' own date span.
    pub fn over(&self, series: &MeasurementSeries) -> Option<(NaiveDateTime, NaiveDateTime)> {
        let (min, max) = series.span()?;
        Some(self.timestamps(min, max))
    }
}
