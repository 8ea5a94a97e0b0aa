use crate::types::measurement::{Measurement, MeasurementSeries, API_DATE_FORMAT};
use chrono::NaiveDateTime;
use log::debug;
use serde_json::Value;

/// Turns raw `{date, value}` records into an ascending [`MeasurementSeries`].
///
/// Sensors routinely report gaps, so a record is skipped (not fatal) when its
/// value is JSON null, the string `"null"`, or not a finite number, or when its
/// date is not `yyyy-MM-dd HH:mm:ss`.
pub fn parse_series(values: &[Value]) -> MeasurementSeries {
    let mut points = Vec::with_capacity(values.len());
    let mut dropped = 0usize;

    for record in values {
        match (parse_date(record.get("date")), parse_value(record.get("value"))) {
            (Some(timestamp), Some(value)) => points.push(Measurement { timestamp, value }),
            _ => dropped += 1,
        }
    }

    if dropped > 0 {
        debug!(
            "Dropped {} of {} measurement records without a usable date or value",
            dropped,
            values.len()
        );
    }
    MeasurementSeries::from_unsorted(points)
}

fn parse_date(raw: Option<&Value>) -> Option<NaiveDateTime> {
    let text = raw?.as_str()?;
    NaiveDateTime::parse_from_str(text, API_DATE_FORMAT).ok()
}

fn parse_value(raw: Option<&Value>) -> Option<f64> {
    let value = match raw? {
        Value::Number(number) => number.as_f64()?,
        Value::String(text) if text == "null" => return None,
        Value::String(text) => text.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    value.is_finite().then_some(value)
}
