//! Defines the raw sensor-data payload as the API (and the cache files) carry it,
//! and the typed, time-sorted series derived from it.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Timestamp format used by the `date` field of every measurement record.
pub const API_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// The body of a `/data/getData/{id}` response, kept verbatim.
///
/// `values` stays untyped so that saving a dataset writes back exactly what the
/// API sent; any other top-level fields are carried along in `extra`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct RawMeasurementPayload {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub values: Vec<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RawMeasurementPayload {
    /// The `date` string of the first record in API order, if any.
    pub fn first_date(&self) -> Option<&str> {
        self.values.first().and_then(record_date)
    }

    /// The `date` string of the last record in API order, if any.
    pub fn last_date(&self) -> Option<&str> {
        self.values.last().and_then(record_date)
    }
}

fn record_date(record: &Value) -> Option<&str> {
    record.get("date").and_then(Value::as_str)
}

/// One timestamped reading. Absent readings never make it into this type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    pub timestamp: NaiveDateTime,
    pub value: f64,
}

/// Measurements ordered ascending by timestamp.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MeasurementSeries {
    points: Vec<Measurement>,
}

impl MeasurementSeries {
    /// Builds a series from points in any order. The sort is stable, so
    /// duplicate timestamps keep their input order.
    pub fn from_unsorted(mut points: Vec<Measurement>) -> Self {
        points.sort_by_key(|m| m.timestamp);
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn as_slice(&self) -> &[Measurement] {
        &self.points
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Measurement> {
        self.points.iter()
    }

    pub fn first(&self) -> Option<&Measurement> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&Measurement> {
        self.points.last()
    }

    /// Earliest and latest timestamp, or `None` for an empty series.
    pub fn span(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        Some((self.first()?.timestamp, self.last()?.timestamp))
    }

    /// The points with `start <= timestamp <= end`. Empty when `start > end`.
    pub fn within(&self, start: NaiveDateTime, end: NaiveDateTime) -> &[Measurement] {
        if start > end {
            return &[];
        }
        let lo = self.points.partition_point(|m| m.timestamp < start);
        let hi = self.points.partition_point(|m| m.timestamp <= end);
        &self.points[lo..hi]
    }
}

impl<'a> IntoIterator for &'a MeasurementSeries {
    type Item = &'a Measurement;
    type IntoIter = std::slice::Iter<'a, Measurement>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    fn at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_within_is_inclusive() {
        let series = MeasurementSeries::from_unsorted(
            (0..6)
                .rev()
                .map(|h| Measurement {
                    timestamp: at(h),
                    value: h as f64,
                })
                .collect(),
        );
        let slice = series.within(at(1), at(3));
        assert_eq!(slice.len(), 3);
        assert_eq!(slice[0].timestamp, at(1));
        assert_eq!(slice[2].timestamp, at(3));
        assert!(series.within(at(4), at(2)).is_empty());
        assert_eq!(series.span(), Some((at(0), at(5))));
    }

    #[test]
    fn test_payload_keeps_unknown_fields() {
        let raw = json!({
            "key": "PM10",
            "values": [
                {"date": "2024-01-02 10:00:00", "value": 12.5},
                {"date": "2024-01-02 09:00:00", "value": null}
            ],
            "unit": "ug/m3"
        });
        let payload: RawMeasurementPayload = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(payload.first_date(), Some("2024-01-02 10:00:00"));
        assert_eq!(payload.last_date(), Some("2024-01-02 09:00:00"));
        assert_eq!(serde_json::to_value(&payload).unwrap(), raw);
    }
}
