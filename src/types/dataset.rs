use crate::processing::series::parse_series;
use crate::types::measurement::{MeasurementSeries, RawMeasurementPayload};
use std::fmt;

/// Where a [`SensorDataset`] came from.
///
/// Only freshly fetched data may be written to the local store; data that was
/// read back from disk is already there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatasetOrigin {
    Fetched,
    Loaded,
}

impl fmt::Display for DatasetOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatasetOrigin::Fetched => write!(f, "fetched"),
            DatasetOrigin::Loaded => write!(f, "loaded"),
        }
    }
}

/// The full measurement series of one sensor plus its provenance.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorDataset {
    /// Parameter key, e.g. "PM10". Also the first component of the cache file name.
    pub key: String,
    /// The payload exactly as received (or as read from the cache file).
    pub payload: RawMeasurementPayload,
    /// Parsed, ascending series derived from `payload.values`.
    pub series: MeasurementSeries,
    /// Display string of the station the data belongs to.
    pub source_location: String,
    pub origin: DatasetOrigin,
}

impl SensorDataset {
    pub fn new(
        payload: RawMeasurementPayload,
        source_location: impl Into<String>,
        origin: DatasetOrigin,
    ) -> Self {
        let series = parse_series(&payload.values);
        SensorDataset {
            key: payload.key.clone(),
            payload,
            series,
            source_location: source_location.into(),
            origin,
        }
    }
}
