//! Normalization of the API's loosely shaped JSON responses.
//!
//! Depending on the endpoint (and on the API version) a response is either a
//! bare array or an object. [`RawPayload`] captures that ambiguity once, and the
//! `into_*` conversions resolve it into the canonical shapes used everywhere
//! else, so nothing past the client boundary ever sees it.

use crate::types::measurement::RawMeasurementPayload;
use crate::types::sensor::Sensor;
use crate::types::station::Station;
use serde_json::{Map, Value};

/// A response body that is either a bare array or an object. Built from an
/// already parsed [`Value`] with `TryFrom`; anything else is a format error.
#[derive(Debug, Clone, PartialEq)]
pub enum RawPayload {
    Array(Vec<Value>),
    Object(Map<String, Value>),
}

/// Canonical `{data: Sensor[]}` form of a station-sensors response.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SensorList {
    pub data: Vec<Sensor>,
}

impl TryFrom<Value> for RawPayload {
    type Error = &'static str;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Array(items) => Ok(RawPayload::Array(items)),
            Value::Object(map) => Ok(RawPayload::Object(map)),
            _ => Err("expected a JSON array or object"),
        }
    }
}

impl RawPayload {
    pub fn into_station_list(self) -> Result<Vec<Station>, &'static str> {
        match self {
            RawPayload::Array(items) => Ok(items.iter().map(Station::from_api_value).collect()),
            RawPayload::Object(_) => Err("expected a JSON array of stations"),
        }
    }

    pub fn into_sensor_list(self) -> Result<SensorList, &'static str> {
        let items = match self {
            RawPayload::Array(items) => items,
            RawPayload::Object(mut map) => match map.remove("data") {
                Some(Value::Array(items)) => items,
                _ => return Err("expected a sensor array or an object with a `data` array"),
            },
        };
        Ok(SensorList {
            data: items.iter().map(Sensor::from_api_value).collect(),
        })
    }

    /// A bare array is taken as the `values` list with an empty key; objects
    /// must carry their records under `values` (or `data`).
    pub fn into_measurements(self) -> Result<RawMeasurementPayload, &'static str> {
        match self {
            RawPayload::Array(values) => Ok(RawMeasurementPayload {
                key: String::new(),
                values,
                extra: Map::new(),
            }),
            RawPayload::Object(mut map) => {
                let values = match map.remove("values").or_else(|| map.remove("data")) {
                    Some(Value::Array(values)) => values,
                    _ => return Err("expected a measurement object with a `values` array"),
                };
                let key = match map.remove("key") {
                    Some(Value::String(key)) => key,
                    _ => String::new(),
                };
                Ok(RawMeasurementPayload {
                    key,
                    values,
                    extra: map,
                })
            }
        }
    }
}
