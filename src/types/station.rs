//! Defines the flattened representation of a GIOŚ monitoring station and the
//! conversion from the nested shape returned by `/station/findAll`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// A single air-quality monitoring station.
///
/// The remote API nests the address under `city.commune`; this struct is the
/// flat record the rest of the crate works with and the element type of the
/// station-list cache file.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
pub struct Station {
    /// Station identifier used by `/station/sensors/{id}`.
    #[serde(default)]
    pub id: i64,
    /// Commune (city) name.
    #[serde(default)]
    pub city: String,
    /// District (powiat) name.
    #[serde(default)]
    pub district: String,
    /// Province (województwo) name.
    #[serde(default)]
    pub province: String,
    /// Street / station name as published by the API.
    #[serde(default, rename = "station_street")]
    pub street: String,
}

impl Station {
    /// Flattens one element of the `/station/findAll` response.
    ///
    /// Missing or non-string fields become empty strings and a missing id
    /// becomes `0`, so a malformed element never aborts the whole list.
    pub fn from_api_value(value: &Value) -> Self {
        let text = |pointer: &str| {
            value
                .pointer(pointer)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };

        Station {
            id: value.get("id").and_then(Value::as_i64).unwrap_or_default(),
            city: text("/city/commune/communeName"),
            district: text("/city/commune/districtName"),
            province: text("/city/commune/provinceName"),
            street: text("/stationName"),
        }
    }

    /// Reads one element of the station-list cache file. Fields of the wrong
    /// type are treated like missing ones.
    pub fn from_cache_value(value: &Value) -> Self {
        let text = |key: &str| {
            value
                .get(key)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };

        Station {
            id: value.get("id").and_then(Value::as_i64).unwrap_or_default(),
            city: text("city"),
            district: text("district"),
            province: text("province"),
            street: text("station_street"),
        }
    }

    /// The `"city, district, province, street"` string shown to the user and
    /// used as the cache directory name for this station's datasets.
    pub fn display_name(&self) -> String {
        format!(
            "{}, {}, {}, {}",
            self.city, self.district, self.province, self.street
        )
    }
}

impl fmt::Display for Station {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_name())
    }
}
