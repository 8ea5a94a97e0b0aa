use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One measured parameter (PM10, NO2, ...) attached to a station.
///
/// Sensors only live as long as the station-details response that produced
/// them; they are never written to disk on their own.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Sensor {
    /// Identifier used by `/data/getData/{id}`.
    pub id: i64,
    /// Human readable parameter name, e.g. "pył zawieszony PM10".
    pub param_name: String,
    /// Short parameter code, e.g. "PM10".
    pub param_code: String,
}

impl Sensor {
    /// Flattens one element of the `/station/sensors/{id}` response, where the
    /// parameter description is nested under `param`.
    pub fn from_api_value(value: &Value) -> Self {
        let text = |pointer: &str| {
            value
                .pointer(pointer)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };

        Sensor {
            id: value.get("id").and_then(Value::as_i64).unwrap_or_default(),
            param_name: text("/param/paramName"),
            param_code: text("/param/paramCode"),
        }
    }

    /// Button-style label, `"paramName (paramCode)"`.
    pub fn label(&self) -> String {
        format!("{} ({})", self.param_name, self.param_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flatten_sensor() {
        let raw = json!({
            "id": 92,
            "stationId": 14,
            "param": {
                "paramName": "pył zawieszony PM10",
                "paramFormula": "PM10",
                "paramCode": "PM10",
                "idParam": 3
            }
        });
        let sensor = Sensor::from_api_value(&raw);
        assert_eq!(sensor.id, 92);
        assert_eq!(sensor.param_code, "PM10");
        assert_eq!(sensor.label(), "pył zawieszony PM10 (PM10)");
    }

    #[test]
    fn test_sensor_without_param() {
        let sensor = Sensor::from_api_value(&json!({ "id": 3 }));
        assert_eq!(sensor.id, 3);
        assert!(sensor.param_name.is_empty());
        assert!(sensor.param_code.is_empty());
    }
}
