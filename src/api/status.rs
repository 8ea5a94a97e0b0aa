use std::fmt;

/// The request a [`StatusEvent`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    Stations,
    StationSensors(i64),
    SensorData(i64),
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestKind::Stations => write!(f, "station list"),
            RequestKind::StationSensors(id) => write!(f, "sensors of station {}", id),
            RequestKind::SensorData(id) => write!(f, "data of sensor {}", id),
        }
    }
}

/// Human readable progress of a request.
///
/// Status events travel on their own channel, apart from the request result;
/// a request emits one when it starts and one more when it succeeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEvent {
    pub request: RequestKind,
    pub message: String,
}

impl fmt::Display for StatusEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}
