use crate::api::status::RequestKind;
use std::fmt;

/// Where a [`crate::SessionController`] is in the stations → sensors → data
/// sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    StationsLoading,
    StationsReady,
    SensorsLoading,
    SensorsReady,
    DataLoading,
    DataReady,
    /// A request failed. `resume` is the Ready (or Idle) state that
    /// `dismiss_error` returns to; the data of that state is still intact.
    Error {
        message: String,
        resume: Box<SessionState>,
    },
}

impl SessionState {
    pub fn is_loading(&self) -> bool {
        matches!(
            self,
            SessionState::StationsLoading | SessionState::SensorsLoading | SessionState::DataLoading
        )
    }

    pub fn is_error(&self) -> bool {
        matches!(self, SessionState::Error { .. })
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Idle => write!(f, "idle"),
            SessionState::StationsLoading => write!(f, "loading stations"),
            SessionState::StationsReady => write!(f, "stations ready"),
            SessionState::SensorsLoading => write!(f, "loading sensors"),
            SessionState::SensorsReady => write!(f, "sensors ready"),
            SessionState::DataLoading => write!(f, "loading data"),
            SessionState::DataReady => write!(f, "data ready"),
            SessionState::Error { message, .. } => write!(f, "error: {}", message),
        }
    }
}

/// Refers to one entry of the sensor list currently shown.
///
/// Handles are only valid for the sensor list they were issued with; after
/// another station is selected, older handles are rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SensorHandle {
    pub(crate) generation: u64,
    pub(crate) index: usize,
}

/// Proof that a request was started through one of the `begin_*` methods.
///
/// A front end that drives the network itself takes [`RequestTicket::request`]
/// to know what to fetch and hands the ticket back with the result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTicket {
    pub(crate) id: u64,
    pub(crate) request: RequestKind,
    pub(crate) location: String,
    pub(crate) param_code: String,
}

impl RequestTicket {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn request(&self) -> RequestKind {
        self.request
    }

    /// Display string of the station the request concerns; empty for the
    /// station list.
    pub fn location(&self) -> &str {
        &self.location
    }
}
