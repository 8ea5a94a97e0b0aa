use crate::api::error::ApiError;
use crate::api::status::RequestKind;
use crate::store::error::StoreError;
use polars::prelude::PolarsError;
use std::fmt;
use thiserror::Error;

/// Coarse classification of a failure, for front ends that only care about
/// which kind of message to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Network,
    Format,
    Validation,
    Io,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Network => write!(f, "network error"),
            ErrorKind::Format => write!(f, "format error"),
            ErrorKind::Validation => write!(f, "validation error"),
            ErrorKind::Io => write!(f, "I/O error"),
        }
    }
}

#[derive(Debug, Error)]
pub enum GiosError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Polars(#[from] PolarsError),

    #[error("Unknown station '{0}'")]
    UnknownStation(String),

    #[error("Sensor selection is no longer valid")]
    InvalidSensorHandle,

    #[error("Only freshly fetched data can be saved")]
    SaveUnavailable,

    #[error("Request ticket for {0} does not belong to this completion")]
    TicketMismatch(RequestKind),

    #[error("Background task failed")]
    TaskJoin(#[from] tokio::task::JoinError),
}

impl GiosError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GiosError::Api(e) => e.kind(),
            GiosError::Store(e) => e.kind(),
            GiosError::Polars(_) => ErrorKind::Format,
            GiosError::UnknownStation(_)
            | GiosError::InvalidSensorHandle
            | GiosError::SaveUnavailable
            | GiosError::TicketMismatch(_) => ErrorKind::Validation,
            GiosError::TaskJoin(_) => ErrorKind::Io,
        }
    }
}
