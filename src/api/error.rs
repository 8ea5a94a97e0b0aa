use crate::error::ErrorKind;
use thiserror::Error;

/// Failures of a single request against the GIOŚ REST API.
///
/// The messages carry both the failure class and the transport detail, since
/// they are shown to the user as is.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Network error for {url}: {detail}")]
    NetworkRequest {
        url: String,
        /// The request error followed by its whole source chain, e.g. down
        /// to "Connection refused (os error 111)".
        detail: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Network error for {url}: HTTP status {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
        #[source]
        source: reqwest::Error,
    },

    #[error("Format error for {url}: response is not valid JSON ({source})")]
    JsonParse {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Format error for {url}: {reason}")]
    UnexpectedShape { url: String, reason: &'static str },
}

impl ApiError {
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        ApiError::NetworkRequest {
            url: url.into(),
            detail: error_chain(&source),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::NetworkRequest { .. } | ApiError::HttpStatus { .. } => ErrorKind::Network,
            ApiError::JsonParse { .. } | ApiError::UnexpectedShape { .. } => ErrorKind::Format,
        }
    }
}

/// Joins an error's message with those of all its sources.
fn error_chain(error: &dyn std::error::Error) -> String {
    let mut detail = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let message = cause.to_string();
        if !detail.contains(&message) {
            detail.push_str(": ");
            detail.push_str(&message);
        }
        source = cause.source();
    }
    detail
}
