//! Error types for the relay.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

use crate::metrics::UPSTREAM_ERRORS;

/// Failure talking to the inference server.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// Upstream answered with an unexpected status
    #[error("upstream returned status {status}: {body}")]
    Status { status: StatusCode, body: String },

    /// No answer (or no new body data) within the configured timeout
    #[error("request timed out after {} seconds", .0.as_secs())]
    Timeout(Duration),

    /// Connection refused, DNS failure and friends
    #[error("could not connect to {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Anything else on the wire, including a body cut short
    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),
}

impl UpstreamError {
    /// Classify a reqwest error for the request sent to `url`.
    pub fn from_reqwest(err: reqwest::Error, url: &str, timeout: Duration) -> Self {
        if err.is_timeout() {
            UpstreamError::Timeout(timeout)
        } else if err.is_connect() {
            UpstreamError::Connect {
                url: url.to_string(),
                source: err,
            }
        } else {
            UpstreamError::Transport(err)
        }
    }

    /// Status code of the upstream answer, if there was one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            UpstreamError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Errors surfaced on the relay's own HTTP interface.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Missing field or unreadable body
    #[error("{0}")]
    BadRequest(String),

    #[error("Endpoint not found")]
    NotFound,

    #[error("{context}: {source}")]
    Upstream {
        context: &'static str,
        #[source]
        source: UpstreamError,
    },
}

impl RelayError {
    pub fn upstream(context: &'static str) -> impl FnOnce(UpstreamError) -> Self {
        move |source| RelayError::Upstream { context, source }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            RelayError::BadRequest(_) => StatusCode::BAD_REQUEST,
            RelayError::NotFound => StatusCode::NOT_FOUND,
            RelayError::Upstream { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if let RelayError::Upstream { .. } = &self {
            UPSTREAM_ERRORS.inc();
            warn!(error = %self, "upstream call failed");
        }
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

pub type Result<T> = std::result::Result<T, RelayError>;
