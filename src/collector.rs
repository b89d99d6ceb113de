//! Telemetry ingestion: validate, stamp, annotate with a model query.

use chrono::{SecondsFormat, Utc};
use tracing::{info, warn};

use crate::error::{RelayError, UpstreamError};
use crate::models::{Annotation, TelemetryPayload, TelemetryRecord};
use crate::upstream::OllamaClient;

pub const DIAGNOSTIC_PROMPT: &str = "Say hello in one word.";

// Set by the server only
const RESERVED_FIELDS: [&str; 3] = ["ollama_query", "ollama_response", "ollama_error"];

/// Build the stored record for `payload`.
///
/// Only a missing `key` or `value` fails; a failed model query ends up in
/// the record's `ollama_error` instead.
pub async fn enrich(
    upstream: &OllamaClient,
    model: &str,
    payload: TelemetryPayload,
) -> Result<TelemetryRecord, RelayError> {
    let TelemetryPayload { key, value, url, timestamp, mut extra } = payload;
    let (Some(key), Some(value)) = (key, value) else {
        return Err(RelayError::BadRequest("Invalid data format".to_string()));
    };
    for field in RESERVED_FIELDS {
        extra.remove(field);
    }
    let timestamp = timestamp.unwrap_or_else(now_rfc3339);

    let annotation = match upstream.generate(DIAGNOSTIC_PROMPT, model).await {
        Ok(text) => {
            info!(key = %key, response = %preview(&text, 50), "ollama query succeeded");
            Annotation::Response(text)
        }
        Err(err) => {
            let cause = describe_failure(&err, upstream.base_url());
            warn!(key = %key, error = %err, "ollama query failed");
            Annotation::Error(cause)
        }
    };

    info!(
        key = %key,
        value = %preview(&value, 100),
        url = url.as_deref().unwrap_or("-"),
        timestamp = %timestamp,
        "received telemetry"
    );

    Ok(TelemetryRecord {
        key,
        value,
        url,
        timestamp,
        ollama_query: DIAGNOSTIC_PROMPT.to_string(),
        annotation,
        extra,
    })
}

pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Human-readable cause stored in `ollama_error`.
pub fn describe_failure(err: &UpstreamError, base_url: &str) -> String {
    match err {
        UpstreamError::Timeout(limit) => {
            format!("Ollama request timed out after {} seconds.", limit.as_secs())
        }
        UpstreamError::Connect { .. } => {
            format!("Could not connect to Ollama at {}. Is it running?", base_url)
        }
        UpstreamError::Status { status, body } => {
            format!("HTTP error from Ollama: {} - {}", status, body)
        }
        UpstreamError::Transport(e) => {
            format!("Unexpected error while querying Ollama: {}", e)
        }
    }
}

// First `max` chars, for log lines
fn preview(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
