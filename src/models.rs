use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// POST /api/generate body
#[derive(Deserialize, Debug, Clone)]
pub struct GenerateQuery {
    pub prompt: Option<String>,
    pub model: Option<String>,
    pub stream: Option<bool>,
}

// Buffered /api/generate answer
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct GenerateResponse {
    pub response: String,
}

// POST /api/models/download body
#[derive(Deserialize, Debug, Clone)]
pub struct DownloadQuery {
    pub llm_name: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ModelsResponse {
    pub models: Value,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

// POST /receive_data body; unknown fields are carried along
#[derive(Deserialize, Debug, Clone, Default)]
pub struct TelemetryPayload {
    pub key: Option<String>,
    pub value: Option<String>,
    pub url: Option<String>,
    pub timestamp: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Outcome of the diagnostic model query attached to a record.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub enum Annotation {
    #[serde(rename = "ollama_response")]
    Response(String),
    #[serde(rename = "ollama_error")]
    Error(String),
}

/// A stored telemetry record. Immutable once built.
#[derive(Serialize, Debug, Clone)]
pub struct TelemetryRecord {
    pub key: String,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub timestamp: String,
    pub ollama_query: String,
    #[serde(flatten)]
    pub annotation: Annotation,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
