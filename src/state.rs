use std::sync::Arc;
use crate::config::Args;
use crate::store::TelemetryStore;
use crate::upstream::OllamaClient;
// app's shared state

pub struct AppState {
    pub upstream: OllamaClient,
    pub store: TelemetryStore,
    pub default_model: String,   // used when a generate request names no model
    pub telemetry_model: String, // queried once per ingested record
}

impl AppState {
    pub fn from_args(args: &Args) -> Arc<Self> {
        Arc::new(Self {
            upstream: OllamaClient::new(&args.ollama_url, args.timeouts()),
            store: TelemetryStore::new(),
            default_model: args.model.clone(),
            telemetry_model: args.telemetry_model.clone(),
        })
    }
}
