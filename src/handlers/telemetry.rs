use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use std::sync::Arc;
use tracing::info;

use super::json_body;
use crate::collector;
use crate::error::RelayError;
use crate::metrics::REQUEST_TOTAL;
use crate::models::{MessageResponse, TelemetryPayload, TelemetryRecord};
use crate::state::AppState;

// Answers only after the model round-trip, success or not
pub async fn receive_data_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<TelemetryPayload>, JsonRejection>,
) -> Result<Json<TelemetryRecord>, RelayError> {
    REQUEST_TOTAL.inc();

    let payload = json_body(payload, "Invalid data format")?;
    let record = collector::enrich(&state.upstream, &state.telemetry_model, payload).await?;
    state.store.append(record.clone()).await;
    Ok(Json(record))
}

pub async fn get_data_handler(State(state): State<Arc<AppState>>) -> Json<Vec<TelemetryRecord>> {
    REQUEST_TOTAL.inc();
    Json(state.store.all().await)
}

pub async fn clear_data_handler(State(state): State<Arc<AppState>>) -> Json<MessageResponse> {
    REQUEST_TOTAL.inc();
    let removed = state.store.clear().await;
    info!(removed, "all received data cleared");
    Json(MessageResponse::new("Data cleared successfully"))
}
