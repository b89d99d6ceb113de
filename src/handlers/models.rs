use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use std::sync::Arc;

use super::json_body;
use crate::error::RelayError;
use crate::metrics::REQUEST_TOTAL;
use crate::models::{DownloadQuery, MessageResponse, ModelsResponse};
use crate::state::AppState;

pub async fn download_model_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<DownloadQuery>, JsonRejection>,
) -> Result<Json<MessageResponse>, RelayError> {
    REQUEST_TOTAL.inc();

    let name = json_body(payload, "Invalid request body")?
        .llm_name
        .ok_or_else(|| RelayError::BadRequest("llm_name is required".to_string()))?;

    state
        .upstream
        .pull_model(&name)
        .await
        .map_err(RelayError::upstream("Error downloading model"))?;

    Ok(Json(MessageResponse::new(format!(
        "Model {} downloaded successfully",
        name
    ))))
}

pub async fn list_models_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ModelsResponse>, RelayError> {
    REQUEST_TOTAL.inc();

    let models = state
        .upstream
        .list_models()
        .await
        .map_err(RelayError::upstream("Error fetching models"))?;

    Ok(Json(ModelsResponse { models }))
}
