use axum::Json;
use axum::body::Body;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use futures::TryStreamExt;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use super::json_body;
use crate::error::RelayError;
use crate::metrics::{REQUEST_LATENCY, REQUEST_TOTAL, UPSTREAM_ERRORS};
use crate::models::{GenerateQuery, GenerateResponse};
use crate::state::AppState;

const CONTEXT: &str = "Error communicating with the server";

pub async fn generate_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<GenerateQuery>, JsonRejection>,
) -> Result<Response, RelayError> {
    REQUEST_TOTAL.inc();

    let query = json_body(payload, "Invalid request body")?;
    let prompt = query
        .prompt
        .ok_or_else(|| RelayError::BadRequest("Prompt is required".to_string()))?;
    let model = query.model.unwrap_or_else(|| state.default_model.clone());
    let stream = query.stream.unwrap_or(true);
    info!(model = %model, stream, "generate request");

    let start_time = Instant::now();

    if stream {
        let fragments = state
            .upstream
            .generate_stream(&prompt, &model)
            .await
            .map_err(RelayError::upstream(CONTEXT))?;
        REQUEST_LATENCY.observe(start_time.elapsed().as_secs_f64());

        // an error mid-stream can only abort the body, the status is already sent
        let body = Body::from_stream(
            fragments.inspect_err(|err| {
                UPSTREAM_ERRORS.inc();
                warn!(error = %err, "upstream stream failed");
            }),
        );
        Ok(([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], body).into_response())
    } else {
        let response = state
            .upstream
            .generate(&prompt, &model)
            .await
            .map_err(RelayError::upstream(CONTEXT))?;
        REQUEST_LATENCY.observe(start_time.elapsed().as_secs_f64());

        Ok(Json(GenerateResponse { response }).into_response())
    }
}
