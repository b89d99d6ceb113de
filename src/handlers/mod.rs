mod dashboard;
mod fallback;
mod generate;
mod health;
mod metrics;
mod models;
mod telemetry;

pub use dashboard::dashboard_handler;
pub use fallback::not_found_handler;
pub use generate::generate_handler;
pub use health::health_handler;
pub use metrics::metrics_handler;
pub use models::{download_model_handler, list_models_handler};
pub use telemetry::{clear_data_handler, get_data_handler, receive_data_handler};

use axum::Json;
use axum::extract::rejection::JsonRejection;
use tracing::debug;

use crate::error::RelayError;

// Unwrap a JSON body, turning any rejection into a 400. Well-formed JSON of
// the wrong shape gets `invalid` as its message.
fn json_body<T>(
    payload: Result<Json<T>, JsonRejection>,
    invalid: &'static str,
) -> Result<T, RelayError> {
    match payload {
        Ok(Json(body)) => Ok(body),
        Err(JsonRejection::JsonDataError(err)) => {
            debug!(reason = %err.body_text(), "request body has the wrong shape");
            Err(RelayError::BadRequest(invalid.to_string()))
        }
        Err(rejection) => {
            debug!(reason = %rejection.body_text(), "rejected request body");
            Err(RelayError::BadRequest(format!(
                "Request must be JSON: {}",
                rejection.body_text()
            )))
        }
    }
}
