use axum::http::Uri;
use tracing::debug;

use crate::error::RelayError;

pub async fn not_found_handler(uri: Uri) -> RelayError {
    debug!(path = %uri.path(), "no route");
    RelayError::NotFound
}
