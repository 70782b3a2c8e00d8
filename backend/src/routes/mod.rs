use axum::{http::StatusCode, routing::get, Json, Router};
use serde::Serialize;

use crate::error::SignalError;
use crate::state::AppState;

pub mod indices;
pub mod signal;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health))
        .route("/indices", get(indices::get_indices))
        .route("/signal", get(signal::get_signal));

    Router::new().nest("/api", api_routes).with_state(state)
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

pub fn status_for(err: &SignalError) -> StatusCode {
    match err {
        SignalError::UnknownIndex(_) | SignalError::InvalidParameter(_) => StatusCode::BAD_REQUEST,
        SignalError::InsufficientData { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        SignalError::UpstreamFetch(_)
        | SignalError::MissingColumn(_)
        | SignalError::ShapeMismatch { .. } => StatusCode::BAD_GATEWAY,
        SignalError::UndefinedValue { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub fn error_response(err: SignalError) -> (StatusCode, Json<ErrorResponse>) {
    (
        status_for(&err),
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
}
