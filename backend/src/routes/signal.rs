use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use super::{error_response, ErrorResponse};
use crate::indices::find_index;
use crate::services::signal_service::{self, SignalReport};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SignalQuery {
    /// Display name, e.g. "NIFTY 50"
    pub index: String,
}

/// Fetch fresh bars for the index and classify the latest one
pub async fn get_signal(
    State(state): State<AppState>,
    Query(query): Query<SignalQuery>,
) -> Result<Json<SignalReport>, (StatusCode, Json<ErrorResponse>)> {
    let index = find_index(&query.index).map_err(error_response)?;

    match signal_service::generate_signal(&state, index).await {
        Ok(report) => Ok(Json(report)),
        Err(e) => {
            tracing::warn!("Signal generation failed for {}: {}", index.name, e);
            Err(error_response(e))
        }
    }
}
