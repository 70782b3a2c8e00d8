use axum::Json;

use crate::indices::{IndexInfo, INDICES};

/// Indices available for signal generation, in display order
pub async fn get_indices() -> Json<Vec<IndexInfo>> {
    Json(INDICES.to_vec())
}
