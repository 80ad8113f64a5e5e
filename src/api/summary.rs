use axum::extract::rejection::JsonRejection;
use axum::Json;
use serde::Deserialize;

use crate::domain::{Position, SummaryStats};
use crate::engine::calculate_summary;
use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub struct SummaryRequest {
    pub positions: Vec<Position>,
}

/// Aggregate a caller-supplied position set without rebuilding it.
pub async fn summarize(
    payload: Result<Json<SummaryRequest>, JsonRejection>,
) -> Result<Json<SummaryStats>, AppError> {
    let Json(request) = payload?;
    Ok(Json(calculate_summary(&request.positions)))
}
