use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::domain::{Position, Roll, RollChain, SummaryStats, Transaction};
use crate::engine::{build_positions_with, calculate_summary};
use crate::error::AppError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildRequest {
    pub transactions: Vec<Transaction>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildResponse {
    pub positions: Vec<Position>,
    pub rolls: Vec<Roll>,
    pub roll_chains: Vec<RollChain>,
    pub summary: SummaryStats,
}

pub async fn build_positions(
    State(state): State<AppState>,
    payload: Result<Json<BuildRequest>, JsonRejection>,
) -> Result<Json<BuildResponse>, AppError> {
    let Json(request) = payload?;
    validate_transactions(&request.transactions)?;

    let options = state.config.pipeline_options();
    let classifier = state.classifier.clone();
    let transactions = request.transactions;

    // Pipeline is synchronous; run it on the blocking pool.
    let output = tokio::task::spawn_blocking(move || {
        build_positions_with(&transactions, &options, classifier.as_ref())
    })
    .await?;

    let summary = calculate_summary(&output.positions);
    tracing::info!(
        positions = output.positions.len(),
        rolls = output.rolls.len(),
        roll_chains = output.roll_chains.len(),
        "positions built"
    );

    Ok(Json(BuildResponse {
        positions: output.positions,
        rolls: output.rolls,
        roll_chains: output.roll_chains,
        summary,
    }))
}

fn validate_transactions(transactions: &[Transaction]) -> Result<(), AppError> {
    for tx in transactions {
        if tx.id.is_empty() {
            return Err(AppError::BadRequest("Transaction id must not be empty".into()));
        }
        if tx.code.is_option() && !tx.quantity.is_positive() {
            return Err(AppError::BadRequest(format!(
                "Transaction {} has non-positive quantity {}",
                tx.id, tx.quantity
            )));
        }
    }
    Ok(())
}
