use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use super::{parse_network, status_for};
use crate::explorer::models::TransactionRecord;
use crate::AppState;

// --- Request and Response Models ---

/// Defines the structure for the path parameters for transaction history.
#[derive(Debug, Deserialize)]
pub struct HistoryPath {
    pub network: String,
    pub address: String,
}

/// Defines the structure for the query parameters for transaction history.
#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
}

/// Defines the structure for the JSON output of the transaction history API.
#[derive(Debug, Serialize)]
pub struct HistoryOutput {
    pub address: String,
    pub transactions: Vec<TransactionRecord>,
}

// --- Handler ---

/// Handler for the GET /history/{network}/{address} endpoint.
pub async fn get_transaction_history_handler(
    Path(path): Path<HistoryPath>,
    Query(query): Query<HistoryQuery>,
    State(state): State<AppState>,
) -> Result<Json<HistoryOutput>, (StatusCode, String)> {
    info!(
        "Received request for transaction history for network '{}' and address '{}'",
        path.network, path.address
    );

    let network = parse_network(&path.network)?;
    let limit = query.limit.unwrap_or(10);
    if !(1..=100).contains(&limit) {
        return Err((
            StatusCode::BAD_REQUEST,
            format!("'limit' must be between 1 and 100, got {}", limit),
        ));
    }

    match state
        .explorer
        .get_transactions(&path.address, limit, Some(network))
        .await
    {
        Ok(transactions) => Ok(Json(HistoryOutput {
            address: path.address,
            transactions,
        })),
        Err(e) => {
            error!(
                "Failed to get transaction history for {}: {}",
                path.address, e
            );
            Err((status_for(&e), e.to_string()))
        }
    }
}
