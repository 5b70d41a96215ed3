use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::error;

use super::{parse_network, status_for};
use crate::explorer::models::BalanceInfo;
use crate::AppState;

// Defines the structure for the network and address extracted from the URL path.
#[derive(Debug, Deserialize)]
pub struct BalancePath {
    pub network: String,
    pub address: String,
}

/// Handler for the GET /balance/{network}/{address} endpoint.
pub async fn get_balance_handler(
    Path(path): Path<BalancePath>,
    State(state): State<AppState>,
) -> Result<Json<BalanceInfo>, (StatusCode, String)> {
    let network = parse_network(&path.network)?;

    match state.explorer.get_balance(&path.address, Some(network)).await {
        Ok(balance) => Ok(Json(balance)),
        Err(e) => {
            error!("Failed to get balance for {}: {}", path.address, e);
            Err((status_for(&e), e.to_string()))
        }
    }
}
