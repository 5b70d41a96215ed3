use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::error;

use super::{parse_network, status_for};
use crate::explorer::models::GasOracle;
use crate::AppState;

/// Handler for the GET /gas/{network} endpoint.
pub async fn get_gas_oracle_handler(
    Path(network): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<GasOracle>, (StatusCode, String)> {
    let network = parse_network(&network)?;

    match state.explorer.get_gas_oracle(Some(network)).await {
        Ok(gas) => Ok(Json(gas)),
        Err(e) => {
            error!("Failed to fetch gas oracle for {}: {}", network, e);
            Err((status_for(&e), e.to_string()))
        }
    }
}
