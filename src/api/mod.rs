//! # API Module
//!
//! This module contains HTTP API handlers for the explorer MCP server.
//! It provides RESTful endpoints mirroring the MCP tools for clients that
//! prefer plain HTTP.
//!
//! ## Available Endpoints
//!
//! - `GET /health` - Liveness check
//! - `GET /balance/:network/:address` - Native currency balance
//! - `GET /history/:network/:address?limit=N` - Recent transactions
//! - `GET /gas/:network` - Current gas price snapshot
//! - `POST /rpc` - JSON-RPC endpoint for MCP tool calls

pub mod balance;
pub mod gas;
pub mod health;
pub mod history;

use axum::http::StatusCode;

use crate::explorer::models::ExplorerError;
use crate::explorer::network::{Network, UnknownNetwork};

/// HTTP status for each failure class: caller mistakes are 400, a network
/// without a credential is 503, upstream trouble is 502.
pub(crate) fn status_for(err: &ExplorerError) -> StatusCode {
    match err {
        ExplorerError::InvalidAddress { .. } => StatusCode::BAD_REQUEST,
        ExplorerError::NetworkUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        ExplorerError::Upstream(_) => StatusCode::BAD_GATEWAY,
    }
}

pub(crate) fn parse_network(tag: &str) -> Result<Network, (StatusCode, String)> {
    tag.parse::<Network>()
        .map_err(|e: UnknownNetwork| (StatusCode::BAD_REQUEST, e.to_string()))
}
