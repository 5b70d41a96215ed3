// src/explorer/models.rs

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::network::Network;

/// Rendered in place of the recipient when a transaction created a contract
/// (the explorer reports those rows with an empty `to` field).
pub const CONTRACT_CREATION: &str = "(contract creation)";

// --- Error taxonomy ---

/// Every client operation fails with exactly one of these. Transport
/// failures fold into `Upstream`: callers do not need to distinguish a dead
/// connection from an explorer-reported failure.
#[derive(Debug, Error)]
pub enum ExplorerError {
    #[error("invalid address '{input}': {reason}")]
    InvalidAddress { input: String, reason: String },

    #[error("network '{network}' has no explorer API key configured. Usable networks: {usable}")]
    NetworkUnavailable { network: Network, usable: String },

    #[error("explorer API error: {0}")]
    Upstream(String),
}

impl From<reqwest::Error> for ExplorerError {
    fn from(err: reqwest::Error) -> Self {
        ExplorerError::Upstream(format!("request failed: {err}"))
    }
}

// --- Upstream envelope ---

/// The response shape shared by the whole Etherscan API family:
/// `status` "1" means success, anything else is a failure, and `result`
/// carries the payload when present. This contract is dictated by upstream.
#[derive(Debug, Deserialize)]
pub struct ApiEnvelope {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub result: Option<Value>,
}

// --- Upstream row shapes (all fields arrive as text) ---

#[derive(Debug, Deserialize)]
pub struct TxRow {
    pub hash: String,
    pub from: String,
    #[serde(default)]
    pub to: String,
    pub value: String,
    #[serde(rename = "timeStamp")]
    pub time_stamp: String,
    #[serde(rename = "blockNumber")]
    pub block_number: String,
}

#[derive(Debug, Deserialize)]
pub struct TokenTxRow {
    pub hash: String,
    pub from: String,
    #[serde(default)]
    pub to: String,
    pub value: String,
    #[serde(rename = "timeStamp")]
    pub time_stamp: String,
    #[serde(rename = "blockNumber")]
    pub block_number: String,
    #[serde(rename = "contractAddress")]
    pub contract_address: String,
    #[serde(rename = "tokenName")]
    pub token_name: String,
    #[serde(rename = "tokenSymbol")]
    pub token_symbol: String,
    #[serde(rename = "tokenDecimal", default)]
    pub token_decimal: String,
}

#[derive(Debug, Deserialize)]
pub struct GasOracleRow {
    #[serde(rename = "SafeGasPrice")]
    pub safe_gas_price: String,
    #[serde(rename = "ProposeGasPrice")]
    pub propose_gas_price: String,
    #[serde(rename = "FastGasPrice")]
    pub fast_gas_price: String,
}

// --- Typed results (derived, never persisted) ---

/// Native-currency balance of one address on one network.
#[derive(Debug, Serialize)]
pub struct BalanceInfo {
    pub address: String,
    /// Raw atomic-unit integer, as reported by the explorer.
    pub wei: String,
    /// Decimal string, 18-decimal native convention.
    pub formatted: String,
    pub symbol: &'static str,
    pub network: Network,
}

#[derive(Debug, Serialize)]
pub struct TransactionRecord {
    pub hash: String,
    pub from: String,
    /// Recipient address, or [`CONTRACT_CREATION`] for creation transactions.
    pub to: String,
    pub value: String,
    pub timestamp: u64,
    pub block_number: u64,
}

#[derive(Debug, Serialize)]
pub struct TokenTransferRecord {
    pub token: String,
    pub token_name: String,
    pub token_symbol: String,
    pub from: String,
    pub to: String,
    /// Formatted with the per-row token decimal count, never a fixed default.
    pub value: String,
    pub timestamp: u64,
    pub block_number: u64,
}

/// Point-in-time gas snapshot, gwei-denominated. Never cached.
#[derive(Debug, Serialize)]
pub struct GasOracle {
    pub safe: String,
    pub propose: String,
    pub fast: String,
}

/// Outcome of an ENS reverse lookup. `NotFound` (the address has no name)
/// and `NotSupported` (the network has no ENS at all) are distinct outcomes
/// and must stay distinct through to the caller-facing text.
#[derive(Debug, PartialEq, Eq)]
pub enum EnsLookup {
    Found(String),
    NotFound,
    NotSupported(Network),
}
