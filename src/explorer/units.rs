// src/explorer/units.rs

use ethers_core::types::U256;
use ethers_core::utils::format_units;

use super::models::ExplorerError;

/// Number of decimals used by the native currency on every supported network
/// (wei-style atomic units).
pub const NATIVE_DECIMALS: u32 = 18;

/// Converts an atomic-unit integer (as the explorer reports it: decimal
/// text) into a human-readable decimal string, e.g. "1000000000000000000"
/// with 18 decimals becomes "1", and "500000" with 6 decimals becomes "0.5".
///
/// The value arrives as untyped text from upstream JSON; a non-numeric value
/// is a hard upstream error, never a silent zero.
pub fn format_atomic(value: &str, decimals: u32) -> Result<String, ExplorerError> {
    let amount = U256::from_dec_str(value)
        .map_err(|e| ExplorerError::Upstream(format!("non-numeric value '{value}': {e}")))?;
    let formatted = format_units(amount, decimals)
        .map_err(|e| ExplorerError::Upstream(format!("cannot format value '{value}': {e}")))?;
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    if trimmed.is_empty() {
        Ok("0".to_string())
    } else {
        Ok(trimmed.to_string())
    }
}

/// Parses a numeric text field (block number, timestamp, decimal count) from
/// an upstream row, naming the field in the failure message.
pub fn parse_numeric_field(value: &str, field: &str) -> Result<u64, ExplorerError> {
    value.trim().parse::<u64>().map_err(|_| {
        ExplorerError::Upstream(format!("non-numeric '{field}' field in response: '{value}'"))
    })
}

/// Parses a token decimal count. Decimal counts fit in `u32` (the widest
/// `format_units` accepts); a larger value is as bogus as a non-numeric one
/// and fails the same way.
pub fn parse_decimals_field(value: &str, field: &str) -> Result<u32, ExplorerError> {
    value.trim().parse::<u32>().map_err(|_| {
        ExplorerError::Upstream(format!("invalid '{field}' field in response: '{value}'"))
    })
}
