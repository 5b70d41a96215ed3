// src/explorer/client.rs

use std::collections::HashMap;
use std::str::FromStr;

use ethers_core::types::Address;
use ethers_core::utils::to_checksum;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, error};

use super::models::{
    ApiEnvelope, BalanceInfo, EnsLookup, ExplorerError, GasOracle, GasOracleRow,
    TokenTransferRecord, TokenTxRow, TransactionRecord, TxRow, CONTRACT_CREATION,
};
use super::network::Network;
use super::units::{format_atomic, parse_decimals_field, parse_numeric_field, NATIVE_DECIMALS};
use crate::config::Config;

/// Client for the Etherscan-family explorer APIs of all supported networks.
///
/// Holds only immutable state (credential map, default network, shared
/// `reqwest::Client`), so clones are cheap and concurrent calls need no
/// coordination. Each operation resolves its target network, verifies a
/// usable credential exists before any I/O, issues exactly one GET, and maps
/// the `{status, message, result}` envelope into a typed result or a
/// classified [`ExplorerError`]. No retries: explorer APIs are rate-limited
/// and the caller owns any retry policy.
#[derive(Clone)]
pub struct ExplorerClient {
    http: Client,
    credentials: HashMap<Network, String>,
    default_network: Network,
    /// Per-network endpoint overrides; used by tests and self-hosted mirrors.
    api_urls: HashMap<Network, String>,
}

impl ExplorerClient {
    pub fn new(credentials: HashMap<Network, String>, default_network: Network) -> Self {
        Self {
            http: Client::new(),
            credentials,
            default_network,
            api_urls: HashMap::new(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.api_keys.clone(), config.default_network)
    }

    /// Overrides the explorer endpoint for one network.
    pub fn with_api_url(mut self, network: Network, url: impl Into<String>) -> Self {
        self.api_urls.insert(network, url.into());
        self
    }

    /// Explicit argument wins, otherwise the configured default. Every
    /// operation goes through this; the rule exists exactly once.
    pub fn resolve(&self, network: Option<Network>) -> Network {
        network.unwrap_or(self.default_network)
    }

    pub fn default_network(&self) -> Network {
        self.default_network
    }

    /// A network is usable iff its resolved credential is non-empty.
    pub fn is_usable(&self, network: Option<Network>) -> bool {
        let network = self.resolve(network);
        self.credentials
            .get(&network)
            .map(|key| !key.is_empty())
            .unwrap_or(false)
    }

    pub fn usable_networks(&self) -> Vec<Network> {
        Network::ALL
            .into_iter()
            .filter(|n| self.is_usable(Some(*n)))
            .collect()
    }

    fn api_url(&self, network: Network) -> &str {
        self.api_urls
            .get(&network)
            .map(String::as_str)
            .unwrap_or(network.config().api_url)
    }

    fn api_key(&self, network: Network) -> Result<&str, ExplorerError> {
        match self.credentials.get(&network) {
            Some(key) if !key.is_empty() => Ok(key.as_str()),
            _ => {
                let usable: Vec<&str> = self
                    .usable_networks()
                    .into_iter()
                    .map(|n| n.tag())
                    .collect();
                Err(ExplorerError::NetworkUnavailable {
                    network,
                    usable: if usable.is_empty() {
                        "none".to_string()
                    } else {
                        usable.join(", ")
                    },
                })
            }
        }
    }

    /// Canonicalizes an address to its checksummed form, rejecting anything
    /// that is not a 0x-prefixed 40-hex-character string. Input is never
    /// silently coerced.
    pub fn checksum_address(input: &str) -> Result<String, ExplorerError> {
        let invalid = |reason: &str| ExplorerError::InvalidAddress {
            input: input.to_string(),
            reason: reason.to_string(),
        };
        let trimmed = input.trim();
        if !trimmed.starts_with("0x") {
            return Err(invalid("must start with '0x'"));
        }
        if trimmed.len() != 42 {
            return Err(invalid("must be 42 characters long"));
        }
        let address = Address::from_str(trimmed)
            .map_err(|_| invalid("must contain only hexadecimal characters after '0x'"))?;
        Ok(to_checksum(&address, None))
    }

    /// One outbound GET with the family's query convention
    /// (`module`/`action`/... plus `apikey`). Transport failures, non-2xx
    /// statuses, and malformed JSON all surface as `Upstream`.
    async fn query(
        &self,
        network: Network,
        params: &[(&str, &str)],
    ) -> Result<ApiEnvelope, ExplorerError> {
        let api_key = self.api_key(network)?;
        let url = self.api_url(network);
        debug!(network = %network, url, ?params, "explorer query");

        let response = self
            .http
            .get(url)
            .query(params)
            .query(&[("apikey", api_key)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(network = %network, %status, "explorer returned HTTP error");
            return Err(ExplorerError::Upstream(format!(
                "HTTP {status} from {} explorer: {body}",
                network.config().display_name
            )));
        }

        response
            .json::<ApiEnvelope>()
            .await
            .map_err(|e| ExplorerError::Upstream(format!("malformed explorer response: {e}")))
    }

    /// Applies the family's success discriminator for single-payload
    /// endpoints: `status` must be "1" and `result` must be present.
    fn require_result(envelope: ApiEnvelope, operation: &str) -> Result<Value, ExplorerError> {
        if envelope.status != "1" {
            return Err(ExplorerError::Upstream(Self::upstream_message(
                &envelope, operation,
            )));
        }
        envelope
            .result
            .ok_or_else(|| ExplorerError::Upstream(format!("{operation}: missing result payload")))
    }

    /// Prefers the `result` text (the family puts detail there on failures),
    /// then `message`, then a generic description naming the operation.
    fn upstream_message(envelope: &ApiEnvelope, operation: &str) -> String {
        if let Some(detail) = envelope.result.as_ref().and_then(Value::as_str) {
            if !detail.is_empty() {
                return detail.to_string();
            }
        }
        if !envelope.message.is_empty() {
            return envelope.message.clone();
        }
        format!("{operation} failed with status '{}'", envelope.status)
    }

    /// List endpoints report "no rows" as a failure status with an empty
    /// result array; that is an empty success here. Only a failure status
    /// with no array payload is an error.
    fn require_rows<T: serde::de::DeserializeOwned>(
        envelope: ApiEnvelope,
        operation: &str,
    ) -> Result<Vec<T>, ExplorerError> {
        match envelope.result {
            Some(Value::Array(rows)) => serde_json::from_value(Value::Array(rows))
                .map_err(|e| ExplorerError::Upstream(format!("{operation}: malformed row: {e}"))),
            _ => Err(ExplorerError::Upstream(Self::upstream_message(
                &envelope, operation,
            ))),
        }
    }

    /// Native balance of `address`, formatted with the 18-decimal native
    /// convention shared by all supported networks.
    pub async fn get_balance(
        &self,
        address: &str,
        network: Option<Network>,
    ) -> Result<BalanceInfo, ExplorerError> {
        let network = self.resolve(network);
        let address = Self::checksum_address(address)?;
        let envelope = self
            .query(
                network,
                &[
                    ("module", "account"),
                    ("action", "balance"),
                    ("address", &address),
                    ("tag", "latest"),
                ],
            )
            .await?;
        let result = Self::require_result(envelope, "balance lookup")?;
        let wei = result
            .as_str()
            .ok_or_else(|| ExplorerError::Upstream("balance result is not a string".to_string()))?
            .to_string();
        let formatted = format_atomic(&wei, NATIVE_DECIMALS)?;
        Ok(BalanceInfo {
            address,
            wei,
            formatted,
            symbol: network.config().symbol,
            network,
        })
    }

    /// Most recent transactions for `address`, newest first, at most `limit`
    /// rows even if upstream returns more.
    pub async fn get_transactions(
        &self,
        address: &str,
        limit: usize,
        network: Option<Network>,
    ) -> Result<Vec<TransactionRecord>, ExplorerError> {
        let network = self.resolve(network);
        let address = Self::checksum_address(address)?;
        let offset = limit.to_string();
        let envelope = self
            .query(
                network,
                &[
                    ("module", "account"),
                    ("action", "txlist"),
                    ("address", &address),
                    ("startblock", "0"),
                    ("endblock", "99999999"),
                    ("page", "1"),
                    ("offset", &offset),
                    ("sort", "desc"),
                ],
            )
            .await?;
        let rows: Vec<TxRow> = Self::require_rows(envelope, "transaction list")?;

        rows.into_iter()
            .take(limit)
            .map(|row| {
                Ok(TransactionRecord {
                    to: if row.to.is_empty() {
                        CONTRACT_CREATION.to_string()
                    } else {
                        row.to
                    },
                    value: format_atomic(&row.value, NATIVE_DECIMALS)?,
                    timestamp: parse_numeric_field(&row.time_stamp, "timeStamp")?,
                    block_number: parse_numeric_field(&row.block_number, "blockNumber")?,
                    hash: row.hash,
                    from: row.from,
                })
            })
            .collect()
    }

    /// Recent ERC-20 transfers touching `address`. Values are formatted with
    /// the decimal count reported in the same row — token decimals are not
    /// globally fixed, and a missing or non-numeric count is a hard error.
    pub async fn get_token_transfers(
        &self,
        address: &str,
        limit: usize,
        network: Option<Network>,
    ) -> Result<Vec<TokenTransferRecord>, ExplorerError> {
        let network = self.resolve(network);
        let address = Self::checksum_address(address)?;
        let offset = limit.to_string();
        let envelope = self
            .query(
                network,
                &[
                    ("module", "account"),
                    ("action", "tokentx"),
                    ("address", &address),
                    ("startblock", "0"),
                    ("endblock", "99999999"),
                    ("page", "1"),
                    ("offset", &offset),
                    ("sort", "desc"),
                ],
            )
            .await?;
        let rows: Vec<TokenTxRow> = Self::require_rows(envelope, "token transfer list")?;

        rows.into_iter()
            .take(limit)
            .map(|row| {
                let decimals = parse_decimals_field(&row.token_decimal, "tokenDecimal")?;
                Ok(TokenTransferRecord {
                    value: format_atomic(&row.value, decimals)?,
                    timestamp: parse_numeric_field(&row.time_stamp, "timeStamp")?,
                    block_number: parse_numeric_field(&row.block_number, "blockNumber")?,
                    token: row.contract_address,
                    token_name: row.token_name,
                    token_symbol: row.token_symbol,
                    from: row.from,
                    to: row.to,
                })
            })
            .collect()
    }

    /// Raw ABI text of a verified contract. An unverified contract is an
    /// upstream failure, never an empty success.
    pub async fn get_contract_abi(
        &self,
        address: &str,
        network: Option<Network>,
    ) -> Result<String, ExplorerError> {
        let network = self.resolve(network);
        let address = Self::checksum_address(address)?;
        let envelope = self
            .query(
                network,
                &[
                    ("module", "contract"),
                    ("action", "getabi"),
                    ("address", &address),
                ],
            )
            .await?;
        let result = Self::require_result(envelope, "ABI lookup")?;
        match result.as_str() {
            Some(abi) if !abi.is_empty() => Ok(abi.to_string()),
            _ => Err(ExplorerError::Upstream(format!(
                "no verified ABI available for {address}"
            ))),
        }
    }

    /// Current three-tier gas price snapshot. Re-queries upstream on every
    /// call; nothing is cached.
    pub async fn get_gas_oracle(
        &self,
        network: Option<Network>,
    ) -> Result<GasOracle, ExplorerError> {
        let network = self.resolve(network);
        let envelope = self
            .query(
                network,
                &[("module", "gastracker"), ("action", "gasoracle")],
            )
            .await?;
        let result = Self::require_result(envelope, "gas oracle")?;
        let row: GasOracleRow = serde_json::from_value(result)
            .map_err(|e| ExplorerError::Upstream(format!("malformed gas oracle payload: {e}")))?;
        Ok(GasOracle {
            safe: row.safe_gas_price,
            propose: row.propose_gas_price,
            fast: row.fast_gas_price,
        })
    }

    /// Reverse ENS lookup. Networks without ENS return `NotSupported`
    /// without touching the wire; there is no equivalent endpoint there.
    pub async fn get_ens_name(
        &self,
        address: &str,
        network: Option<Network>,
    ) -> Result<EnsLookup, ExplorerError> {
        let network = self.resolve(network);
        // Checked before address validation: the outcome holds for any
        // input on a network without ENS.
        if !network.config().supports_ens {
            return Ok(EnsLookup::NotSupported(network));
        }
        let address = Self::checksum_address(address)?;
        let envelope = self
            .query(
                network,
                &[
                    ("module", "account"),
                    ("action", "ensname"),
                    ("address", &address),
                ],
            )
            .await?;
        if envelope.status == "1" {
            return Ok(match envelope.result.as_ref().and_then(Value::as_str) {
                Some(name) if !name.is_empty() => EnsLookup::Found(name.to_string()),
                _ => EnsLookup::NotFound,
            });
        }
        // The family reports "nothing registered" as a failure status with a
        // "No data found" message; that is a not-found, not an error.
        if envelope.message.to_lowercase().starts_with("no data") {
            return Ok(EnsLookup::NotFound);
        }
        Err(ExplorerError::Upstream(Self::upstream_message(
            &envelope,
            "ENS lookup",
        )))
    }
}
