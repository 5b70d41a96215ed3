// src/explorer/network.rs

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The closed set of networks this server can query. Adding a network means
/// adding a variant here and a row in `config()` — nothing is discovered at
/// runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Ethereum,
    Sonic,
    Base,
}

/// Static per-network configuration: where the explorer API lives and how to
/// label its native currency.
#[derive(Debug, Clone, Copy)]
pub struct NetworkConfig {
    pub api_url: &'static str,
    pub display_name: &'static str,
    pub symbol: &'static str,
    /// ENS reverse lookups only exist on Ethereum mainnet; gate on this flag
    /// instead of comparing display names.
    pub supports_ens: bool,
}

#[derive(Debug, Error)]
#[error("unknown network '{0}'. Supported networks: ethereum, sonic, base")]
pub struct UnknownNetwork(pub String);

impl Network {
    pub const ALL: [Network; 3] = [Network::Ethereum, Network::Sonic, Network::Base];

    /// Lowercase tag used in tool arguments, env var suffixes, and URLs.
    pub fn tag(&self) -> &'static str {
        match self {
            Network::Ethereum => "ethereum",
            Network::Sonic => "sonic",
            Network::Base => "base",
        }
    }

    /// Total over the enum: every network has exactly one config.
    pub fn config(&self) -> &'static NetworkConfig {
        match self {
            Network::Ethereum => &ETHEREUM,
            Network::Sonic => &SONIC,
            Network::Base => &BASE,
        }
    }
}

static ETHEREUM: NetworkConfig = NetworkConfig {
    api_url: "https://api.etherscan.io/api",
    display_name: "Ethereum",
    symbol: "ETH",
    supports_ens: true,
};

static SONIC: NetworkConfig = NetworkConfig {
    api_url: "https://api.sonicscan.org/api",
    display_name: "Sonic",
    symbol: "S",
    supports_ens: false,
};

static BASE: NetworkConfig = NetworkConfig {
    api_url: "https://api.basescan.org/api",
    display_name: "Base",
    symbol: "ETH",
    supports_ens: false,
};

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Network {
    type Err = UnknownNetwork;

    /// Accepts the canonical tag plus the aliases users commonly pass over MCP.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ethereum" | "eth" | "mainnet" => Ok(Network::Ethereum),
            "sonic" => Ok(Network::Sonic),
            "base" => Ok(Network::Base),
            other => Err(UnknownNetwork(other.to_string())),
        }
    }
}
