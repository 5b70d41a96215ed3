// src/config.rs

use std::collections::HashMap;
use std::env;

use anyhow::{bail, Context, Result};

use crate::explorer::network::Network;

/// All configuration, loaded once at startup from the environment (and a
/// .env file when present). Immutable afterward.
#[derive(Clone, Debug)]
pub struct Config {
    // Server settings
    pub port: u16,

    /// Per-network explorer API key. An empty string means the network is
    /// not usable. Resolution order: `EXPLORER_API_KEY_<NETWORK>`, else the
    /// shared `EXPLORER_API_KEY`, else empty — decided here once, never by
    /// ad-hoc env lookups in operation logic.
    pub api_keys: HashMap<Network, String>,

    /// Network used when a tool call does not name one.
    pub default_network: Network,
}

impl Config {
    pub fn usable_networks(&self) -> Vec<Network> {
        Network::ALL
            .into_iter()
            .filter(|n| self.is_usable(*n))
            .collect()
    }

    pub fn is_usable(&self, network: Network) -> bool {
        self.api_keys
            .get(&network)
            .map(|key| !key.is_empty())
            .unwrap_or(false)
    }

    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let shared_key = env::var("EXPLORER_API_KEY").unwrap_or_default();
        let mut api_keys = HashMap::new();
        for network in Network::ALL {
            let var = format!("EXPLORER_API_KEY_{}", network.tag().to_uppercase());
            let key = env::var(&var).unwrap_or_else(|_| shared_key.clone());
            api_keys.insert(network, key);
        }
        if api_keys.values().all(|key| key.is_empty()) {
            bail!(
                "no explorer API key configured; set EXPLORER_API_KEY or a \
                 per-network EXPLORER_API_KEY_<NETWORK> variable"
            );
        }

        let default_network = env::var("DEFAULT_NETWORK")
            .unwrap_or_else(|_| "sonic".to_string())
            .parse::<Network>()
            .context("DEFAULT_NETWORK must name a supported network")?;

        Ok(Config {
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            api_keys,
            default_network,
        })
    }
}
