// src/lib.rs

// Re-export commonly used types
pub use crate::explorer::network::Network;

// Re-export modules
pub mod api;
pub mod config;
pub mod explorer;
pub mod mcp;
pub mod utils;

/// Application state shared across all request handlers
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: config::Config,
    /// Client for the per-network explorer APIs
    pub explorer: explorer::ExplorerClient,
}
