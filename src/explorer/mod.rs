// src/explorer/mod.rs

pub mod client;
pub mod models;
pub mod network;
pub mod units;

pub use client::ExplorerClient;
pub use models::{EnsLookup, ExplorerError};
pub use network::Network;
