//! Simulated dashboard figures.
//!
//! Everything here is display filler derived from the stored configuration:
//! URLs come from templating the chain name into fixed domains, the telemetry
//! from uniform random draws. None of it is persisted or checked.

use std::fmt;

use rand::RngExt;
use serde::{Deserialize, Serialize};

use super::ChainConfig;

/// Lifecycle label shown on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainStatus {
    Active,
    Inactive,
}

impl fmt::Display for ChainStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => f.write_str("active"),
            Self::Inactive => f.write_str("inactive"),
        }
    }
}

/// Dashboard data for one simulated chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainInfo {
    pub config: ChainConfig,
    pub status: ChainStatus,
    /// Unix seconds.
    pub created_at: i64,
    pub block_height: u64,
    pub rpc_url: String,
    pub explorer_url: String,
    pub faucet_url: String,
    pub pending_transactions: u64,
    pub peer_count: u32,
    pub gas_price_gwei: u32,
    pub storage_mb: f64,
}

impl ChainInfo {
    /// Derive dashboard figures for `config`, drawing telemetry from `rng`.
    pub fn derive(config: ChainConfig, created_at: i64, rng: &mut impl rand::Rng) -> Self {
        let slug = chain_slug(&config.name);
        Self {
            rpc_url: format!("https://rpc-{slug}.example.com"),
            explorer_url: format!("https://explorer-{slug}.example.com"),
            faucet_url: format!("https://faucet-{slug}.example.com"),
            status: ChainStatus::Active,
            created_at,
            block_height: rng.random_range(0..1000),
            pending_transactions: rng.random_range(0..500),
            peer_count: rng.random_range(1..=5),
            gas_price_gwei: rng.random_range(0..20),
            storage_mb: (rng.random_range(0.0..100.0_f64) * 100.0).round() / 100.0,
            config,
        }
    }
}

/// Lowercased name with every whitespace run collapsed to `-`.
pub fn chain_slug(name: &str) -> String {
    name.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

/// What the dashboard screen shows.
#[derive(Debug, Clone)]
pub enum DashboardView {
    /// No configuration stored yet; stays here until one appears.
    Loading,
    Ready(Box<ChainInfo>),
}

impl DashboardView {
    pub fn from_stored(
        config: Option<ChainConfig>,
        created_at: i64,
        rng: &mut impl rand::Rng,
    ) -> Self {
        match config {
            Some(config) => Self::Ready(Box::new(ChainInfo::derive(config, created_at, rng))),
            None => Self::Loading,
        }
    }
}
