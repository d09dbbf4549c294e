//! JBCT Core Library
//!
//! Shared functionality for JBCT components:
//! - Configuration types and environment resolution
//! - Postgres pool helpers and timestamps
//! - Chain configuration form model, templates and validation
//! - Simulated dashboard derivation
//! - Common error types

pub mod chain;
pub mod config;
pub mod db;
pub mod error;
pub mod tracing_init;

pub use config::ServerConfig;
pub use error::{Error, Result};
