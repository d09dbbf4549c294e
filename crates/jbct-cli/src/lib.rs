//! JBCT CLI Library
//!
//! Command line client for JBCT: fills in and validates chain
//! configurations, stores them locally, renders the simulated dashboard and
//! checks the session against the backend.

pub mod auth_cmd;
pub mod chain_cmd;
pub mod chain_store;
pub mod config;
