//! JBCT Backend Library
//!
//! Core functionality for the JBCT authentication backend:
//! - Postgres credential store (users keyed by email)
//! - HS256 session tokens and the Redis revocation blacklist
//! - Google and GitHub OAuth providers with a shared sign-in bridge
//! - axum router with API-key, session and CORS layers

pub mod auth;
pub mod blacklist;
pub mod oauth;
pub mod server;
pub mod storage;
