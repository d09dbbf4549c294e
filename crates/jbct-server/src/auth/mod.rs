//! Session authentication for the JBCT backend.
//!
//! Provides session token management and the principal carried by it.

pub mod claims;
pub mod jwt;

pub use claims::{Claims, Principal};
pub use jwt::{IssuedToken, JwtManager, SESSION_TTL_SECS};
