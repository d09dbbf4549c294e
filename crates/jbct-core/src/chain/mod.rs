//! Simulated Ethereum private chain model.
//!
//! A chain configuration is entered through [`ChainForm`], validated, and
//! stored locally for the next screen. Nothing here talks to a real node; the
//! [`dashboard`] figures are cosmetic.

pub mod dashboard;
pub mod form;
pub mod template;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use dashboard::{ChainInfo, ChainStatus, DashboardView};
pub use form::{AccountValues, ChainForm, ChainFormValues, FieldError, ValidationErrors};
pub use template::ChainTemplate;

/// Address used by the templates and newly added accounts.
pub const ZERO_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

/// Consensus mechanism of the simulated chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Consensus {
    /// Proof of Work.
    #[default]
    PoW,
    /// Proof of Authority.
    PoA,
}

impl Consensus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PoW => "PoW",
            Self::PoA => "PoA",
        }
    }
}

impl fmt::Display for Consensus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Consensus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PoW" => Ok(Self::PoW),
            "PoA" => Ok(Self::PoA),
            _ => Err(()),
        }
    }
}

/// Initial account allocation in the genesis block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// `0x` followed by 40 hex characters.
    pub address: String,
    /// Decimal ETH amount, kept as entered (e.g. `"1000"`, `"0.5"`).
    pub balance: String,
}

/// A validated chain configuration.
///
/// Serialized with camelCase keys, the shape the web client keeps in local storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainConfig {
    pub name: String,
    pub consensus: Consensus,
    pub chain_id: u64,
    pub coinbase: String,
    pub accounts: Vec<Account>,
}

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_camel_case_keys() {
        let config = ChainTemplate::Basic.config();
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["chainId"], 1337);
        assert_eq!(json["consensus"], "PoW");
        assert_eq!(json["accounts"][0]["balance"], "1000");
    }

    #[test]
    fn consensus_parses_exact_names_only() {
        assert_eq!("PoA".parse::<Consensus>(), Ok(Consensus::PoA));
        assert!("poa".parse::<Consensus>().is_err());
        assert!("PoS".parse::<Consensus>().is_err());
    }
}
