//! Canned chain configurations offered by the form.

use std::fmt;
use std::str::FromStr;

use super::{Account, ChainConfig, Consensus, ZERO_ADDRESS};
use crate::error::Error;

/// Template that replaces the whole form state when selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainTemplate {
    /// Simple single-node chain.
    Basic,
    /// Multi-account PoA network.
    Testing,
    /// Developer-friendly setup.
    Development,
}

impl ChainTemplate {
    pub const ALL: [Self; 3] = [Self::Basic, Self::Testing, Self::Development];

    pub const fn key(self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Testing => "testing",
            Self::Development => "development",
        }
    }

    pub const fn title(self) -> &'static str {
        match self {
            Self::Basic => "Basic Chain",
            Self::Testing => "Testing Network",
            Self::Development => "Development Chain",
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            Self::Basic => "Simple single-node chain",
            Self::Testing => "Multi-account PoA network",
            Self::Development => "Developer-friendly setup",
        }
    }

    /// The configuration this template loads into the form.
    pub fn config(self) -> ChainConfig {
        let (name, consensus, chain_id, account_count, balance) = match self {
            Self::Basic => ("Alpine Basic Chain", Consensus::PoW, 1337, 1, "1000"),
            Self::Testing => ("Alpine Test Network", Consensus::PoA, 2337, 3, "5000"),
            Self::Development => ("Alpine Dev Chain", Consensus::PoW, 3337, 2, "10000"),
        };

        ChainConfig {
            name: name.to_string(),
            consensus,
            chain_id,
            coinbase: ZERO_ADDRESS.to_string(),
            accounts: (0..account_count)
                .map(|i| Account {
                    address: numbered_address(i),
                    balance: balance.to_string(),
                })
                .collect(),
        }
    }
}

/// Sequential placeholder address `0x000...0{n}`.
fn numbered_address(n: u32) -> String {
    format!("0x{n:040x}")
}

impl fmt::Display for ChainTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for ChainTemplate {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.key().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::UnknownTemplate(s.to_string()))
    }
}
