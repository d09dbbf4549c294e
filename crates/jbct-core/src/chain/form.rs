//! Chain configuration form: raw field values, validation and submission.
//!
//! Values are kept exactly as typed (`chain_id` is text until validated) so
//! that every field can report its own message. Validation collects all
//! failures at once; any failure blocks submission.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{Account, ChainConfig, ChainTemplate, Consensus, ZERO_ADDRESS};

static ADDRESS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^0x[a-fA-F0-9]{40}$").expect("static regex is valid"));

static BALANCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+(\.\d+)?$").expect("static regex is valid"));

/// Largest integer a JSON number carries without loss.
const MAX_SAFE_CHAIN_ID: f64 = 9_007_199_254_740_991.0;

const MSG_NAME: &str = "Chain name must be at least 2 characters.";
const MSG_CONSENSUS: &str = "Please select a consensus mechanism.";
const MSG_CHAIN_ID: &str = "Chain ID must be a positive integer.";
const MSG_ADDRESS: &str = "Must be a valid Ethereum address starting with 0x";
const MSG_BALANCE: &str = "Must be a valid number";
const MSG_ACCOUNTS: &str = "At least one account is required.";

/// One account row as typed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountValues {
    pub address: String,
    pub balance: String,
}

impl Default for AccountValues {
    fn default() -> Self {
        Self {
            address: ZERO_ADDRESS.to_string(),
            balance: "1000".to_string(),
        }
    }
}

/// Raw form state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainFormValues {
    pub name: String,
    pub consensus: String,
    pub chain_id: String,
    pub coinbase: String,
    pub accounts: Vec<AccountValues>,
}

impl Default for ChainFormValues {
    fn default() -> Self {
        Self {
            name: "Alpine Chain".to_string(),
            consensus: Consensus::PoW.as_str().to_string(),
            chain_id: "1337".to_string(),
            coinbase: ZERO_ADDRESS.to_string(),
            accounts: vec![AccountValues::default()],
        }
    }
}

impl From<&ChainConfig> for ChainFormValues {
    fn from(config: &ChainConfig) -> Self {
        Self {
            name: config.name.clone(),
            consensus: config.consensus.as_str().to_string(),
            chain_id: config.chain_id.to_string(),
            coinbase: config.coinbase.clone(),
            accounts: config
                .accounts
                .iter()
                .map(|a| AccountValues {
                    address: a.address.clone(),
                    balance: a.balance.clone(),
                })
                .collect(),
        }
    }
}

/// A validation failure attached to one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Field path, e.g. `chainId` or `accounts.1.address`.
    pub path: String,
    pub message: String,
}

/// All field failures of one validation pass. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Message for `path`, if that field failed.
    pub fn field(&self, path: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.path == path)
            .map(|e| e.message.as_str())
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.errors.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", e.path, e.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

#[derive(Default)]
struct Collector {
    errors: Vec<FieldError>,
}

impl Collector {
    fn push(&mut self, path: impl Into<String>, message: &str) {
        self.errors.push(FieldError {
            path: path.into(),
            message: message.to_string(),
        });
    }
}

impl ChainFormValues {
    /// Validate every field and produce a [`ChainConfig`].
    pub fn validate(&self) -> Result<ChainConfig, ValidationErrors> {
        let mut errs = Collector::default();

        if self.name.chars().count() < 2 {
            errs.push("name", MSG_NAME);
        }

        let consensus = self.consensus.parse::<Consensus>().ok();
        if consensus.is_none() {
            errs.push("consensus", MSG_CONSENSUS);
        }

        let chain_id = parse_chain_id(&self.chain_id);
        if chain_id.is_none() {
            errs.push("chainId", MSG_CHAIN_ID);
        }

        if !ADDRESS_RE.is_match(&self.coinbase) {
            errs.push("coinbase", MSG_ADDRESS);
        }

        if self.accounts.is_empty() {
            errs.push("accounts", MSG_ACCOUNTS);
        }
        for (i, account) in self.accounts.iter().enumerate() {
            if !ADDRESS_RE.is_match(&account.address) {
                errs.push(format!("accounts.{i}.address"), MSG_ADDRESS);
            }
            if !BALANCE_RE.is_match(&account.balance) {
                errs.push(format!("accounts.{i}.balance"), MSG_BALANCE);
            }
        }

        match (consensus, chain_id) {
            (Some(consensus), Some(chain_id)) if errs.errors.is_empty() => Ok(ChainConfig {
                name: self.name.clone(),
                consensus,
                chain_id,
                coinbase: self.coinbase.clone(),
                accounts: self
                    .accounts
                    .iter()
                    .map(|a| Account {
                        address: a.address.clone(),
                        balance: a.balance.clone(),
                    })
                    .collect(),
            }),
            _ => Err(ValidationErrors {
                errors: errs.errors,
            }),
        }
    }
}

/// Coerce typed text to a positive integer the way a numeric input does:
/// surrounding whitespace and exponent notation are accepted, fractions are not.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::float_cmp
)]
fn parse_chain_id(raw: &str) -> Option<u64> {
    let value: f64 = raw.trim().parse().ok()?;
    if !value.is_finite() || value.fract() != 0.0 || value <= 0.0 || value > MAX_SAFE_CHAIN_ID {
        return None;
    }
    Some(value as u64)
}

/// Form controller: holds the state and gates submission on validation.
#[derive(Debug, Clone, Default)]
pub struct ChainForm {
    values: ChainFormValues,
}

impl ChainForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_values(values: ChainFormValues) -> Self {
        Self { values }
    }

    pub const fn values(&self) -> &ChainFormValues {
        &self.values
    }

    pub const fn values_mut(&mut self) -> &mut ChainFormValues {
        &mut self.values
    }

    /// Replace the whole state with `template`.
    pub fn apply_template(&mut self, template: ChainTemplate) {
        self.values = ChainFormValues::from(&template.config());
    }

    /// Append a zero-address account with the default balance.
    pub fn add_account(&mut self) {
        self.values.accounts.push(AccountValues::default());
    }

    /// Remove the account at `index`. The last remaining account is kept.
    pub fn remove_account(&mut self, index: usize) -> bool {
        if self.values.accounts.len() <= 1 || index >= self.values.accounts.len() {
            return false;
        }
        self.values.accounts.remove(index);
        true
    }

    /// Validate and hand the config to `on_submit`, which runs at most once.
    pub fn submit<F>(&self, on_submit: F) -> Result<(), ValidationErrors>
    where
        F: FnOnce(ChainConfig),
    {
        let config = self.values.validate()?;
        on_submit(config);
        Ok(())
    }
}
