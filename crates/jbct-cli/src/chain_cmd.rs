//! Chain subcommands: templates, validate, create, show, dashboard.
//!
//! User-facing output uses writeln! to stdout (this is a CLI binary, not debug output).

use std::io::Write;
use std::path::{Path, PathBuf};

use jbct_core::chain::{
    ChainConfig, ChainForm, ChainFormValues, ChainInfo, ChainTemplate, DashboardView,
    ValidationErrors,
};
use jbct_core::db::unix_timestamp;
use tracing::info;

use crate::chain_store::ChainStore;

/// Chain subcommand actions.
#[derive(clap::Subcommand, Debug)]
pub enum ChainAction {
    /// List the built-in templates.
    Templates,
    /// Print a template as editable form values (JSON).
    Template {
        /// Template key: basic, testing or development.
        name: String,
    },
    /// Validate form values from a JSON file without saving.
    Validate {
        /// Path to a JSON file of form values.
        file: PathBuf,
    },
    /// Validate and store a chain configuration.
    Create {
        /// Start from form values in this JSON file.
        #[arg(short, long, conflicts_with = "template")]
        file: Option<PathBuf>,
        /// Start from a built-in template.
        #[arg(short, long)]
        template: Option<String>,
        /// Override the chain name.
        #[arg(long)]
        name: Option<String>,
        /// Override the consensus mechanism (PoW or PoA).
        #[arg(long)]
        consensus: Option<String>,
        /// Override the chain ID.
        #[arg(long)]
        chain_id: Option<String>,
        /// Override the coinbase address.
        #[arg(long)]
        coinbase: Option<String>,
    },
    /// Print the stored chain configuration.
    Show,
    /// Show the simulated dashboard for the stored chain.
    Dashboard {
        /// Print the dashboard data as JSON.
        #[arg(long)]
        json: bool,
    },
}

/// Field overrides applied on top of the starting form values.
#[derive(Debug, Default)]
pub struct FormOverrides {
    pub name: Option<String>,
    pub consensus: Option<String>,
    pub chain_id: Option<String>,
    pub coinbase: Option<String>,
}

impl FormOverrides {
    fn apply(self, values: &mut ChainFormValues) {
        if let Some(name) = self.name {
            values.name = name;
        }
        if let Some(consensus) = self.consensus {
            values.consensus = consensus;
        }
        if let Some(chain_id) = self.chain_id {
            values.chain_id = chain_id;
        }
        if let Some(coinbase) = self.coinbase {
            values.coinbase = coinbase;
        }
    }
}

/// Execute a chain subcommand.
pub fn run(action: ChainAction, store: &ChainStore, out: &mut impl Write) -> anyhow::Result<()> {
    match action {
        ChainAction::Templates => list_templates(out),
        ChainAction::Template { name } => print_template(&name, out),
        ChainAction::Validate { file } => {
            read_values(&file)?
                .validate()
                .map_err(|errors| report_errors(&errors, out))?;
            writeln!(out, "Chain configuration is valid")?;
            Ok(())
        }
        ChainAction::Create {
            file,
            template,
            name,
            consensus,
            chain_id,
            coinbase,
        } => {
            let overrides = FormOverrides {
                name,
                consensus,
                chain_id,
                coinbase,
            };
            let form = build_form(file.as_deref(), template.as_deref(), overrides)?;
            create(&form, store, out)
        }
        ChainAction::Show => match store.load()? {
            Some(config) => {
                writeln!(out, "{}", serde_json::to_string_pretty(&config)?)?;
                Ok(())
            }
            None => {
                writeln!(out, "No chain created yet. Run: jbct chain create")?;
                Ok(())
            }
        },
        ChainAction::Dashboard { json } => {
            let view = DashboardView::from_stored(store.load()?, unix_timestamp(), &mut rand::rng());
            render_dashboard(&view, json, out)
        }
    }
}

fn list_templates(out: &mut impl Write) -> anyhow::Result<()> {
    for template in ChainTemplate::ALL {
        let config = template.config();
        writeln!(
            out,
            "{:<12} {:<20} chain {} ({}, {} account{})",
            template.key(),
            template.title(),
            config.chain_id,
            config.consensus,
            config.accounts.len(),
            if config.accounts.len() == 1 { "" } else { "s" },
        )?;
        writeln!(out, "{:<12} {}", "", template.description())?;
    }
    Ok(())
}

fn print_template(name: &str, out: &mut impl Write) -> anyhow::Result<()> {
    let template: ChainTemplate = name.parse()?;
    let values = ChainFormValues::from(&template.config());
    writeln!(out, "{}", serde_json::to_string_pretty(&values)?)?;
    Ok(())
}

fn read_values(path: &Path) -> anyhow::Result<ChainFormValues> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {e}", path.display()))?;
    serde_json::from_str(&content)
        .map_err(|e| anyhow::anyhow!("Failed to parse form values in {}: {e}", path.display()))
}

/// Starting form: file values, a template, or the defaults; then overrides.
pub fn build_form(
    file: Option<&Path>,
    template: Option<&str>,
    overrides: FormOverrides,
) -> anyhow::Result<ChainForm> {
    let mut form = match (file, template) {
        (Some(path), _) => ChainForm::with_values(read_values(path)?),
        (None, Some(name)) => {
            let mut form = ChainForm::new();
            form.apply_template(name.parse()?);
            form
        }
        (None, None) => ChainForm::new(),
    };
    overrides.apply(form.values_mut());
    Ok(form)
}

/// Submit `form`; on success the configuration replaces the stored one.
pub fn create(form: &ChainForm, store: &ChainStore, out: &mut impl Write) -> anyhow::Result<()> {
    let mut submitted: Option<ChainConfig> = None;
    form.submit(|config| submitted = Some(config))
        .map_err(|errors| report_errors(&errors, out))?;

    let config = submitted.ok_or_else(|| anyhow::anyhow!("Form submitted without a value"))?;
    store.save(&config)?;
    info!(path = %store.path().display(), chain_id = config.chain_id, "Chain configuration stored");

    writeln!(out, "Created chain \"{}\" (chain ID {})", config.name, config.chain_id)?;
    writeln!(out, "Saved to {}", store.path().display())?;
    writeln!(out, "Run `jbct chain dashboard` to view it.")?;
    Ok(())
}

/// Print every field error and turn them into one command error.
fn report_errors(errors: &ValidationErrors, out: &mut impl Write) -> anyhow::Error {
    for error in errors.errors() {
        if let Err(e) = writeln!(out, "  {}: {}", error.path, error.message) {
            return e.into();
        }
    }
    anyhow::anyhow!(
        "Chain configuration is invalid ({} error{})",
        errors.errors().len(),
        if errors.errors().len() == 1 { "" } else { "s" }
    )
}

/// Render the dashboard view as text or JSON.
pub fn render_dashboard(view: &DashboardView, json: bool, out: &mut impl Write) -> anyhow::Result<()> {
    let info = match view {
        DashboardView::Loading => {
            writeln!(out, "Loading chain information...")?;
            writeln!(out, "No chain has been created yet. Run: jbct chain create")?;
            return Ok(());
        }
        DashboardView::Ready(info) => info,
    };

    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(info)?)?;
        return Ok(());
    }
    write_info(info, out)
}

fn write_info(info: &ChainInfo, out: &mut impl Write) -> anyhow::Result<()> {
    let config = &info.config;
    writeln!(out, "{}  [{}]", config.name, info.status)?;
    writeln!(out)?;
    writeln!(out, "  Chain ID:      {}", config.chain_id)?;
    writeln!(out, "  Consensus:     {}", config.consensus)?;
    writeln!(out, "  Block height:  {}", info.block_height)?;
    writeln!(out, "  Peers:         {}", info.peer_count)?;
    writeln!(out, "  Pending txs:   {}", info.pending_transactions)?;
    writeln!(out, "  Gas price:     {} Gwei", info.gas_price_gwei)?;
    writeln!(out, "  Storage:       {:.2} MB", info.storage_mb)?;
    writeln!(out)?;
    writeln!(out, "  RPC URL:       {}", info.rpc_url)?;
    writeln!(out, "  Explorer:      {}", info.explorer_url)?;
    writeln!(out, "  Faucet:        {}", info.faucet_url)?;
    writeln!(out)?;
    writeln!(out, "  Coinbase:      {}", config.coinbase)?;
    writeln!(out, "  Accounts:")?;
    for account in &config.accounts {
        writeln!(out, "    {}  {} ETH", account.address, account.balance)?;
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn output(f: impl FnOnce(&mut Vec<u8>) -> anyhow::Result<()>) -> (anyhow::Result<()>, String) {
        let mut buf = Vec::new();
        let result = f(&mut buf);
        (result, String::from_utf8(buf).unwrap())
    }

    fn temp_store() -> (tempfile::TempDir, ChainStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = ChainStore::at(dir.path().join("chain.json"));
        (dir, store)
    }

    #[test]
    fn templates_lists_all_three() {
        let (_dir, store) = temp_store();
        let (result, text) = output(|out| run(ChainAction::Templates, &store, out));
        result.unwrap();
        for key in ["basic", "testing", "development"] {
            assert!(text.contains(key), "{text}");
        }
        assert!(text.contains("2337"));
    }

    #[test]
    fn template_prints_form_values() {
        let (_dir, store) = temp_store();
        let (result, text) = output(|out| {
            run(
                ChainAction::Template {
                    name: "testing".into(),
                },
                &store,
                out,
            )
        });
        result.unwrap();
        let values: ChainFormValues = serde_json::from_str(&text).unwrap();
        assert_eq!(values.chain_id, "2337");
        assert_eq!(values.accounts.len(), 3);
    }

    #[test]
    fn unknown_template_fails() {
        let (_dir, store) = temp_store();
        let (result, _) = output(|out| {
            run(
                ChainAction::Template {
                    name: "mainnet".into(),
                },
                &store,
                out,
            )
        });
        assert!(result.is_err());
    }

    #[test]
    fn create_from_template_with_overrides() {
        let (_dir, store) = temp_store();
        let form = build_form(
            None,
            Some("development"),
            FormOverrides {
                name: Some("My Dev Chain".into()),
                chain_id: Some("4242".into()),
                ..FormOverrides::default()
            },
        )
        .unwrap();

        let (result, text) = output(|out| create(&form, &store, out));
        result.unwrap();
        assert!(text.contains("My Dev Chain"));

        let stored = store.load().unwrap().unwrap();
        assert_eq!(stored.name, "My Dev Chain");
        assert_eq!(stored.chain_id, 4242);
        assert_eq!(stored.accounts.len(), 2);
    }

    #[test]
    fn invalid_form_is_not_stored() {
        let (_dir, store) = temp_store();
        let form = build_form(
            None,
            None,
            FormOverrides {
                chain_id: Some("-1".into()),
                coinbase: Some("not-an-address".into()),
                ..FormOverrides::default()
            },
        )
        .unwrap();

        let (result, text) = output(|out| create(&form, &store, out));
        assert!(result.is_err());
        assert!(text.contains("chainId: Chain ID must be a positive integer."));
        assert!(text.contains("coinbase: Must be a valid Ethereum address starting with 0x"));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn validate_reads_file() {
        let (dir, store) = temp_store();
        let path = dir.path().join("form.json");
        let mut values = ChainFormValues::default();
        values.accounts.clear();
        std::fs::write(&path, serde_json::to_string(&values).unwrap()).unwrap();

        let (result, text) = output(|out| {
            run(ChainAction::Validate { file: path.clone() }, &store, out)
        });
        assert!(result.is_err());
        assert!(text.contains("At least one account is required."));

        std::fs::write(&path, serde_json::to_string(&ChainFormValues::default()).unwrap())
            .unwrap();
        let (result, text) = output(|out| run(ChainAction::Validate { file: path }, &store, out));
        result.unwrap();
        assert!(text.contains("valid"));
    }

    #[test]
    fn dashboard_without_chain_is_loading() {
        let (_dir, store) = temp_store();
        let (result, text) =
            output(|out| run(ChainAction::Dashboard { json: false }, &store, out));
        result.unwrap();
        assert!(text.contains("Loading chain information"));
    }

    #[test]
    fn dashboard_renders_stored_chain() {
        let mut rng = StdRng::seed_from_u64(9);
        let view =
            DashboardView::from_stored(Some(ChainTemplate::Testing.config()), 0, &mut rng);

        let (result, text) = output(|out| render_dashboard(&view, false, out));
        result.unwrap();
        assert!(text.contains("Alpine Test Network  [active]"));
        assert!(text.contains("https://rpc-alpine-test-network.example.com"));
        assert!(text.contains("5000 ETH"));

        let (result, text) = output(|out| render_dashboard(&view, true, out));
        result.unwrap();
        let json: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(json["status"], "active");
        assert_eq!(json["config"]["chainId"], 2337);
    }
}
