//! JBCT CLI
//!
//! Fill in a chain configuration, view its simulated dashboard and check the
//! backend session from the terminal.

use std::io;

use clap::{Parser, Subcommand};
use tracing::info;

use jbct_cli::auth_cmd::{self, AuthAction};
use jbct_cli::chain_cmd::{self, ChainAction};
use jbct_cli::chain_store::ChainStore;
use jbct_cli::config::CliConfig;
use jbct_core::tracing_init::init_tracing;

#[derive(Parser, Debug)]
#[command(name = "jbct")]
#[command(version, about = "JBCT chain builder CLI", long_about = None)]
struct Cli {
    /// Backend base URL (saved for later runs).
    #[arg(long, global = true, env = "JBCT_API_URL")]
    api_url: Option<String>,

    /// API key sent as `x-api-key` (saved for later runs).
    #[arg(long, global = true, env = "JBCT_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Chain configuration and dashboard.
    Chain {
        #[command(subcommand)]
        action: ChainAction,
    },
    /// Backend session.
    Auth {
        #[command(subcommand)]
        action: AuthAction,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing("jbct=warn,jbct_cli=warn", false);
    info!(version = env!("CARGO_PKG_VERSION"), "Starting jbct CLI");

    match cli.command {
        Command::Chain { action } => {
            let store = ChainStore::default_location()?;
            chain_cmd::run(action, &store, &mut io::stdout())
        }
        Command::Auth { action } => {
            let mut config = CliConfig::load();
            let mut changed = false;
            if cli.api_url.is_some() && cli.api_url != config.api_url {
                config.api_url = cli.api_url;
                changed = true;
            }
            if cli.api_key.is_some() && cli.api_key != config.api_key {
                config.api_key = cli.api_key;
                changed = true;
            }
            if changed {
                config.save()?;
            }
            auth_cmd::run(action, &mut config).await
        }
    }
}
