use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pdns_sync::{Changes, Provider, ProviderConfig};
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about, rename_all = "kebab-case")]
struct Cli {
    /// PowerDNS server base address (e.g. http://127.0.0.1:8081)
    #[arg(long, value_name = "URL")]
    server: String,
    /// PowerDNS API key
    #[arg(long, value_name = "KEY")]
    api_key: String,
    /// PowerDNS server ID
    #[arg(long, value_name = "ID", default_value = "localhost")]
    server_id: String,
    /// Domain filter (repeatable; not supported, rejected when non-empty)
    #[arg(long = "domain-filter", value_name = "DOMAIN")]
    domain_filter: Vec<String>,
    /// Compute changes without applying them (not supported, rejected)
    #[arg(long)]
    dry_run: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print every record the server currently serves, as JSON
    Records,
    /// Apply a change-set document (create/update_old/update_new/delete)
    Apply {
        /// Path to the change-set JSON file
        #[arg(long, value_name = "PATH")]
        changes: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let provider = Provider::new(ProviderConfig {
        server_url: cli.server,
        api_key: cli.api_key,
        server_id: cli.server_id,
        domain_filter: cli.domain_filter,
        dry_run: cli.dry_run,
    })
    .context("failed to construct PowerDNS provider")?;

    match cli.command {
        Command::Records => {
            let records = provider
                .records()
                .await
                .context("failed to read records from the server")?;
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
        Command::Apply { changes } => {
            let raw = std::fs::read_to_string(&changes)
                .with_context(|| format!("failed to read change-set {}", changes.display()))?;
            let changes: Changes =
                serde_json::from_str(&raw).context("failed to parse change-set JSON")?;
            provider
                .apply_changes(&changes)
                .await
                .context("failed to apply change-set")?;
            info!("change-set applied");
        }
    }

    Ok(())
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
}
