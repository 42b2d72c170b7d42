//! `near-badge`: read-only command line access to a badge contract.
//!
//! # Architecture Overview
//!
//! ```text
//!   CLI args + config file + NEAR_* env
//!        │
//!        ▼
//!   BadgeContract ──▶ ReadPipeline ──▶ ResultCache ──▶ RateLimiter ──▶ QueryDispatcher
//!                                                                        │
//!                                                   (no wallet here) ──▶ RpcClient ──▶ NEAR RPC node
//! ```
//!
//! Writes need a wallet and are only available through the library.

use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use near_badge::badge::{magic_link, BadgeContract};
use near_badge::blockchain::{ReadPipeline, ViewResult};
use near_badge::config::{load_with_overrides, NetworkId};
use near_badge::observability::logging::init_logging;

#[derive(Parser)]
#[command(name = "near-badge")]
#[command(about = "Query a NEAR event-badge contract", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Network override (mainnet, testnet).
    #[arg(short, long)]
    network: Option<NetworkId>,

    /// Contract account override.
    #[arg(long)]
    contract: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all events
    Events,
    /// Show owner/organizer/manager flags for an account
    Roles { account: String },
    /// List organizers
    Organizers,
    /// List managers
    Managers,
    /// List the whitelist of an event
    Whitelist { event: String },
    /// List badges owned by an account
    Badges { account: String },
    /// Call any view method
    View {
        method: String,
        /// JSON arguments
        #[arg(long, default_value = "{}")]
        args: String,
        /// Cache TTL in seconds
        #[arg(long)]
        ttl: Option<u64>,
    },
    /// Print the magic link for an event
    Link {
        event: String,
        #[arg(long)]
        origin: url::Url,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = load_with_overrides(cli.config.as_deref(), |config| {
        if let Some(network) = cli.network {
            config.network.network_id = network;
        }
        if let Some(contract) = cli.contract.clone() {
            config.network.contract_name = contract;
        }
    })?;
    init_logging(&config.observability);

    tracing::info!(
        network = %config.network.network_id,
        contract = %config.network.contract_name,
        "Configuration loaded"
    );

    if let Commands::Link { event, origin } = &cli.command {
        println!("{}", magic_link(origin, event));
        return Ok(());
    }

    let pipeline = Arc::new(ReadPipeline::from_config(&config)?);
    let contract = BadgeContract::new(config.network.contract_name.clone(), pipeline.clone());

    match cli.command {
        Commands::Events => print_result(contract.all_events().await?)?,
        Commands::Roles { account } => print_result(contract.roles(&account).await?)?,
        Commands::Organizers => print_result(contract.organizers().await?)?,
        Commands::Managers => print_result(contract.managers().await?)?,
        Commands::Whitelist { event } => print_result(contract.whitelist(&event).await?)?,
        Commands::Badges { account } => print_result(contract.badges_for_owner(&account).await?)?,
        Commands::View { method, args, ttl } => {
            let args: Value = serde_json::from_str(&args)?;
            let ttl = Duration::from_secs(ttl.unwrap_or(config.cache.default_ttl_secs));
            let result = pipeline
                .view_with_retry(None, contract.contract_id(), &method, args, ttl)
                .await?;
            print_result(result)?;
        }
        Commands::Link { .. } => {}
    }

    Ok(())
}

fn print_result<T: Serialize>(result: ViewResult<T>) -> Result<(), Box<dyn std::error::Error>> {
    match result {
        ViewResult::Value(value) => println!("{}", serde_json::to_string_pretty(&value)?),
        ViewResult::Empty => println!("(no data)"),
        ViewResult::Throttled => eprintln!("Rate limit reached; try again shortly"),
    }
    Ok(())
}
