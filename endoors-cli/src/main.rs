//! Endoors CLI
//!
//! Command-line interface for the Endoors subdomain naming core.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use endoors_api::{ApiConfig, ApiServer};
use endoors_core::config::{NamingConfig, RegistrarCredential};
use endoors_core::error::EndoorsError;
use endoors_core::types::{AvailabilitySource, EthAddress};
use endoors_crypto::{namehash, to_checksum_address};
use endoors_ens::NamingService;

/// Endoors - subdomain names for verified identities
#[derive(Parser)]
#[command(name = "endoors")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Network: mainnet, testnet or localhost
    #[arg(long, global = true, env = "ENDOORS_NETWORK")]
    network: Option<String>,

    /// Ledger JSON-RPC URL
    #[arg(long, global = true, env = "ETH_RPC_URL")]
    rpc_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the namehash of a name (offline)
    Namehash {
        /// Name to hash, e.g. alice.endoors.eth
        name: String,
    },

    /// Check whether a label can be registered
    Available {
        /// Label under the parent domain
        label: String,
    },

    /// Look up the owner of a label or full name
    Resolve {
        /// Label, or full name under the parent domain
        name: String,
    },

    /// Register a label to an owner and wait for finality
    Register {
        /// Label under the parent domain
        label: String,
        /// Owner address (hex)
        owner: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Run the API server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3001")]
        port: u16,
        /// Bind address
        #[arg(short, long, default_value = "0.0.0.0")]
        bind: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        "endoors=debug,info"
    } else {
        "endoors=info,warn"
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let overrides = Overrides {
        network: cli.network,
        rpc_url: cli.rpc_url,
    };

    match cli.command {
        Commands::Namehash { name } => cmd_namehash(&name),
        Commands::Available { label } => cmd_available(&overrides, &label).await,
        Commands::Resolve { name } => cmd_resolve(&overrides, &name).await,
        Commands::Register { label, owner, yes } => {
            cmd_register(&overrides, &label, &owner, yes).await
        }
        Commands::Serve { port, bind } => cmd_serve(&overrides, port, &bind).await,
    }
}

/// Command-line values that take precedence over the environment.
struct Overrides {
    network: Option<String>,
    rpc_url: Option<String>,
}

impl Overrides {
    fn load_config(&self) -> Result<NamingConfig> {
        NamingConfig::from_lookup(|key| match key {
            "ENDOORS_NETWORK" if self.network.is_some() => self.network.clone(),
            "ETH_RPC_URL" if self.rpc_url.is_some() => self.rpc_url.clone(),
            _ => std::env::var(key).ok(),
        })
        .context("Invalid configuration")
    }

    fn read_only_service(&self) -> Result<NamingService> {
        NamingService::connect(self.load_config()?, None).context("Failed to connect to the ledger")
    }
}

/// Print the namehash of a name
fn cmd_namehash(name: &str) -> Result<()> {
    let node = namehash(name);
    println!("{} {}", "Name:".dimmed(), name);
    println!("{} {}", "Node:".dimmed(), node.to_hex().bold());
    Ok(())
}

/// Check availability of a label
async fn cmd_available(overrides: &Overrides, label: &str) -> Result<()> {
    let service = overrides.read_only_service()?;
    println!("{} {}", "🔍 Checking:".cyan().bold(), service.format_subdomain(label)?);

    let availability = service
        .check_availability(label)
        .await
        .map_err(explain)
        .context("Availability check failed")?;

    if availability.available {
        println!("   {}", "✅ Available".green().bold());
    } else {
        println!("   {}", "❌ Taken".red().bold());
    }

    if let AvailabilitySource::AssumedAfterLookupFailure { reason } = &availability.source {
        println!(
            "   {} registrar unreachable, availability assumed ({})",
            "⚠️".yellow(),
            reason
        );
    }

    Ok(())
}

/// Resolve a label or full name to its owner
async fn cmd_resolve(overrides: &Overrides, name: &str) -> Result<()> {
    let service = overrides.read_only_service()?;

    let (full_name, owner) = if name.contains('.') {
        let owner = service.resolve_name(name).await;
        (name.to_string(), owner)
    } else {
        let owner = service.resolve(name).await;
        (service.format_subdomain(name)?, owner)
    };

    let owner = owner.map_err(explain).context("Resolution failed")?;

    println!("{} {}", "🔍 Resolving:".cyan().bold(), full_name);
    println!("   {} {}", "Node:".dimmed(), namehash(&full_name).to_hex());
    match owner {
        Some(owner) => println!("   {} {}", "Owner:".green(), to_checksum_address(&owner)),
        None => println!("   {}", "Not registered".yellow()),
    }

    Ok(())
}

/// Register a label and wait for finality
async fn cmd_register(overrides: &Overrides, label: &str, owner: &str, yes: bool) -> Result<()> {
    let owner = EthAddress::from_hex(owner).context("Invalid owner address")?;
    let config = overrides.load_config()?;

    let credential = RegistrarCredential::from_env()
        .context("Registration needs the registrar key in PRIVATE_KEY")?;
    let service = NamingService::connect(config, Some(&credential))
        .context("Failed to connect to the ledger")?;

    let name = service.format_subdomain(label)?;
    println!("{} {}", "📝 Registering:".cyan().bold(), name);
    println!("   {} {}", "Owner:".dimmed(), to_checksum_address(&owner));
    println!("   {} {}", "Network:".dimmed(), service.config().network);

    if !yes {
        let proceed = Confirm::new()
            .with_prompt("Submit this registration?")
            .default(false)
            .interact()?;
        if !proceed {
            println!("   Cancelled.");
            return Ok(());
        }
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("   {spinner:.green} {msg}")?);
    spinner.set_message("Waiting for finality...");
    spinner.enable_steady_tick(Duration::from_millis(120));

    let result = service.register(label, &owner).await;
    spinner.finish_and_clear();

    match result {
        Ok(receipt) => {
            println!("\n{}", "✅ Registered".green().bold());
            println!("   {} {}", "Name:".dimmed(), receipt.name);
            println!("   {} {}", "Node:".dimmed(), receipt.node.to_hex());
            println!("   {} {}", "Tx:".dimmed(), receipt.tx_hash);
            if let Some(block) = receipt.block_number {
                println!("   {} {}", "Block:".dimmed(), block);
            }
            Ok(())
        }
        Err(e @ EndoorsError::FinalityTimeout { .. }) => {
            println!("\n{}", "⏳ Submitted, but not final yet".yellow().bold());
            println!("   The transaction was not cancelled and may still succeed.");
            println!("   Check again with `endoors resolve {}` before retrying.", name);
            bail!(e)
        }
        Err(e) => Err(explain(e).context("Registration failed")),
    }
}

/// Run the API server
async fn cmd_serve(overrides: &Overrides, port: u16, bind: &str) -> Result<()> {
    println!("{}", "🚀 Starting Endoors API server...".cyan().bold());

    let config = ApiConfig {
        naming: overrides.load_config()?,
        credential: RegistrarCredential::from_env_optional()
            .context("PRIVATE_KEY is set but invalid")?,
    };
    let server = ApiServer::connect(config).context("Failed to start the API server")?;

    println!("   {} http://{}:{}", "Listening on:".green(), bind, port);
    println!("   {} http://{}:{}/health", "Health check:".dimmed(), bind, port);
    println!("\n   Press Ctrl+C to stop.\n");

    let addr: SocketAddr = format!("{}:{}", bind, port).parse()?;
    server.run(addr).await?;

    Ok(())
}

/// Attaches the user-facing hint for the error's kind.
fn explain(err: EndoorsError) -> anyhow::Error {
    let hint = err.kind().user_hint();
    anyhow::Error::new(err).context(hint)
}
