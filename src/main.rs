//! Command-line interface for sync-provision
//!
//! # Usage Examples
//!
//! ```bash
//! # Provision a pipeline from three config documents
//! export PLATFORM_API_TOKEN="<your-api-token>"
//! export PLATFORM_WORKSPACE_ID="<your-workspace-id>"
//! sync-provision provision \
//!   --source-config configs/source.yaml \
//!   --destination-config configs/destination.yaml \
//!   --connection-config configs/connection.yaml
//!
//! # Inspect a connection afterwards
//! sync-provision show-connection --connection-id <id>
//! ```
//!
//! Connector credentials referenced as `${VAR}` inside the config documents
//! are resolved from the environment at load time.

use anyhow::Context;
use clap::{Parser, Subcommand};
use sync_provision::config::{ConnectionConfig, DestinationConfig, SourceConfig};
use sync_provision::{run_provision, PlatformOpts};

#[derive(Parser)]
#[command(name = "sync-provision")]
#[command(about = "Provision database-to-warehouse replication pipelines on a data-integration platform")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create and validate a source and a destination, then connect them
    Provision {
        /// Source connector config document
        #[arg(long, value_name = "PATH", default_value = "configs/source.yaml")]
        source_config: std::path::PathBuf,

        /// Destination connector config document
        #[arg(long, value_name = "PATH", default_value = "configs/destination.yaml")]
        destination_config: std::path::PathBuf,

        /// Connection config document
        #[arg(long, value_name = "PATH", default_value = "configs/connection.yaml")]
        connection_config: std::path::PathBuf,

        /// Platform API options
        #[command(flatten)]
        platform: PlatformOpts,
    },

    /// Fetch and print a connection record
    ShowConnection {
        /// Connection id to fetch
        #[arg(long)]
        connection_id: String,

        /// Platform API options
        #[command(flatten)]
        platform: PlatformOpts,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Provision {
            source_config,
            destination_config,
            connection_config,
            platform,
        } => {
            let source = SourceConfig::from_file(&source_config)
                .with_context(|| format!("Failed to load source config from {source_config:?}"))?;
            let destination = DestinationConfig::from_file(&destination_config).with_context(
                || format!("Failed to load destination config from {destination_config:?}"),
            )?;
            let connection = ConnectionConfig::from_file(&connection_config).with_context(
                || format!("Failed to load connection config from {connection_config:?}"),
            )?;

            let client = platform.client()?;
            let pipeline = run_provision(&client, source, destination, connection).await?;

            println!("Pipeline provisioned successfully");
            println!("  Source ID:      {}", pipeline.source_id);
            println!("  Destination ID: {}", pipeline.destination_id);
            println!("  Connection ID:  {}", pipeline.connection_id);
        }
        Commands::ShowConnection {
            connection_id,
            platform,
        } => {
            let client = platform.client()?;
            let record = client
                .get_connection(&connection_id)
                .await
                .with_context(|| format!("Failed to fetch connection {connection_id}"))?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
    }

    Ok(())
}
