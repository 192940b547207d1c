//! PeelNet CLI
//!
//! Launcher for the onion overlay: the node registry, individual relays
//! and user endpoints, or a whole network in one process.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use peelnet_core::{NetworkConfig, NodeId, UserId};
use peelnet_directory::{DirectoryClient, NodeTable};
use peelnet_endpoint::UserNode;
use peelnet_relay::RelayNode;

/// PeelNet - onion-routing overlay simulator
#[derive(Parser)]
#[command(name = "peelnet")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Registry port
    #[arg(long, default_value_t = 8080)]
    registry_port: u16,

    /// Relay base port (relay N listens on base + N)
    #[arg(long, default_value_t = 4000)]
    base_relay_port: u16,

    /// User base port (user N listens on base + N)
    #[arg(long, default_value_t = 3000)]
    base_user_port: u16,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the node registry
    Registry,

    /// Run one onion router (registers itself with the registry)
    Relay {
        #[arg(long)]
        node_id: NodeId,
    },

    /// Run one user endpoint
    User {
        #[arg(long)]
        user_id: UserId,
    },

    /// Run a whole overlay in one process: registry + relays + users
    Network {
        /// Number of relays (ids 1..=N)
        #[arg(long, default_value_t = 3)]
        relays: u32,

        /// Number of users (ids 1..=N)
        #[arg(long, default_value_t = 2)]
        users: u32,
    },
}

fn init_logging(verbose: bool) {
    let default = if verbose {
        "debug"
    } else {
        "info,peelnet=debug"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}

async fn run_relay(node_id: NodeId, cfg: NetworkConfig) -> Result<()> {
    let node = Arc::new(RelayNode::new(node_id, cfg)?);
    let directory = DirectoryClient::new(&cfg)?;
    node.register(&directory)
        .await
        .context("registering relay with the directory")?;
    peelnet_relay::serve(node).await?;
    Ok(())
}

async fn run_user(user_id: UserId, cfg: NetworkConfig) -> Result<()> {
    let user = Arc::new(UserNode::new(user_id, cfg)?);
    peelnet_endpoint::serve(user).await?;
    Ok(())
}

fn spawn_logged(name: String, task: impl std::future::Future<Output = Result<()>> + Send + 'static) {
    tokio::spawn(async move {
        if let Err(e) = task.await {
            tracing::error!(%name, error = %e, "component exited with error");
        }
    });
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let cfg = NetworkConfig {
        registry_port: cli.registry_port,
        base_relay_port: cli.base_relay_port,
        base_user_port: cli.base_user_port,
    };

    match cli.command {
        Commands::Registry => {
            peelnet_directory::serve(NodeTable::new(), cfg)
                .await
                .context("registry server")?;
        }
        Commands::Relay { node_id } => run_relay(node_id, cfg).await?,
        Commands::User { user_id } => run_user(user_id, cfg).await?,
        Commands::Network { relays, users } => {
            spawn_logged("registry".into(), async move {
                peelnet_directory::serve(NodeTable::new(), cfg)
                    .await
                    .context("registry server")
            });
            // Let the registry bind before relays try to register.
            tokio::time::sleep(Duration::from_millis(50)).await;

            for node_id in 1..=relays {
                spawn_logged(format!("relay-{node_id}"), run_relay(node_id, cfg));
            }
            for user_id in 1..=users {
                spawn_logged(format!("user-{user_id}"), run_user(user_id, cfg));
            }

            tracing::info!(relays, users, "overlay running, ctrl-c to stop");
            tokio::signal::ctrl_c().await?;
            tracing::info!("shutting down");
        }
    }

    Ok(())
}
