//! # PoW Chain Node
//!
//! Mines on top of an in-memory chain until Ctrl-C.
//!
//! Logging honours `RUST_LOG` (default `info`). See [`NodeConfig`] for the
//! `CHAIN_*` environment overrides.

use std::sync::Arc;

use anyhow::{Context, Result};
use node_runtime::{Node, NodeConfig};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .with_thread_ids(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Load configuration
    let config = NodeConfig::from_env().context("Failed to load configuration")?;
    let max_blocks = config.max_blocks;

    info!("===========================================");
    info!("  PoW Chain Node v{}", env!("CARGO_PKG_VERSION"));
    info!("===========================================");

    let node = Arc::new(Node::new(config).context("Failed to build node")?);
    let listener = node.start();

    node.bootstrap_genesis()
        .await
        .context("Failed to bootstrap genesis block")?;

    // Ctrl-C cancels the in-flight attempt; the mining loop then returns.
    let signal_node = Arc::clone(&node);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Shutdown signal received"),
            Err(e) => error!("Failed to listen for Ctrl-C: {}", e),
        }
        signal_node.shutdown();
    });

    info!("Node is running. Press Ctrl+C to stop.");
    let mined = node.run_mining(max_blocks).await?;

    listener.abort();
    info!(
        mined,
        height = ?node.explorer().chain_height()?,
        balance = node.balance()?,
        "Shutdown complete"
    );
    Ok(())
}
