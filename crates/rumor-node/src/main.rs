//! Rumor node binary.
//!
//! Runs one bimodal multicast node. Configuration comes from a TOML file
//! with command-line overrides:
//!
//! ```bash
//! rumor-node --config rumor.toml --port 4001 --peer 127.0.0.1:4000
//! ```

use anyhow::Context;
use clap::Parser;
use rumor_node::logging::init_logging;
use rumor_node::{Node, NodeConfig};
use std::path::PathBuf;

/// Rumor - bimodal multicast node
#[derive(Parser, Debug)]
#[command(name = "rumor-node")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, default_value = "rumor.toml")]
    config: PathBuf,

    /// Bind/advertise address (overrides config file)
    #[arg(long)]
    addr: Option<String>,

    /// Bind/advertise port (overrides config file)
    #[arg(long)]
    port: Option<String>,

    /// Initial peer as addr:port; repeatable (appends to config peers)
    #[arg(long = "peer")]
    peers: Vec<String>,

    /// Fanout coefficient
    #[arg(long)]
    beta: Option<f64>,

    /// Gossip round interval in milliseconds
    #[arg(long)]
    round_duration_ms: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Log format (json, pretty)
    #[arg(long)]
    log_format: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = if args.config.exists() {
        NodeConfig::from_file(&args.config)
            .with_context(|| format!("failed to load {}", args.config.display()))?
    } else {
        NodeConfig::default()
    };

    if let Some(addr) = args.addr {
        config.addr = addr;
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    for peer in &args.peers {
        let (addr, port) = peer
            .rsplit_once(':')
            .with_context(|| format!("invalid peer {peer:?}, expected addr:port"))?;
        config.peers.push(rumor_core::Peer::new(addr, port));
    }
    if let Some(beta) = args.beta {
        config.beta = beta;
    }
    if let Some(ms) = args.round_duration_ms {
        config.round_duration_ms = ms;
    }
    if let Some(level) = args.log_level {
        config.logging.level = level;
    }
    if let Some(format) = args.log_format {
        config.logging.format = format;
    }

    init_logging(&config.logging.level, config.logging.format == "json");

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        addr = %config.addr,
        port = %config.port,
        beta = config.beta,
        round_duration_ms = config.round_duration_ms,
        peers = config.peers.len(),
        "Starting rumor node"
    );

    let node = Node::new(config).context("failed to construct node")?;
    node.start().await.context("failed to start node")?;

    shutdown_signal().await;
    tracing::info!("Shutdown signal received, stopping node");
    node.stop().await;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install CTRL+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
