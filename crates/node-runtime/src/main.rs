//! # Sollytch Node Runtime
//!
//! Entry point for the lab ledger client.
//!
//! ## Startup Sequence
//!
//! 1. Load configuration from the environment (`SOLLYTCH_*`)
//! 2. Initialise logging
//! 3. Build the ledger connector (peer or in-process network)
//! 4. Serve the HTTP facade until Ctrl+C

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use node_runtime::{init_tracing, load_config, NodeConfig, TransportMode};
use sl_08_lab_ledger::{simulated_network, LedgerConnector};
use sl_09_http_facade::{serve, AppState};

/// The running service: configuration plus the connector shared by all
/// requests.
struct NodeRuntime {
    config: NodeConfig,
    connector: LedgerConnector,
}

impl NodeRuntime {
    fn new(config: NodeConfig) -> Self {
        let connector = match config.transport {
            TransportMode::Peer => LedgerConnector::peer(config.ledger.clone()),
            TransportMode::Memory => {
                warn!("Using the in-process ledger; records are lost on exit");
                let network = Arc::new(simulated_network(&config.ledger));
                LedgerConnector::in_memory(config.ledger.clone(), network)
            }
        };
        Self { config, connector }
    }

    async fn run(self) -> Result<()> {
        info!("===========================================");
        info!("  Sollytch Node Runtime v{}", env!("CARGO_PKG_VERSION"));
        info!("===========================================");
        info!(
            channel = %self.config.ledger.channel_name,
            msp_id = %self.config.ledger.msp_id,
            peer = %self.config.ledger.peer.endpoint,
            transport = ?self.config.transport,
            "Ledger profile loaded"
        );

        serve(self.config.facade, AppState::new(self.connector), shutdown_signal())
            .await
            .context("HTTP facade failed")
    }
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => {
            warn!(error = %e, "Cannot listen for Ctrl+C, running until killed");
            std::future::pending::<()>().await;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = load_config().context("Failed to load configuration")?;
    init_tracing(&config.log_level, config.log_json).context("Failed to initialise logging")?;

    NodeRuntime::new(config).run().await?;

    info!("Shutdown complete");
    Ok(())
}
