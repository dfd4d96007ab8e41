//! `OpenRPC` Bridge -- local HTTP to Discord Rich Presence relay.
//!
//! An axum HTTP server that accepts presence updates as JSON and forwards
//! them to a locally running Discord client over its IPC channel. The
//! bridge holds no queue and no persistence; each `POST` maps straight
//! into one activity update.
//!
//! # Usage
//!
//! ```bash
//! # Run on default port 8080
//! cargo run --bin openrpc-bridge
//!
//! # Run on a custom port with a custom application ID
//! cargo run --bin openrpc-bridge -- --port 9090 --client-id 123456789
//!
//! # Or via environment variables
//! BRIDGE_PORT=9090 cargo run --bin openrpc-bridge
//! ```

use std::sync::Arc;

use clap::Parser;
use openrpc_bridge::client::PresenceClient;
use openrpc_bridge::config::{BridgeCliArgs, BridgeConfig};
use openrpc_bridge::discord::DiscordPresence;
use openrpc_bridge::server::{self, BridgeState};

#[tokio::main]
async fn main() {
    let cli = BridgeCliArgs::parse();

    // Load config from CLI args + config file + env vars + defaults.
    let config = match BridgeConfig::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading configuration: {e}");
            std::process::exit(1);
        }
    };

    init_tracing(&config);

    tracing::info!(
        port = config.port,
        client_id = %config.client_id,
        "starting OpenRPC bridge"
    );

    let client: Box<dyn PresenceClient> = match DiscordPresence::new(&config.client_id) {
        Ok(c) => Box::new(c),
        Err(e) => {
            tracing::error!(error = %e, "invalid client ID");
            std::process::exit(1);
        }
    };

    let state = Arc::new(BridgeState::new(config.clone(), client));

    // Initial connect is fatal on failure: there is nothing to relay to.
    if let Err(e) = state.connect().await {
        tracing::error!(error = %e, "failed to connect to Discord");
        std::process::exit(1);
    }

    let handle = match server::start_server_with_state(&config.bind_addr(), Arc::clone(&state))
        .await
    {
        Ok((bound_addr, handle)) => {
            tracing::info!(addr = %bound_addr, "listening; press Ctrl+C to stop");
            handle
        }
        Err(e) => {
            if e.kind() == std::io::ErrorKind::AddrInUse {
                tracing::error!(
                    port = config.port,
                    "port already in use; stop the other listener or pass a different --port"
                );
            } else {
                tracing::error!(error = %e, "failed to start HTTP server");
            }
            state.shutdown().await;
            std::process::exit(1);
        }
    };

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("interrupt received, shutting down");
            state.shutdown().await;
            std::process::exit(0);
        }
        res = handle => {
            if let Err(e) = res {
                tracing::error!(error = %e, "server task failed");
            }
            state.shutdown().await;
            std::process::exit(1);
        }
    }
}

/// Initialize tracing with the resolved log level.
///
/// `RUST_LOG` wins when set. Verbose mode keeps the default format with
/// timestamps and targets; otherwise output is compact.
fn init_tracing(config: &BridgeConfig) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));

    if config.verbose {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .compact()
            .with_target(false)
            .without_time()
            .init();
    }
}
