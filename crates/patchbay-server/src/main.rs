//! Patchbay server binary.
//!
//! Loads a route configuration from an explicit path and serves its
//! query and pub/sub routes. Function routes need callables registered
//! in Rust, so embedders use the `patchbay-server` library directly;
//! routes whose callables are missing answer with a structured error.

use anyhow::Result;
use clap::Parser;
use patchbay::{open_store, Broker, Config, FunctionRegistry, MemoryBroker};
use patchbay_server::Dispatcher;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "patchbay-server")]
#[command(about = "Serve the routes declared in a Patchbay configuration")]
struct Args {
    /// Path to the configuration file (JSON)
    #[arg(short, long)]
    config: PathBuf,

    /// Host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on (overrides the configured port; 0 = auto-assign)
    #[arg(short, long)]
    port: Option<u16>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.debug { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .init();

    info!("Loading configuration from {}", args.config.display());
    let config = Config::from_path(&args.config)?;

    let store = match &config.server.database {
        Some(db) => Some(open_store(db)?),
        None => None,
    };

    // The in-process broker backs pub/sub routes in a single-process
    // deployment; a networked deployment swaps in a Broker impl dialing
    // the configured URL.
    let broker: Option<Arc<dyn Broker>> = match &config.server.websockets {
        Some(ws) => {
            info!("Using in-process broker (configured broker URL: {})", ws.url());
            Some(Arc::new(MemoryBroker::new()))
        }
        None => None,
    };

    let port = args.port.unwrap_or(config.server.port);
    let dispatcher = Dispatcher::new(config, FunctionRegistry::new(), store, broker)?;

    let addr = dispatcher.serve(&args.host, port).await?;
    info!("Patchbay server running on {}", addr);

    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received, exiting");

    Ok(())
}
