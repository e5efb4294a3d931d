//! SPA edge server.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ security headers ─▶ request id ─▶ routing
//!                                                         │
//!                        ┌────────────────┬───────────────┤
//!                        ▼                ▼               ▼
//!                     /health        API prefix      everything else
//!                    (JSON report)   (forward to     (static bundle,
//!                                     gateway)        SPA fallback)
//!                        │                │               │
//!     Client Response    ▼                ▼               ▼
//!     ◀────────────── JSON error rendering on any failure ◀
//! ```

use std::path::PathBuf;

use clap::Parser;

use spa_edge::config::load_config;
use spa_edge::lifecycle::start;
use spa_edge::observability::init_logging;

#[derive(Parser, Debug)]
#[command(name = "spa-edge", version, about = "Edge server for a single-page application")]
struct Args {
    /// Optional TOML file layered under environment variables
    #[arg(short, long, env = "SPA_EDGE_CONFIG")]
    config: Option<PathBuf>,

    /// Validate configuration, print it as JSON and exit
    #[arg(long)]
    check_config: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = load_config(args.config.as_deref())?;

    if args.check_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    init_logging(&config)?;

    tracing::info!("spa-edge v{} starting", env!("CARGO_PKG_VERSION"));

    start(config).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
