//! Rate Service
//!
//! Serves the current USDT/RUB best ask/bid from the Garantex order book and
//! records every fetched quote in PostgreSQL.

use clap::Parser;
use rate_service::{logging, App, Args, Config};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration, flags over environment
    let args = Args::parse();
    let config = Config::load(&args)?;

    // Initialize logging
    logging::init(config.mode);

    info!(mode = ?config.mode, "Starting Rate Service");

    let app = App::new(config).await?;
    app.run().await?;

    info!("Rate Service stopped");
    Ok(())
}
