use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use hive_logger::cli::{self, Cli};
use hive_logger::{logging, AppContext, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Cli::parse();

    let mut config = Config::load().context("Failed to load configuration")?;
    if let Some(data_dir) = args.data_dir {
        config.storage.data_dir = data_dir;
    }

    logging::init_logging(&config.logging, args.verbose);
    info!("Starting Hive Logger v{}", env!("CARGO_PKG_VERSION"));

    let ctx = AppContext::build(config).await?;
    let output = cli::execute(&ctx, args.command).await?;
    println!("{output}");

    Ok(())
}
