//! Command-line front end.
//!
//! Each handler returns the text to print so it can be asserted in tests.

pub mod crops;
pub mod hive;
pub mod location;
pub mod status;

use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};

use crate::context::AppContext;
use crate::error::AppError;

/// Hive Logger - track hive placements and nearby flowering crops
#[derive(Parser, Debug)]
#[command(name = "hive-logger")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Data directory (overrides storage.data_dir)
    #[arg(long, global = true, env = "HIVE_LOGGER_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// More log output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Manage logged hives
    #[command(subcommand)]
    Hive(hive::HiveCommand),

    /// Upcoming flowering crops near the current location
    Crops(crops::CropsArgs),

    /// Current location and manual entry
    #[command(subcommand)]
    Location(location::LocationCommand),

    /// Network connectivity check
    Status(status::StatusArgs),
}

pub async fn execute(ctx: &AppContext, command: Command) -> Result<String, AppError> {
    match command {
        Command::Hive(cmd) => hive::run(ctx, cmd).await,
        Command::Crops(args) => crops::run(ctx, args).await,
        Command::Location(cmd) => location::run(ctx, cmd).await,
        Command::Status(args) => status::run(ctx, args).await,
    }
}

/// Accepts RFC 3339 timestamps or plain `YYYY-MM-DD` dates (midnight UTC).
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, AppError> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(ts.with_timezone(&Utc));
    }
    parse_date(value).map(|d| d.and_time(chrono::NaiveTime::MIN).and_utc())
}

pub fn parse_date(value: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        AppError::InvalidInput(format!("'{value}' is not a date (expected YYYY-MM-DD)"))
    })
}
