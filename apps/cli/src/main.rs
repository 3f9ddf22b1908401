mod commands;
mod config;
mod main_lib;

use std::path::PathBuf;
use std::sync::Arc;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;

use config::Config;
use main_lib::init_tracing;

/// Option contract resolution and strike ladder tool
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Print results as JSON
    #[arg(long, global = true, default_value = "false")]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the strike ladder around a spot price
    Ladder {
        symbol: String,
        spot: f64,
        /// Strikes on each side of the ATM strike
        #[arg(long)]
        half_width: Option<u32>,
    },

    /// Print the order in which candidates would be tried
    Plan { symbol: String },

    /// Print the active profile catalog
    Profiles,

    /// Resolve an underlying against an offline contract catalog
    Resolve {
        symbol: String,
        /// JSON file with validated contracts
        #[arg(long)]
        catalog: PathBuf,
    },

    /// Scan the ATM option chain against an offline contract catalog
    Scan {
        #[arg(required = true)]
        symbols: Vec<String>,
        #[arg(long)]
        catalog: PathBuf,
        /// Option expiry, YYYY-MM-DD
        #[arg(long)]
        expiry: NaiveDate,
        /// Spot price reported for every underlying
        #[arg(long)]
        spot: Option<Decimal>,
        #[arg(long)]
        half_width: Option<u32>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env()?;
    init_tracing(config.log_format);

    let profiles = Arc::new(config.load_profiles()?);

    match cli.command {
        Command::Ladder {
            symbol,
            spot,
            half_width,
        } => commands::ladder(
            &profiles,
            &symbol,
            spot,
            half_width.unwrap_or(config.half_width),
            cli.json,
        ),
        Command::Plan { symbol } => commands::plan(&profiles, &config, &symbol, cli.json),
        Command::Profiles => commands::profiles(&profiles, cli.json),
        Command::Resolve { symbol, catalog } => {
            commands::resolve(&config, profiles, &catalog, &symbol, cli.json).await
        }
        Command::Scan {
            symbols,
            catalog,
            expiry,
            spot,
            half_width,
        } => {
            let scan = commands::ScanArgs {
                symbols,
                catalog,
                expiry,
                spot,
                half_width,
            };
            commands::scan(&config, profiles, scan, cli.json).await
        }
    }
}
