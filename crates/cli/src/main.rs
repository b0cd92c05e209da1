//! RFT reflecting ledger command line interface
//!
//! Builds a ledger from layered configuration, replays operation scripts
//! against it and writes snapshots.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod config;
mod script;

use config::AppConfig;

#[derive(Parser)]
#[command(name = "rft")]
#[command(about = "Reflecting token ledger tools", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file (TOML); defaults to ./rft.toml when present
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run genesis and print the resulting ledger summary
    Genesis,
    /// Replay a JSON operation script against a fresh ledger
    Simulate {
        /// Path to the script (JSON array of tagged operations)
        #[arg(long, value_name = "PATH")]
        script: PathBuf,
        /// Write the final ledger state here
        #[arg(long, value_name = "PATH")]
        snapshot: Option<PathBuf>,
    },
    /// Print the resolved configuration as TOML
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?;
    init_logging(&config)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::Genesis => script::run_genesis(&config, &mut out)?,
        Commands::Simulate { script, snapshot } => {
            script::run_simulation(&config, &script, snapshot.as_deref(), &mut out)?
        }
        Commands::Config => write!(out, "{}", config.to_toml()?)?,
    }

    out.flush()?;
    Ok(())
}

/// Logs go to stderr so stdout stays machine-readable.
fn init_logging(config: &AppConfig) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    if config.log_format == "pretty" {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().pretty().with_writer(io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
            .init();
    }

    Ok(())
}
