//! Watershed CLI library.
//!
//! Types and command handlers behind the `watershed` binary. The binary
//! parses arguments, installs logging and calls [`run`].

pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod error;
pub mod output;
pub mod telemetry;

use cli::{Cli, Commands};
use commands::join_address;

/// Dispatch a parsed [`Cli`] to its command handler.
pub async fn run(cli: Cli) -> error::CliResult<()> {
    let settings = context::resolve_settings(cli.config.as_deref(), &cli.engine)?;

    match cli.command {
        Commands::Lookup { address, format } => {
            let engine = context::build_engine(&settings)?;
            commands::lookup::run(&engine, &join_address(&address), format).await
        }
        Commands::Validate { address, format } => {
            let engine = context::build_engine(&settings)?;
            commands::validate::run(&engine, &join_address(&address), format).await
        }
        Commands::Locate { lat, lon, format } => {
            let engine = context::build_engine(&settings)?;
            commands::locate::run(&engine, lat, lon, format)
        }
        Commands::Stats { format } => {
            let dataset = context::load_dataset(&settings)?;
            commands::stats::run(&dataset, format)
        }
    }
}
