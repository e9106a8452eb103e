use clap::Parser;
use watershed_cli::cli::Cli;
use watershed_cli::error::exit_with_error;
use watershed_cli::telemetry::{init_logging, TelemetryConfig};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Errors go to stderr, so a piped stdout keeps colored error messages.
    if cli.no_color || std::env::var_os("NO_COLOR").is_some() {
        colored::control::set_override(false);
    }

    init_logging(&TelemetryConfig::for_cli(cli.verbose, cli.quiet, cli.no_color));

    if let Err(e) = watershed_cli::run(cli).await {
        exit_with_error(e);
    }
}
