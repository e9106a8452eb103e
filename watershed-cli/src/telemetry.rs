//! Logging setup for the `watershed` binary.
//!
//! CLI tracing policy:
//!   `--quiet`   → always "off"
//!   `--verbose` → `RUST_LOG` if set, otherwise "info"
//!   default     → "warn" (seam overlaps and exhausted provider chains still show)
//!
//! Logs go to stderr so stdout stays clean for `--format json`.

use std::env;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Human,
    Json,
}

impl LogFormat {
    /// `LOG_FORMAT=json` selects JSON lines, anything else is human-readable.
    pub fn from_env() -> Self {
        Self::parse(&env::var("LOG_FORMAT").unwrap_or_default())
    }

    fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Human,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Filter directive handed to `EnvFilter`.
    pub filter: String,
    pub log_format: LogFormat,
    pub ansi: bool,
}

impl TelemetryConfig {
    pub fn for_cli(verbose: bool, quiet: bool, no_color: bool) -> Self {
        let rust_log = env::var("RUST_LOG").ok();
        Self {
            filter: filter_directive(verbose, quiet, rust_log.as_deref()),
            log_format: LogFormat::from_env(),
            ansi: !(no_color || env::var_os("NO_COLOR").is_some()),
        }
    }
}

fn filter_directive(verbose: bool, quiet: bool, rust_log: Option<&str>) -> String {
    if quiet {
        return "off".to_string();
    }
    if verbose {
        return rust_log
            .filter(|s| !s.trim().is_empty())
            .unwrap_or("info")
            .to_string();
    }
    "warn".to_string()
}

/// Install the global subscriber. A second call is a no-op.
pub fn init_logging(config: &TelemetryConfig) {
    if tracing::dispatcher::has_been_set() {
        return;
    }

    let filter = EnvFilter::try_new(&config.filter).unwrap_or_else(|_| EnvFilter::new("warn"));

    let fmt_layer = match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .boxed(),
        LogFormat::Human => tracing_subscriber::fmt::layer()
            .with_ansi(config.ansi)
            .with_target(true)
            .with_writer(std::io::stderr)
            .boxed(),
    };

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}
