use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "watershed",
    about = "Find the watershed and its full lineage for an address in Cascadia",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output (also respects NO_COLOR env var)
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Path to a TOML config file
    #[arg(long, global = true, env = "WATERSHED_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub engine: EngineArgs,
}

/// Settings that shape the lookup engine.
///
/// None of these carry a clap default: an absent value falls through to the
/// config file and then to the built-in default.
#[derive(Args, Debug, Default, Clone)]
pub struct EngineArgs {
    /// Harmonized watershed dataset (GeoJSON FeatureCollection)
    #[arg(long, global = true, env = "WATERSHED_DATA_PATH")]
    pub data: Option<PathBuf>,

    /// Google Geocoding API key; Google is skipped without one
    #[arg(long, global = true, env = "GOOGLE_MAPS_API_KEY", hide_env_values = true)]
    pub google_api_key: Option<String>,

    /// geocode.maps.co API key
    #[arg(long, global = true, env = "MAPS_CO_API_KEY", hide_env_values = true)]
    pub maps_co_api_key: Option<String>,

    /// Per-provider request timeout in milliseconds
    #[arg(long, global = true, env = "WATERSHED_GEOCODE_TIMEOUT_MS")]
    pub timeout_ms: Option<u64>,

    /// Comma-separated provider priority (google,maps_co,nominatim)
    #[arg(
        long,
        global = true,
        env = "WATERSHED_PROVIDERS",
        value_delimiter = ','
    )]
    pub providers: Option<Vec<String>>,

    /// Minimum provider confidence to accept (low, medium, high)
    #[arg(long, global = true, env = "WATERSHED_CONFIDENCE_THRESHOLD")]
    pub confidence_threshold: Option<String>,

    /// Maximum suggestions returned for a rejected address
    #[arg(long, global = true, env = "WATERSHED_MAX_SUGGESTIONS")]
    pub max_suggestions: Option<usize>,

    /// Lookup cache TTL in seconds (0 disables the cache)
    #[arg(long, global = true, env = "WATERSHED_CACHE_TTL_SECS")]
    pub cache_ttl_secs: Option<u64>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve an address to its watershed and hierarchy
    Lookup {
        /// Address text; several arguments are read as separate lines
        #[arg(required = true, num_args = 1..)]
        address: Vec<String>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Find the watershed at a known coordinate, skipping geocoding
    Locate {
        /// Latitude in decimal degrees
        #[arg(allow_negative_numbers = true)]
        lat: f64,

        /// Longitude in decimal degrees
        #[arg(allow_negative_numbers = true)]
        lon: f64,

        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Geocode and validate an address without a containment lookup
    Validate {
        #[arg(required = true, num_args = 1..)]
        address: Vec<String>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Show a summary of the loaded dataset
    Stats {
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}
