use colored::Colorize;
use std::fmt;
use std::process;

/// Exit codes for the CLI.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_ERROR: i32 = 1;
pub const EXIT_USAGE: i32 = 2;
/// The address was understood but not accepted.
pub const EXIT_REJECTED: i32 = 3;
/// The coordinate lies outside every watershed in the dataset.
pub const EXIT_OUTSIDE_COVERAGE: i32 = 4;

/// Unified error type for CLI operations.
pub enum CliError {
    /// Config file, env or flag values that cannot be used.
    Config(String),
    /// The boundary dataset failed to load.
    Dataset(watershed_spatial::DatasetError),
    /// Geocoding chain or orchestrator failure.
    Lookup(watershed_lookup::LookupError),
    /// Argument / usage errors.
    Usage(String),
    /// Address rejected; suggestions were already printed.
    Rejected { suggestions: usize },
    /// No watershed at the resolved coordinate.
    OutsideCoverage(String),
    /// Output could not be rendered or written.
    Output(String),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Usage(_) => EXIT_USAGE,
            CliError::Rejected { .. } => EXIT_REJECTED,
            CliError::OutsideCoverage(_) => EXIT_OUTSIDE_COVERAGE,
            _ => EXIT_ERROR,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(msg) => write!(
                f,
                "{} {msg}\n  {} check --config, WATERSHED_* environment variables and flags",
                "error:".red().bold(),
                "help:".cyan().bold(),
            ),
            CliError::Dataset(e) => write!(
                f,
                "{} {e}\n  {} set --data or WATERSHED_DATA_PATH to a harmonized GeoJSON dataset",
                "error:".red().bold(),
                "help:".cyan().bold(),
            ),
            CliError::Lookup(watershed_lookup::LookupError::Geocode(
                watershed_geocode::GeocodeError::NoProviders,
            )) => write!(
                f,
                "{} no geocoding providers are configured\n  {} set GOOGLE_MAPS_API_KEY or include maps_co / nominatim in --providers",
                "error:".red().bold(),
                "help:".cyan().bold(),
            ),
            CliError::Lookup(e) => write!(f, "{} {e}", "error:".red().bold()),
            CliError::Usage(msg) => write!(f, "{} {msg}", "error:".red().bold()),
            CliError::Rejected { suggestions } if *suggestions > 0 => write!(
                f,
                "{} address could not be validated\n  {} re-run with one of the suggested addresses",
                "error:".red().bold(),
                "help:".cyan().bold(),
            ),
            CliError::Rejected { .. } => write!(
                f,
                "{} address could not be understood\n  {} include a house number, street, city and province or state",
                "error:".red().bold(),
                "help:".cyan().bold(),
            ),
            CliError::OutsideCoverage(msg) => write!(f, "{} {msg}", "error:".red().bold()),
            CliError::Output(msg) => write!(f, "{} {msg}", "error:".red().bold()),
        }
    }
}

impl fmt::Debug for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl From<crate::config::ConfigFileError> for CliError {
    fn from(e: crate::config::ConfigFileError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<watershed_spatial::DatasetError> for CliError {
    fn from(e: watershed_spatial::DatasetError) -> Self {
        CliError::Dataset(e)
    }
}

impl From<watershed_geocode::GeocodeError> for CliError {
    fn from(e: watershed_geocode::GeocodeError) -> Self {
        CliError::Lookup(e.into())
    }
}

impl From<watershed_lookup::LookupError> for CliError {
    fn from(e: watershed_lookup::LookupError) -> Self {
        match e {
            watershed_lookup::LookupError::EmptyAddress => {
                CliError::Usage("address must not be empty".into())
            }
            other => CliError::Lookup(other),
        }
    }
}

impl From<watershed_core::CodeError> for CliError {
    fn from(e: watershed_core::CodeError) -> Self {
        CliError::Usage(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Output(format!("JSON encode error: {e}"))
    }
}

/// Print error and exit with the appropriate code.
pub fn exit_with_error(err: CliError) -> ! {
    eprintln!("{err}");
    process::exit(err.exit_code())
}

pub type CliResult<T> = std::result::Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(CliError::Usage("x".into()).exit_code(), EXIT_USAGE);
        assert_eq!(CliError::Rejected { suggestions: 2 }.exit_code(), EXIT_REJECTED);
        assert_eq!(
            CliError::OutsideCoverage("x".into()).exit_code(),
            EXIT_OUTSIDE_COVERAGE
        );
        assert_eq!(CliError::Config("x".into()).exit_code(), EXIT_ERROR);
        assert_ne!(EXIT_SUCCESS, EXIT_ERROR);
    }

    #[test]
    fn test_empty_address_is_usage_error() {
        let err = CliError::from(watershed_lookup::LookupError::EmptyAddress);
        assert_eq!(err.exit_code(), EXIT_USAGE);
    }

    #[test]
    fn test_display_includes_help_for_missing_providers() {
        colored::control::set_override(false);
        let err = CliError::from(watershed_geocode::GeocodeError::NoProviders);
        let text = err.to_string();
        assert!(text.starts_with("error: no geocoding providers"));
        assert!(text.contains("help:"));
    }
}
