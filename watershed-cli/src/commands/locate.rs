use crate::cli::OutputFormat;
use crate::context::Engine;
use crate::error::{CliError, CliResult};
use crate::output::format_match;
use watershed_core::Coordinate;

pub fn run(engine: &Engine, lat: f64, lon: f64, format: OutputFormat) -> CliResult<()> {
    let coordinate = Coordinate::try_new(lat, lon)?;
    match engine.inner().locate(coordinate)? {
        Some(m) => {
            println!("{}", format_match(&m, format)?);
            Ok(())
        }
        None => Err(CliError::OutsideCoverage(format!(
            "No watershed found at {coordinate}; it is outside the covered region"
        ))),
    }
}
