use crate::cli::OutputFormat;
use crate::context::Engine;
use crate::error::{CliError, CliResult};
use crate::output::format_lookup;
use watershed_lookup::LookupOutcome;

pub async fn run(engine: &Engine, address: &str, format: OutputFormat) -> CliResult<()> {
    let outcome = engine.lookup(address).await?;
    println!("{}", format_lookup(&outcome, format)?);

    match outcome {
        LookupOutcome::Found(_) => Ok(()),
        LookupOutcome::Rejected(failure) => Err(CliError::Rejected {
            suggestions: failure.suggestions.len(),
        }),
        LookupOutcome::NotFound(nf) => Err(CliError::OutsideCoverage(nf.to_string())),
    }
}
