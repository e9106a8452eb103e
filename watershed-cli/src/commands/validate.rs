use crate::cli::OutputFormat;
use crate::context::Engine;
use crate::error::{CliError, CliResult};
use crate::output::format_validation;
use watershed_lookup::ValidationOutcome;

pub async fn run(engine: &Engine, address: &str, format: OutputFormat) -> CliResult<()> {
    let outcome = engine.inner().validate(address).await?;
    println!("{}", format_validation(&outcome, format)?);

    match outcome {
        ValidationOutcome::Accepted(_) => Ok(()),
        ValidationOutcome::Rejected(failure) => Err(CliError::Rejected {
            suggestions: failure.suggestions.len(),
        }),
    }
}
