use crate::cli::OutputFormat;
use crate::context::Dataset;
use crate::error::CliResult;
use crate::output::format_stats;

pub fn run(dataset: &Dataset, format: OutputFormat) -> CliResult<()> {
    let summary = dataset.boundaries.summary();
    println!("{}", format_stats(&summary, &dataset.stats, format)?);
    Ok(())
}
