use crate::cli::OutputFormat;
use crate::error::CliResult;
use comfy_table::{ContentArrangement, Table};
use serde::Serialize;
use watershed_geocode::{AcceptedAddress, Confidence};
use watershed_lookup::{
    HierarchyResult, LookupOutcome, Suggestion, ValidationFailure, ValidationOutcome,
    WatershedMatch, WatershedResult, WatershedSummary,
};
use watershed_spatial::{DatasetSummary, LoadStats};

fn to_json<T: Serialize>(value: &T) -> CliResult<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

fn new_table() -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn confidence_label(confidence: Option<Confidence>) -> String {
    confidence.map_or_else(|| "-".to_string(), |c| c.to_string())
}

pub fn format_lookup(outcome: &LookupOutcome, format: OutputFormat) -> CliResult<String> {
    match format {
        OutputFormat::Json => to_json(outcome),
        OutputFormat::Table => Ok(match outcome {
            LookupOutcome::Found(result) => result_table(result),
            LookupOutcome::Rejected(failure) => failure_table(failure),
            LookupOutcome::NotFound(nf) => nf.to_string(),
        }),
    }
}

pub fn format_match(m: &WatershedMatch, format: OutputFormat) -> CliResult<String> {
    match format {
        OutputFormat::Json => to_json(m),
        OutputFormat::Table => {
            let mut table = new_table();
            table.set_header(vec!["Field", "Value"]);
            table.add_row(vec![
                "Coordinate".to_string(),
                m.coordinate.to_string(),
            ]);
            add_watershed_rows(&mut table, &m.watershed);
            Ok(format!("{table}\n{}", hierarchy_table(&m.hierarchy)))
        }
    }
}

pub fn format_validation(outcome: &ValidationOutcome, format: OutputFormat) -> CliResult<String> {
    match format {
        OutputFormat::Json => to_json(outcome),
        OutputFormat::Table => Ok(match outcome {
            ValidationOutcome::Accepted(accepted) => accepted_table(accepted),
            ValidationOutcome::Rejected(failure) => failure_table(failure),
        }),
    }
}

pub fn format_stats(
    summary: &DatasetSummary,
    load: &LoadStats,
    format: OutputFormat,
) -> CliResult<String> {
    match format {
        OutputFormat::Json => to_json(&serde_json::json!({
            "dataset": summary,
            "load": {
                "features": load.features,
                "polygons": load.polygon_count,
                "multipolygons": load.multipolygon_count,
                "vertices": load.vertex_count,
                "computed_areas": load.computed_areas,
                "elapsed_ms": load.elapsed_ms,
            },
        })),
        OutputFormat::Table => {
            let mut table = new_table();
            table.set_header(vec!["Metric", "Value"]);
            table.add_row(vec![
                "Version".to_string(),
                summary.version.clone().unwrap_or_else(|| "-".into()),
            ]);
            table.add_row(vec!["Records".to_string(), summary.records.to_string()]);
            table.add_row(vec!["US records".to_string(), summary.us_records.to_string()]);
            table.add_row(vec!["CA records".to_string(), summary.ca_records.to_string()]);
            for (source, count) in &summary.by_source {
                table.add_row(vec![format!("Source {source}"), count.to_string()]);
            }
            table.add_row(vec!["Named codes".to_string(), summary.named_codes.to_string()]);
            table.add_row(vec![
                "Total area".to_string(),
                format!("{:.1} km²", summary.total_area_sqkm),
            ]);
            let e = &summary.extent;
            table.add_row(vec![
                "Extent".to_string(),
                format!(
                    "lat {:.4}..{:.4}, lon {:.4}..{:.4}",
                    e.min_lat, e.max_lat, e.min_lng, e.max_lng
                ),
            ]);
            table.add_row(vec![
                "Geometries".to_string(),
                format!(
                    "{} polygons, {} multipolygons, {} vertices",
                    load.polygon_count, load.multipolygon_count, load.vertex_count
                ),
            ]);
            table.add_row(vec!["Load time".to_string(), format!("{} ms", load.elapsed_ms)]);
            Ok(table.to_string())
        }
    }
}

fn result_table(result: &WatershedResult) -> String {
    let mut table = new_table();
    table.set_header(vec!["Field", "Value"]);
    table.add_row(vec!["Address".to_string(), result.formatted_address.clone()]);
    table.add_row(vec!["Coordinate".to_string(), result.coordinate.to_string()]);
    table.add_row(vec![
        "Geocoded by".to_string(),
        format!("{} ({})", result.provider, confidence_label(result.confidence)),
    ]);
    add_watershed_rows(&mut table, &result.watershed);
    format!("{table}\n{}", hierarchy_table(&result.hierarchy))
}

fn add_watershed_rows(table: &mut Table, watershed: &WatershedSummary) {
    table.add_row(vec!["Watershed".to_string(), watershed.name.clone()]);
    table.add_row(vec!["ID".to_string(), watershed.id.clone()]);
    table.add_row(vec![
        "Country".to_string(),
        format!("{} ({})", watershed.country, watershed.data_source),
    ]);
    table.add_row(vec![
        "Area".to_string(),
        format!("{:.1} km²", watershed.area_sqkm),
    ]);
    if let Some(downstream) = &watershed.downstream_id {
        table.add_row(vec!["Drains to".to_string(), downstream.clone()]);
    }
}

fn hierarchy_table(hierarchy: &HierarchyResult) -> String {
    let mut table = new_table();
    table.set_header(vec!["Level", "Code", "Name"]);
    for level in hierarchy.levels() {
        table.add_row(vec![
            level.level.to_string(),
            level.code.clone(),
            level.name.clone().unwrap_or_default(),
        ]);
    }
    table.to_string()
}

fn accepted_table(accepted: &AcceptedAddress) -> String {
    let mut table = new_table();
    table.set_header(vec!["Field", "Value"]);
    table.add_row(vec!["Status".to_string(), "accepted".to_string()]);
    table.add_row(vec!["Address".to_string(), accepted.formatted_address.clone()]);
    table.add_row(vec!["Coordinate".to_string(), accepted.coordinate.to_string()]);
    table.add_row(vec!["Provider".to_string(), accepted.provider.clone()]);
    table.add_row(vec![
        "Confidence".to_string(),
        confidence_label(accepted.confidence),
    ]);
    table.add_row(vec![
        "Similarity".to_string(),
        format!("{:.2}", accepted.similarity),
    ]);
    table.to_string()
}

fn failure_table(failure: &ValidationFailure) -> String {
    let header = format!(
        "Address not accepted: {} ({})",
        failure.input_address, failure.reason
    );
    if failure.suggestions.is_empty() {
        return format!("{header}\nNo suggestions available.");
    }
    format!("{header}\n{}", suggestions_table(&failure.suggestions))
}

fn suggestions_table(suggestions: &[Suggestion]) -> String {
    let mut table = new_table();
    table.set_header(vec!["#", "Suggested address", "Confidence", "Coordinate", "Provider"]);
    for (i, s) in suggestions.iter().enumerate() {
        table.add_row(vec![
            (i + 1).to_string(),
            s.suggested_address.clone(),
            confidence_label(s.confidence),
            s.coordinate.map(|c| c.to_string()).unwrap_or_default(),
            s.provider.clone(),
        ]);
    }
    table.to_string()
}
