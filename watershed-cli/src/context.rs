//! Shared setup for commands: settings, dataset and lookup engine.

use crate::cli::EngineArgs;
use crate::config::{load_config, Settings, WatershedFileConfig};
use crate::error::CliResult;
use std::path::Path;
use std::sync::Arc;
use tracing::info;
use watershed_geocode::{AddressValidator, GeocodeResolver};
use watershed_lookup::{CachedLookup, WatershedLookup};
use watershed_spatial::{BoundarySet, BoundarySetBuilder, LoadStats};

/// Load the config file (if any) and merge it under the CLI/env values.
pub fn resolve_settings(config_path: Option<&Path>, args: &EngineArgs) -> CliResult<Settings> {
    let file = match config_path {
        Some(path) => load_config(path)?,
        None => WatershedFileConfig::default(),
    };
    Ok(Settings::resolve(args, &file)?)
}

/// The loaded dataset and its load statistics.
pub struct Dataset {
    pub boundaries: Arc<BoundarySet>,
    pub stats: LoadStats,
}

pub fn load_dataset(settings: &Settings) -> CliResult<Dataset> {
    let (boundaries, stats) =
        BoundarySetBuilder::new(settings.index.clone()).load(&settings.data_path)?;
    Ok(Dataset {
        boundaries: Arc::new(boundaries),
        stats,
    })
}

/// A lookup engine over a loaded dataset.
pub type Engine = CachedLookup<Arc<BoundarySet>>;

/// Dataset plus geocoding chain, ready for `lookup` / `validate` / `locate`.
pub fn build_engine(settings: &Settings) -> CliResult<Engine> {
    let dataset = load_dataset(settings)?;
    engine_for(settings, dataset.boundaries)
}

pub fn engine_for(settings: &Settings, boundaries: Arc<BoundarySet>) -> CliResult<Engine> {
    let resolver = GeocodeResolver::from_config(&settings.geocode)?;
    let validator = AddressValidator::new(settings.validator.clone());
    info!(
        providers = ?resolver.provider_names(),
        records = boundaries.len(),
        "lookup engine ready"
    );
    let lookup = WatershedLookup::new(boundaries, resolver, validator);
    Ok(CachedLookup::new(lookup, &settings.cache))
}
