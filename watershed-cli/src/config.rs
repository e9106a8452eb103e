//! Configuration file support and settings resolution.
//!
//! ## Precedence (highest to lowest)
//!
//! 1. CLI arguments
//! 2. Environment variables (read by clap into the same fields)
//! 3. Config file (`--config` / `WATERSHED_CONFIG`)
//! 4. Hardcoded defaults
//!
//! ```toml
//! [dataset]
//! path = "data/cascadia_watersheds.geojson"
//!
//! [geocode]
//! providers = ["google", "nominatim"]
//! timeout_ms = 5000
//!
//! [validator]
//! confidence_threshold = "high"
//!
//! [cache]
//! ttl_secs = 600
//! ```

use crate::cli::EngineArgs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;
use watershed_geocode::{Confidence, GeocodeConfig, ProviderKind, ValidatorConfig};
use watershed_lookup::CacheConfig;
use watershed_spatial::IndexConfig;

pub const DEFAULT_DATA_PATH: &str = "data/cascadia_watersheds.geojson";

// ---------------------------------------------------------------------------
// File config serde types (all Option, absence means "not set in file")
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct WatershedFileConfig {
    #[serde(default)]
    pub dataset: Option<DatasetFileConfig>,
    #[serde(default)]
    pub geocode: Option<GeocodeFileConfig>,
    #[serde(default)]
    pub validator: Option<ValidatorFileConfig>,
    #[serde(default)]
    pub cache: Option<CacheFileConfig>,
}

/// `[dataset]`
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct DatasetFileConfig {
    pub path: Option<PathBuf>,
    pub compute_missing_area: Option<bool>,
    pub min_features: Option<usize>,
}

/// `[geocode]`
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct GeocodeFileConfig {
    pub providers: Option<Vec<String>>,
    pub google_api_key: Option<String>,
    pub maps_co_api_key: Option<String>,
    pub timeout_ms: Option<u64>,
    pub user_agent: Option<String>,
    pub google_base_url: Option<String>,
    pub maps_co_base_url: Option<String>,
    pub nominatim_base_url: Option<String>,
}

/// `[validator]`
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct ValidatorFileConfig {
    pub confidence_threshold: Option<String>,
    pub similarity_threshold: Option<f64>,
    pub max_suggestions: Option<usize>,
}

/// `[cache]`
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct CacheFileConfig {
    pub capacity: Option<usize>,
    pub ttl_secs: Option<u64>,
}

/// Errors from config file loading and value parsing.
#[derive(Debug, thiserror::Error)]
pub enum ConfigFileError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config file {path}: {detail}")]
    Parse { path: PathBuf, detail: String },
    #[error("Invalid config value: {0}")]
    InvalidValue(String),
}

/// Load a TOML config file. An empty file is the same as no file.
pub fn load_config(path: &Path) -> Result<WatershedFileConfig, ConfigFileError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigFileError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    if content.trim().is_empty() {
        return Ok(WatershedFileConfig::default());
    }

    toml::from_str(&content).map_err(|e| ConfigFileError::Parse {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Resolved settings
// ---------------------------------------------------------------------------

/// Fully resolved engine settings, one config struct per library crate.
#[derive(Debug, Clone)]
pub struct Settings {
    pub data_path: PathBuf,
    pub index: IndexConfig,
    pub geocode: GeocodeConfig,
    pub validator: ValidatorConfig,
    pub cache: CacheConfig,
}

impl Settings {
    /// Merge CLI/env values over the file over the defaults.
    pub fn resolve(
        args: &EngineArgs,
        file: &WatershedFileConfig,
    ) -> Result<Self, ConfigFileError> {
        let dataset = file.dataset.clone().unwrap_or_default();
        let geo = file.geocode.clone().unwrap_or_default();
        let val = file.validator.clone().unwrap_or_default();
        let cache_file = file.cache.clone().unwrap_or_default();

        let data_path = args
            .data
            .clone()
            .or(dataset.path)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_PATH));

        let mut index = IndexConfig::default();
        if let Some(v) = dataset.compute_missing_area {
            index = index.with_compute_missing_area(v);
        }
        if let Some(v) = dataset.min_features {
            index = index.with_min_features(v);
        }

        let mut geocode = GeocodeConfig::default();
        if let Some(names) = args.providers.as_ref().or(geo.providers.as_ref()) {
            geocode = geocode.with_providers(parse_providers(names)?);
        }
        if let Some(key) = args.google_api_key.clone().or(geo.google_api_key) {
            geocode = geocode.with_google_api_key(key);
        }
        if let Some(key) = args.maps_co_api_key.clone().or(geo.maps_co_api_key) {
            geocode = geocode.with_maps_co_api_key(key);
        }
        if let Some(ms) = args.timeout_ms.or(geo.timeout_ms) {
            if ms == 0 {
                return Err(ConfigFileError::InvalidValue(
                    "geocode timeout_ms must be greater than 0".into(),
                ));
            }
            geocode = geocode.with_timeout_ms(ms);
        }
        if let Some(agent) = geo.user_agent {
            geocode = geocode.with_user_agent(agent);
        }
        for (kind, url) in [
            (ProviderKind::Google, geo.google_base_url),
            (ProviderKind::MapsCo, geo.maps_co_base_url),
            (ProviderKind::Nominatim, geo.nominatim_base_url),
        ] {
            if let Some(url) = url {
                geocode = geocode.with_base_url(kind, url);
            }
        }

        let mut validator = ValidatorConfig::default();
        if let Some(raw) = args
            .confidence_threshold
            .as_deref()
            .or(val.confidence_threshold.as_deref())
        {
            let threshold = raw
                .parse::<Confidence>()
                .map_err(ConfigFileError::InvalidValue)?;
            validator = validator.with_confidence_threshold(threshold);
        }
        if let Some(v) = val.similarity_threshold {
            if !(0.0..=1.0).contains(&v) {
                return Err(ConfigFileError::InvalidValue(format!(
                    "similarity_threshold must be within 0..=1, got {v}"
                )));
            }
            validator = validator.with_similarity_threshold(v);
        }
        if let Some(v) = args.max_suggestions.or(val.max_suggestions) {
            validator = validator.with_max_suggestions(v);
        }

        let mut cache = CacheConfig::default();
        if let Some(v) = cache_file.capacity {
            cache = cache.with_capacity(v);
        }
        if let Some(v) = args.cache_ttl_secs.or(cache_file.ttl_secs) {
            cache = cache.with_ttl_secs(v);
        }

        debug!(
            data = %data_path.display(),
            providers = ?geocode.providers,
            timeout_ms = geocode.timeout_ms,
            cache_ttl_secs = cache.ttl_secs,
            "resolved settings"
        );

        Ok(Self {
            data_path,
            index,
            geocode,
            validator,
            cache,
        })
    }
}

fn parse_providers(names: &[String]) -> Result<Vec<ProviderKind>, ConfigFileError> {
    names
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<ProviderKind>().map_err(ConfigFileError::InvalidValue))
        .collect()
}
