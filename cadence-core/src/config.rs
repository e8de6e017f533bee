//! Global cadence configuration.

use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::author::CatalogValidator;
use crate::error::{CadenceError, CadenceResult};
use crate::expand::DEFAULT_OCCURRENCE_LIMIT;
use crate::scheduler::UpdateStrategy;

/// Environment variable pointing at an alternative config file.
pub const CONFIG_PATH_VAR: &str = "CADENCE_CONFIG";

/// How the scheduler hands a prepared series to storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Delivery {
    /// Publish a `SeriePrepared` message on the bus.
    #[default]
    Publish,
    /// Write to storage directly.
    Direct,
}

/// Configuration at ~/.config/cadence/config.toml, overridable with
/// `CADENCE_*` environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CadenceConfig {
    pub default_culture: String,
    pub default_timezone: String,
    pub supported_cultures: Vec<String>,
    pub delivery: Delivery,
    /// Update strategies callers may use; anything else is rejected.
    pub update_strategies: Vec<UpdateStrategy>,
    /// Cap on occurrences expanded for one series in one window.
    pub max_occurrences_per_window: u16,
}

impl Default for CadenceConfig {
    fn default() -> Self {
        CadenceConfig {
            default_culture: "en-US".to_string(),
            default_timezone: "UTC".to_string(),
            supported_cultures: ["en-US", "en-GB", "pl-PL", "de-DE", "fr-FR", "es-ES"]
                .into_iter()
                .map(String::from)
                .collect(),
            delivery: Delivery::Publish,
            update_strategies: vec![
                UpdateStrategy::ParticularEvent,
                UpdateStrategy::FutureEvents,
                UpdateStrategy::AllEvents,
            ],
            max_occurrences_per_window: DEFAULT_OCCURRENCE_LIMIT,
        }
    }
}

impl CadenceConfig {
    /// `$CADENCE_CONFIG` if set, else ~/.config/cadence/config.toml
    pub fn config_path() -> CadenceResult<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_PATH_VAR) {
            return Ok(PathBuf::from(shellexpand::tilde(&path).into_owned()));
        }

        let config_dir = dirs::config_dir()
            .ok_or_else(|| CadenceError::Config("Could not determine config directory".into()))?
            .join("cadence");

        Ok(config_dir.join("config.toml"))
    }

    pub fn load() -> CadenceResult<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load from `path` (missing files are fine) layered under the environment.
    pub fn load_from(path: &Path) -> CadenceResult<Self> {
        debug!(path = %path.display(), "Loading configuration");

        let config: CadenceConfig = Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(
                Environment::with_prefix("CADENCE")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("supported_cultures")
                    .with_list_parse_key("update_strategies"),
            )
            .build()
            .map_err(|e| CadenceError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| CadenceError::Config(e.to_string()))?;

        if config.max_occurrences_per_window == 0 {
            return Err(CadenceError::Config(
                "max_occurrences_per_window must be at least 1".into(),
            ));
        }

        Ok(config)
    }

    pub fn validator(&self) -> CatalogValidator {
        CatalogValidator::from_config(self)
    }

    pub fn allows(&self, strategy: UpdateStrategy) -> bool {
        self.update_strategies.contains(&strategy)
    }
}
