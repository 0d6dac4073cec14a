//! Runtime Settings
//!
//! Layered as: built-in defaults, then `config/fault-detect.toml` if present,
//! then `FAULT_DETECT__*` environment variables (e.g.
//! `FAULT_DETECT__MODEL__N_ESTIMATORS=200`).

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use fault_classifier::ModelConfig;
use serde::Deserialize;

/// Optional settings file, relative to the working directory
pub const CONFIG_FILE: &str = "config/fault-detect";

/// Environment variable prefix
pub const ENV_PREFIX: &str = "FAULT_DETECT";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub log: LogSettings,
    pub model: ModelSettings,
    pub storage: StorageSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// Listen address
    pub addr: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogSettings {
    /// Filter used when `RUST_LOG` is unset
    pub level: String,
    /// Emit JSON lines instead of human readable output
    pub json: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelSettings {
    pub n_estimators: usize,
    pub max_depth: u32,
    pub threshold: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    pub max_records: usize,
}

impl Settings {
    /// Load settings from every layer
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(CONFIG_FILE)
    }

    /// Load settings using a specific file (extension optional)
    pub fn load_from(path: &str) -> Result<Self, ConfigError> {
        defaults()?
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Model configuration described by the `model` section
    pub fn model_config(&self) -> ModelConfig {
        ModelConfig::random_forest(
            self.model.n_estimators,
            self.model.max_depth,
            self.model.threshold,
        )
    }
}

fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let model = ModelConfig::default().parameters;

    Config::builder()
        .set_default("server.addr", "0.0.0.0:8080")?
        .set_default("log.level", "info")?
        .set_default("log.json", false)?
        .set_default("model.n_estimators", model.n_estimators as i64)?
        .set_default("model.max_depth", model.max_depth as i64)?
        .set_default("model.threshold", model.threshold)?
        .set_default("storage.max_records", storage::DEFAULT_MAX_RECORDS as i64)
}
