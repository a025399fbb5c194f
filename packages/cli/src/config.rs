use cascade_diff::CompareMode;
use cascade_workspace::{
    BaselineNaming, OrchestratorConfig, DEFAULT_BASELINE_SUFFIX, DEFAULT_DEBOUNCE,
    DEFAULT_DOCUMENT_NAME,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_CONFIG_NAME: &str = "cascade.config.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config in {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The baseline would be the document itself
    #[error("Invalid config in {}: baselineSuffix must not be empty", path.display())]
    EmptyBaselineSuffix { path: PathBuf },
}

/// Cascade configuration file format
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// File name shared by every document in a family
    #[serde(default = "default_document_name")]
    pub document_name: String,

    /// Inserted between stem and extension to name baselines
    #[serde(default = "default_baseline_suffix")]
    pub baseline_suffix: String,

    /// How long the watcher waits for a burst of events to settle
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    #[serde(default)]
    pub compare_mode: CompareMode,
}

fn default_document_name() -> String {
    DEFAULT_DOCUMENT_NAME.to_string()
}

fn default_baseline_suffix() -> String {
    DEFAULT_BASELINE_SUFFIX.to_string()
}

fn default_debounce_ms() -> u64 {
    DEFAULT_DEBOUNCE.as_millis() as u64
}

impl Config {
    /// Load config from a directory, falling back to defaults when the
    /// directory has no config file.
    pub fn load(dir: &Path) -> Result<Self, ConfigError> {
        let config_path = dir.join(DEFAULT_CONFIG_NAME);

        if !config_path.exists() {
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(&config_path).map_err(|source| ConfigError::Read {
            path: config_path.clone(),
            source,
        })?;
        let config: Config =
            serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
                path: config_path.clone(),
                source,
            })?;

        if config.baseline_suffix.is_empty() {
            return Err(ConfigError::EmptyBaselineSuffix { path: config_path });
        }
        Ok(config)
    }

    /// Command line overrides win over the file
    pub fn with_overrides(mut self, document_name: Option<String>, truncate: bool) -> Self {
        if let Some(name) = document_name {
            self.document_name = name;
        }
        if truncate {
            self.compare_mode = CompareMode::Truncate;
        }
        self
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn orchestrator_config(&self) -> OrchestratorConfig {
        OrchestratorConfig {
            document_name: self.document_name.clone(),
            naming: BaselineNaming::new(self.baseline_suffix.clone()),
            compare_mode: self.compare_mode,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            document_name: default_document_name(),
            baseline_suffix: default_baseline_suffix(),
            debounce_ms: default_debounce_ms(),
            compare_mode: CompareMode::default(),
        }
    }
}
