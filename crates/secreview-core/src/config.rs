//! Configuration structures for secreview

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration for an audit pass
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditConfig {
    /// General settings
    #[serde(default)]
    pub general: GeneralConfig,

    /// Runner settings
    #[serde(default)]
    pub runner: RunnerSettings,

    /// Result store settings
    #[serde(default)]
    pub store: StoreConfig,

    /// Site configuration the checks inspect
    #[serde(default)]
    pub site: SiteConfig,
}

/// General configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Verbose output
    #[serde(default)]
    pub verbose: bool,

    /// Output format (text, json)
    #[serde(default = "default_output_format")]
    pub output_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            output_format: default_output_format(),
        }
    }
}

fn default_output_format() -> String {
    "text".to_string()
}

/// How the checklist executes checks
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunnerSettings {
    /// Run checks in parallel
    #[serde(default)]
    pub parallel: bool,

    /// Per-check timeout in seconds
    pub timeout_secs: Option<u64>,

    /// Checks to skip, as `namespace/title` keys
    #[serde(default)]
    pub skip_checks: Vec<String>,
}

impl RunnerSettings {
    /// Per-check timeout as a duration
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// Result store configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    /// SQLite database file; results are kept in memory when unset
    pub database_path: Option<PathBuf>,
}

/// Location of the site configuration document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SiteConfig {
    /// YAML or JSON document mapping object name to key/value pairs
    pub config_path: Option<PathBuf>,
}

fn is_json(path: &std::path::Path) -> bool {
    path.extension().map(|e| e == "json").unwrap_or(false)
}

impl AuditConfig {
    /// Load configuration from a file
    pub fn from_file(path: &std::path::Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;

        if is_json(path) {
            serde_json::from_str(&content).map_err(|e| crate::error::ReviewError::Parse {
                context: path.display().to_string(),
                message: e.to_string(),
            })
        } else {
            // Assume YAML for other extensions
            serde_yaml::from_str(&content).map_err(|e| crate::error::ReviewError::Parse {
                context: path.display().to_string(),
                message: e.to_string(),
            })
        }
    }

    /// Save configuration to a file
    pub fn to_file(&self, path: &std::path::Path) -> crate::error::Result<()> {
        let content = if is_json(path) {
            serde_json::to_string_pretty(self)?
        } else {
            serde_yaml::to_string(self)
                .map_err(|e| crate::error::ReviewError::Serialization(e.to_string()))?
        };

        std::fs::write(path, content)?;
        Ok(())
    }
}
