//! Configuration sources the checks read site settings from

use secreview_core::{ConfigSource, Result, ReviewError};
use serde_json::{Map, Value};
use std::path::Path;

fn lookup(root: &Map<String, Value>, object: &str, key: &str) -> Option<Value> {
    root.get(object)?
        .get(key)
        .filter(|v| !v.is_null())
        .cloned()
}

/// Configuration held in memory, mostly for embedding and tests
#[derive(Debug, Clone, Default)]
pub struct MemoryConfigSource {
    objects: Map<String, Value>,
}

impl MemoryConfigSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key` of configuration object `object`
    pub fn set(&mut self, object: &str, key: &str, value: impl Into<Value>) {
        let entry = self
            .objects
            .entry(object.to_string())
            .or_insert_with(|| Value::Object(Map::new()));

        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        if let Value::Object(map) = entry {
            map.insert(key.to_string(), value.into());
        }
    }

    /// Builder form of [`set`](Self::set)
    pub fn with(mut self, object: &str, key: &str, value: impl Into<Value>) -> Self {
        self.set(object, key, value);
        self
    }
}

impl ConfigSource for MemoryConfigSource {
    fn get(&self, object: &str, key: &str) -> Option<Value> {
        lookup(&self.objects, object, key)
    }
}

/// Configuration read from a YAML or JSON document.
///
/// The document maps configuration object names to key/value tables:
///
/// ```yaml
/// system.logging:
///   error_level: hide
/// ```
#[derive(Debug, Clone, Default)]
pub struct FileConfigSource {
    objects: Map<String, Value>,
}

impl FileConfigSource {
    /// Load a document, choosing the parser by extension
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let context = path.display().to_string();

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let value: Value = if path.extension().map(|e| e == "json").unwrap_or(false) {
            serde_json::from_str(&content).map_err(|e| ReviewError::Parse {
                context: context.clone(),
                message: e.to_string(),
            })?
        } else {
            serde_yaml::from_str(&content).map_err(|e| ReviewError::Parse {
                context: context.clone(),
                message: e.to_string(),
            })?
        };

        tracing::debug!("Loaded site configuration from {}", context);

        match value {
            Value::Object(objects) => Ok(Self { objects }),
            // `~` or an explicit null document
            Value::Null => Ok(Self::default()),
            _ => Err(ReviewError::Parse {
                context,
                message: "expected a mapping of configuration objects".to_string(),
            }),
        }
    }
}

impl ConfigSource for FileConfigSource {
    fn get(&self, object: &str, key: &str) -> Option<Value> {
        lookup(&self.objects, object, key)
    }
}
