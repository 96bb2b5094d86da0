use serde::Deserialize;
use std::path::Path;
use tracing::info;

use crate::error::{Error, Result};

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MemoirConfig {
    pub storage: StorageConfig,
    pub embedding: EmbeddingConfig,
    pub intelligence: IntelligenceConfig,
}

/// Settings for the bundled SQLite store.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    pub db_path: String,
    /// Table name holding the memories; one collection per table.
    pub collection: String,
}

/// Passthrough settings for whatever embedding provider the caller wires up.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub provider: String,
    pub model: String,
    /// Vector dimensionality, fixed for every record in the collection.
    pub dimensions: usize,
}

/// Knobs for deduplication and forgetting-curve retention.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct IntelligenceConfig {
    pub enabled: bool,
    /// Minimum cosine similarity for two memories to be merged.
    pub duplicate_threshold: f64,
    /// Forgetting-curve decay rate per day.
    pub decay_rate: f64,
    /// Strength boost factor applied when a memory is accessed.
    pub reinforcement_factor: f64,
}

impl Default for MemoirConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig::default(),
            embedding: EmbeddingConfig::default(),
            intelligence: IntelligenceConfig::default(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: "./memoir.db".into(),
            collection: "memories".into(),
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "openai".into(),
            model: "text-embedding-3-small".into(),
            dimensions: 1536,
        }
    }
}

impl Default for IntelligenceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            duplicate_threshold: 0.95,
            decay_rate: 0.1,
            reinforcement_factor: 0.3,
        }
    }
}

impl MemoirConfig {
    /// Load from a TOML file (if it exists), then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path)
                .map_err(|e| Error::InvalidConfig(format!("failed to read config file: {e}")))?;
            toml::from_str(&contents)
                .map_err(|e| Error::InvalidConfig(format!("failed to parse config TOML: {e}")))?
        } else {
            info!("no config file at {}, using defaults", path.display());
            MemoirConfig::default()
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides (MEMOIR_DB, MEMOIR_COLLECTION,
    /// MEMOIR_EMBEDDING_DIMENSIONS).
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("MEMOIR_DB") {
            self.storage.db_path = val;
        }
        if let Ok(val) = std::env::var("MEMOIR_COLLECTION") {
            self.storage.collection = val;
        }
        if let Ok(val) = std::env::var("MEMOIR_EMBEDDING_DIMENSIONS") {
            if let Ok(dims) = val.parse() {
                self.embedding.dimensions = dims;
            }
        }
    }

    /// Check every range invariant. Runs before any collaborator is contacted.
    pub fn validate(&self) -> Result<()> {
        if self.storage.collection.is_empty() {
            return Err(Error::InvalidConfig("storage.collection is empty".into()));
        }
        if !is_valid_identifier(&self.storage.collection) {
            return Err(Error::InvalidConfig(format!(
                "storage.collection {:?} is not a valid table name",
                self.storage.collection
            )));
        }
        if self.embedding.dimensions == 0 {
            return Err(Error::InvalidConfig("embedding.dimensions must be > 0".into()));
        }
        if self.intelligence.enabled {
            let i = &self.intelligence;
            if !(i.duplicate_threshold > 0.0 && i.duplicate_threshold <= 1.0) {
                return Err(Error::InvalidConfig(format!(
                    "intelligence.duplicate_threshold must be in (0, 1], got {}",
                    i.duplicate_threshold
                )));
            }
            if i.decay_rate <= 0.0 {
                return Err(Error::InvalidConfig(format!(
                    "intelligence.decay_rate must be > 0, got {}",
                    i.decay_rate
                )));
            }
            if i.reinforcement_factor <= 0.0 {
                return Err(Error::InvalidConfig(format!(
                    "intelligence.reinforcement_factor must be > 0, got {}",
                    i.reinforcement_factor
                )));
            }
        }
        Ok(())
    }
}

/// SQL identifier check for the collection name: letters, digits, underscores,
/// not starting with a digit.
pub(crate) fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
