//! Configuration service implementation.
//!
//! Loads `config.toml` from the config directory, writing the defaults on
//! first use.

use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use roundtable_core::config::RoundtableConfig;

use crate::paths::RoundtablePaths;
use crate::storage::{AtomicTomlFile, StorageError};

/// Loads and caches the root configuration.
#[derive(Debug, Clone)]
pub struct ConfigService {
    path: PathBuf,
    config: Arc<RwLock<Option<RoundtableConfig>>>,
}

impl ConfigService {
    pub fn new(paths: &RoundtablePaths) -> Self {
        Self::with_path(paths.config_file())
    }

    /// Uses an explicit config file, e.g. from `--config`.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            config: Arc::new(RwLock::new(None)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Gets the configuration, loading from file if not cached.
    ///
    /// A broken file falls back to the defaults.
    pub fn get_config(&self) -> RoundtableConfig {
        {
            let read_lock = self.config.read().unwrap_or_else(|e| e.into_inner());
            if let Some(ref cached) = *read_lock {
                return cached.clone();
            }
        }

        let loaded = self.load_config().unwrap_or_else(|e| {
            tracing::warn!("Failed to load config from {:?}: {}", self.path, e);
            RoundtableConfig::default()
        });

        let mut write_lock = self.config.write().unwrap_or_else(|e| e.into_inner());
        *write_lock = Some(loaded.clone());
        loaded
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        let mut write_lock = self.config.write().unwrap_or_else(|e| e.into_inner());
        *write_lock = None;
    }

    fn load_config(&self) -> Result<RoundtableConfig, StorageError> {
        let file = AtomicTomlFile::<RoundtableConfig>::new(self.path.clone());
        match file.load()? {
            Some(config) => Ok(config),
            None => {
                let default_config = RoundtableConfig::default();
                file.save(&default_config)?;
                tracing::info!("Wrote default config to {:?}", self.path);
                Ok(default_config)
            }
        }
    }
}
