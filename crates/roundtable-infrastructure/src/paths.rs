//! Filesystem locations used by roundtable.
//!
//! ```text
//! ~/.config/roundtable/          # config dir
//! ├── config.toml
//! └── characters.toml            # custom characters
//!
//! ~/.local/share/roundtable/     # data dir
//! ├── discussions/
//! │   └── <discussion-id>.toml
//! └── logs/
//!     └── roundtable.log.YYYY-MM-DD
//! ```
//!
//! Setting `ROUNDTABLE_HOME` puts everything under that one directory.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Environment variable overriding both base directories.
pub const HOME_ENV: &str = "ROUNDTABLE_HOME";

const APP_DIR: &str = "roundtable";

#[derive(Error, Debug)]
pub enum PathError {
    #[error("Cannot determine the {0} directory for this platform")]
    DirNotFound(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundtablePaths {
    config_dir: PathBuf,
    data_dir: PathBuf,
}

impl RoundtablePaths {
    /// Platform directories, or `ROUNDTABLE_HOME` when set.
    pub fn resolve() -> Result<Self, PathError> {
        if let Some(home) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
            return Ok(Self::from_home(PathBuf::from(home)));
        }
        let config_dir = dirs::config_dir()
            .ok_or(PathError::DirNotFound("config"))?
            .join(APP_DIR);
        let data_dir = dirs::data_dir()
            .ok_or(PathError::DirNotFound("data"))?
            .join(APP_DIR);
        Ok(Self {
            config_dir,
            data_dir,
        })
    }

    /// Everything under a single directory.
    pub fn from_home(home: impl AsRef<Path>) -> Self {
        let home = home.as_ref().to_path_buf();
        Self {
            config_dir: home.clone(),
            data_dir: home,
        }
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    pub fn characters_file(&self) -> PathBuf {
        self.config_dir.join("characters.toml")
    }

    pub fn discussions_dir(&self) -> PathBuf {
        self.data_dir.join("discussions")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.data_dir.join("logs")
    }
}
