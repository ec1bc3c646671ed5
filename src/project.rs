//! Project discovery and vendor-root resolution.
//!
//! A project is the nearest directory (walking up from a starting point) that
//! holds a `vendr.toml`. The vendor root is the configured `[vendor] dir`,
//! resolved against the project root.

use crate::config::{CONFIG_FILE, ConfigError, VendrConfig};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Failure to work out where the vendor directory lives.
#[derive(Debug, Error)]
pub enum PathError {
    #[error("vendr.toml not found in {0} or any parent directory")]
    ProjectNotFound(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("vendor path {0} exists but is not a directory")]
    NotADirectory(String),

    #[error("IO error resolving vendor path: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone)]
pub struct Project {
    pub root: PathBuf,
    pub config: VendrConfig,
}

impl Project {
    /// Walk up from `start` until a directory containing `vendr.toml` is found.
    pub fn discover(start: &Path) -> Result<Self, PathError> {
        let start = if start.is_absolute() {
            start.to_path_buf()
        } else {
            std::env::current_dir()?.join(start)
        };

        let mut current = Some(start.as_path());
        while let Some(dir) = current {
            if dir.join(CONFIG_FILE).is_file() {
                return Self::load(dir);
            }
            current = dir.parent();
        }
        Err(PathError::ProjectNotFound(start.display().to_string()))
    }

    pub fn load(root: &Path) -> Result<Self, PathError> {
        let config = VendrConfig::load(&root.join(CONFIG_FILE))?;
        tracing::debug!(root = %root.display(), "loaded project config");
        Ok(Self {
            root: root.to_path_buf(),
            config,
        })
    }

    pub fn lock_path(&self) -> PathBuf {
        self.root.join(crate::config::LOCK_FILE)
    }

    /// The directory holding one entry per dependency.
    ///
    /// The directory need not exist yet; a missing vendor root simply means
    /// every dependency is absent.
    pub fn vendor_root(&self) -> Result<PathBuf, PathError> {
        let configured = Path::new(&self.config.vendor.dir);
        let vendor = if configured.is_absolute() {
            configured.to_path_buf()
        } else {
            self.root.join(configured)
        };

        if vendor.exists() && !vendor.is_dir() {
            return Err(PathError::NotADirectory(vendor.display().to_string()));
        }
        Ok(vendor)
    }
}
