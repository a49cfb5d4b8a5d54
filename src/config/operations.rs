//! Config loading, validation, and serialization.

use super::model::Config;
use crate::error::{FsError, Result};
use std::path::Path;

impl Config {
    /// Read and validate a YAML config file.
    ///
    /// Parse and validation errors name `path` so a bad settings file is
    /// easy to find.
    ///
    /// # Errors
    ///
    /// * `FsError::Config` - the file is unreadable, malformed or invalid
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let origin = path.display().to_string();

        let yaml = std::fs::read_to_string(path)
            .map_err(|e| FsError::Config(format!("cannot read fsprims config '{}': {}", origin, e)))?;

        Self::parse(&yaml, &origin)
    }

    /// Parse and validate config held in memory.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Self::parse(yaml, "<inline>")
    }

    /// Render the config as YAML, e.g. to write out a starter file.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self)
            .map_err(|e| FsError::Config(format!("cannot render fsprims config: {}", e)))
    }

    fn parse(yaml: &str, origin: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)
            .map_err(|e| FsError::Config(format!("invalid fsprims config in {}: {}", origin, e)))?;

        config
            .validate()
            .map_err(|e| FsError::Config(format!("{} (in {})", e, origin)))?;
        Ok(config)
    }

    /// Validate config values.
    ///
    /// `lock_file_mode` must fit in the permission bits (`0o7777`).
    pub fn validate(&self) -> Result<()> {
        if self.lock_file_mode > 0o7777 {
            return Err(FsError::Config(format!(
                "config validation failed: lock_file_mode {:#o} exceeds 0o7777",
                self.lock_file_mode
            )));
        }

        Ok(())
    }
}
