//! # Configuration
//!
//! Settings are resolved in this order (first wins):
//! 1. CLI flags (applied by the command layer)
//! 2. Environment variables
//! 3. TOML file (`--config PATH`, or `tripleforge.toml` in the working directory)
//! 4. Built-in defaults
//!
//! ## Environment Variables
//!
//! - `TRIPLEFORGE_ENDPOINT`: graph store `host:port` (default: `localhost:8080`)
//! - `TRIPLEFORGE_ACCESS_TOKEN`: ACL access token sent with every request
//! - `TRIPLEFORGE_IDENTITY_FIELD`: field identifying each record (default: `Document_No`)
//! - `TRIPLEFORGE_LOG_FORMAT`: `json` for machine-parseable logs (read in `main`)

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tripleforge_core::ForgeError;
use tripleforge_core::primitives::DEFAULT_IDENTITY_FIELD;

pub const ENV_ENDPOINT: &str = "TRIPLEFORGE_ENDPOINT";
pub const ENV_ACCESS_TOKEN: &str = "TRIPLEFORGE_ACCESS_TOKEN";
pub const ENV_IDENTITY_FIELD: &str = "TRIPLEFORGE_IDENTITY_FIELD";
pub const ENV_LOG_FORMAT: &str = "TRIPLEFORGE_LOG_FORMAT";

/// Default graph store endpoint (Dgraph alpha HTTP port).
pub const DEFAULT_ENDPOINT: &str = "localhost:8080";

/// Config file looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "tripleforge.toml";

/// Maximum config file size (1 MB).
const MAX_CONFIG_FILE_SIZE: u64 = 1024 * 1024;

/// Contents of a TOML config file. Every key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub endpoint: Option<String>,
    pub access_token: Option<String>,
    pub identity_field: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl FileConfig {
    /// Parse TOML text.
    pub fn parse(text: &str) -> Result<Self, ForgeError> {
        toml::from_str(text).map_err(|e| ForgeError::Config(e.to_string()))
    }

    /// Read and parse a config file.
    pub fn read(path: &Path) -> Result<Self, ForgeError> {
        let metadata = std::fs::metadata(path).map_err(|e| {
            ForgeError::Config(format!("Cannot read '{}': {}", path.display(), e))
        })?;
        if metadata.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ForgeError::Config(format!(
                "Config file {} bytes exceeds maximum allowed {} bytes",
                metadata.len(),
                MAX_CONFIG_FILE_SIZE
            )));
        }
        let text = std::fs::read_to_string(path).map_err(|e| {
            ForgeError::Config(format!("Cannot read '{}': {}", path.display(), e))
        })?;
        Self::parse(&text)
    }
}

/// Fully resolved settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub endpoint: String,
    pub access_token: Option<String>,
    pub identity_field: String,
    /// Per-request deadline for the publisher. `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Self::resolve(FileConfig::default(), |_| None)
    }
}

impl Config {
    /// Load the config file (if any) and apply environment overrides.
    ///
    /// An explicit `path` must exist; the default file is optional.
    pub fn load(path: Option<&Path>) -> Result<Self, ForgeError> {
        let file = match path {
            Some(p) => FileConfig::read(p)?,
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default.is_file() {
                    FileConfig::read(&default)?
                } else {
                    FileConfig::default()
                }
            }
        };
        Ok(Self::resolve(file, |key| std::env::var(key).ok()))
    }

    /// Merge file settings with variables from `env`.
    ///
    /// Empty variables are treated as unset.
    pub fn resolve<F>(file: FileConfig, env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = |key: &str| env(key).filter(|v| !v.trim().is_empty());
        Self {
            endpoint: env(ENV_ENDPOINT)
                .or(file.endpoint)
                .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            access_token: env(ENV_ACCESS_TOKEN).or(file.access_token),
            identity_field: env(ENV_IDENTITY_FIELD)
                .or(file.identity_field)
                .unwrap_or_else(|| DEFAULT_IDENTITY_FIELD.to_string()),
            timeout: file.timeout_secs.filter(|s| *s > 0).map(Duration::from_secs),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
