//! Exchange configuration.
//!
//! Sender identity and the key directory, loadable from a JSON file so an
//! interactive front end can persist what the operator typed once. Transport
//! credentials live with the transport implementation, not here.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::keystore::DEFAULT_KEY_DIR;

/// Errors loading or saving a configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Reading or writing the file failed.
    #[error("config I/O failed at {path}: {source}")]
    Io {
        /// Path of the config file.
        path: PathBuf,
        /// Underlying filesystem error.
        source: io::Error,
    },

    /// The file was not valid JSON for this schema.
    #[error("config parse failed: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Settings for an [`Exchange`](crate::exchange::Exchange).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExchangeConfig {
    /// Display name on outgoing mail.
    pub from_name: String,
    /// Sender address; `None` defers to the transport's configured account.
    pub from_address: Option<String>,
    /// Directory holding key files.
    pub key_dir: PathBuf,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            from_name: "Pad Mailer".to_string(),
            from_address: None,
            key_dir: PathBuf::from(DEFAULT_KEY_DIR),
        }
    }
}

impl ExchangeConfig {
    /// Load a configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .map_err(|e| ConfigError::Io { path: path.to_path_buf(), source: e })?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Save the configuration as JSON, creating parent directories on demand.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| ConfigError::Io { path: parent.to_path_buf(), source: e })?;
        }

        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|e| ConfigError::Io { path: path.to_path_buf(), source: e })
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn default_points_at_keys_dir() {
        let config = ExchangeConfig::default();

        assert_eq!(config.key_dir, Path::new("keys"));
        assert_eq!(config.from_name, "Pad Mailer");
        assert_eq!(config.from_address, None);
    }

    #[test]
    fn json_round_trip() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("configs").join("padmail.json");

        let config = ExchangeConfig {
            from_name: "Alice".to_string(),
            from_address: Some("alice@example.org".to_string()),
            key_dir: PathBuf::from("/var/lib/padmail/keys"),
        };
        config.save(&path).unwrap();

        assert_eq!(ExchangeConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("partial.json");
        fs::write(&path, r#"{"from_name":"Bob"}"#).unwrap();

        let config = ExchangeConfig::load(&path).unwrap();
        assert_eq!(config.from_name, "Bob");
        assert_eq!(config.key_dir, Path::new("keys"));
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let err = ExchangeConfig::load("/no/such/padmail.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
