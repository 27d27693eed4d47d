//! Client configuration.
//!
//! Loaded from a TOML file with three optional sections:
//!
//! ```toml
//! [store]
//! root = "./pacer-data"
//! members_blob = "members.csv"
//! activities_blob = "activities.csv"
//! max_blob_bytes = 1048576
//!
//! [sync]
//! interval_secs = 30
//!
//! [log]
//! level = "info"
//! ```
//!
//! Every field has a default, so an empty file is a valid configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Documented size cap of each shared blob.
pub const DEFAULT_MAX_BLOB_BYTES: usize = 1024 * 1024;

/// Shortest accepted sync interval.
pub const MIN_SYNC_INTERVAL_SECS: u64 = 1;

/// Longest accepted sync interval.
pub const MAX_SYNC_INTERVAL_SECS: u64 = 3600;

/// Top-level client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PacerConfig {
    /// Where the shared blobs live.
    #[serde(default)]
    pub store: StoreConfig,

    /// Periodic sync settings.
    #[serde(default)]
    pub sync: SyncConfig,

    /// Logging settings.
    #[serde(default)]
    pub log: LogConfig,
}

impl PacerConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, cannot be parsed, or
    /// fails [`Self::validate`].
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid or the values fail
    /// [`Self::validate`].
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize configuration to TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Checks value ranges and blob names.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] describing the first offending
    /// field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.store.validate()?;
        self.sync.validate()?;
        Ok(())
    }
}

/// Blob store location and limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Directory holding the shared blobs.
    #[serde(default = "default_store_root")]
    pub root: PathBuf,

    /// Key of the team-membership blob.
    #[serde(default = "default_members_blob")]
    pub members_blob: String,

    /// Key of the activity blob.
    #[serde(default = "default_activities_blob")]
    pub activities_blob: String,

    /// Size cap applied to every blob read and write.
    #[serde(default = "default_max_blob_bytes")]
    pub max_blob_bytes: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            root: default_store_root(),
            members_blob: default_members_blob(),
            activities_blob: default_activities_blob(),
            max_blob_bytes: default_max_blob_bytes(),
        }
    }
}

impl StoreConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        for (field, key) in [
            ("store.members_blob", &self.members_blob),
            ("store.activities_blob", &self.activities_blob),
        ] {
            if !is_valid_blob_key(key) {
                return Err(ConfigError::Validation(format!(
                    "{field} must be a plain file name, got {key:?}"
                )));
            }
        }
        if self.members_blob == self.activities_blob {
            return Err(ConfigError::Validation(
                "store.members_blob and store.activities_blob must differ".to_string(),
            ));
        }
        if self.max_blob_bytes == 0 {
            return Err(ConfigError::Validation(
                "store.max_blob_bytes must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Returns `true` if `key` can name a blob: non-empty, no path separators,
/// and not a relative path component.
#[must_use]
pub fn is_valid_blob_key(key: &str) -> bool {
    !key.is_empty() && key != "." && key != ".." && !key.contains(['/', '\\', '\0'])
}

/// Periodic sync settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Seconds between background sync rounds.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
        }
    }
}

impl SyncConfig {
    /// Returns the interval as a [`Duration`].
    #[must_use]
    pub const fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_SYNC_INTERVAL_SECS..=MAX_SYNC_INTERVAL_SECS).contains(&self.interval_secs) {
            return Err(ConfigError::Validation(format!(
                "sync.interval_secs must be between {MIN_SYNC_INTERVAL_SECS} and \
                 {MAX_SYNC_INTERVAL_SECS}, got {}",
                self.interval_secs
            )));
        }
        Ok(())
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_store_root() -> PathBuf {
    PathBuf::from("pacer-data")
}

fn default_members_blob() -> String {
    "members.csv".to_string()
}

fn default_activities_blob() -> String {
    "activities.csv".to_string()
}

const fn default_max_blob_bytes() -> usize {
    DEFAULT_MAX_BLOB_BYTES
}

const fn default_interval_secs() -> u64 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// I/O error reading configuration file.
    #[error("failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// TOML serialization error.
    #[error("failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// Validation error.
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = PacerConfig::from_toml("").unwrap();
        assert_eq!(config, PacerConfig::default());
        assert_eq!(config.store.members_blob, "members.csv");
        assert_eq!(config.store.activities_blob, "activities.csv");
        assert_eq!(config.store.max_blob_bytes, 1024 * 1024);
        assert_eq!(config.sync.interval(), Duration::from_secs(30));
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn test_partial_sections() {
        let toml = r#"
            [store]
            root = "/srv/pacer"

            [sync]
            interval_secs = 120
        "#;
        let config = PacerConfig::from_toml(toml).unwrap();
        assert_eq!(config.store.root, PathBuf::from("/srv/pacer"));
        assert_eq!(config.store.members_blob, "members.csv");
        assert_eq!(config.sync.interval_secs, 120);
    }

    #[test]
    fn test_interval_bounds() {
        for bad in [0, 3601] {
            let err = PacerConfig::from_toml(&format!("[sync]\ninterval_secs = {bad}")).unwrap_err();
            match err {
                ConfigError::Validation(msg) => {
                    assert!(msg.contains("sync.interval_secs"), "{msg}");
                },
                other => panic!("Expected ConfigError::Validation, got {other:?}"),
            }
        }
        assert!(PacerConfig::from_toml("[sync]\ninterval_secs = 3600").is_ok());
        assert!(PacerConfig::from_toml("[sync]\ninterval_secs = 1").is_ok());
    }

    #[test]
    fn test_blob_keys_must_be_file_names() {
        for bad in ["", "..", "nested/members.csv", "c:\\\\members.csv"] {
            let toml = format!("[store]\nmembers_blob = \"{bad}\"");
            assert!(
                matches!(
                    PacerConfig::from_toml(&toml),
                    Err(ConfigError::Validation(_))
                ),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_blob_keys_must_differ() {
        let toml = "[store]\nmembers_blob = \"shared.csv\"\nactivities_blob = \"shared.csv\"";
        assert!(matches!(
            PacerConfig::from_toml(toml),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_unknown_type_is_parse_error() {
        let err = PacerConfig::from_toml("[sync]\ninterval_secs = \"soon\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_to_toml_round_trip() {
        let mut config = PacerConfig::default();
        config.store.root = PathBuf::from("/tmp/pacer");
        config.sync.interval_secs = 5;
        config.log.level = "debug".to_string();

        let text = config.to_toml().unwrap();
        assert_eq!(PacerConfig::from_toml(&text).unwrap(), config);
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[log]\nlevel = \"warn\"").unwrap();

        let config = PacerConfig::from_file(file.path()).unwrap();
        assert_eq!(config.log.level, "warn");
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = PacerConfig::from_file(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
