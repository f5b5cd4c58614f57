//! Application settings
//!
//! Settings live in a small TOML file in the user's config directory:
//! - Linux: ~/.config/cataract-scan/config.toml
//! - macOS: ~/Library/Application Support/cataract-scan/config.toml
//! - Windows: %APPDATA%\cataract-scan\config.toml
//!
//! A missing file means defaults. Environment variables win over the file.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Overrides the inference service base URL
pub const ENDPOINT_ENV: &str = "CATARACT_SCAN_ENDPOINT";
/// Overrides the log level
pub const LOG_LEVEL_ENV: &str = "CATARACT_SCAN_LOG";

const DEFAULT_ENDPOINT: &str = "http://localhost:8000";
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid settings in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Runtime settings
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Base URL of the inference service, without the `/predict` route
    pub endpoint: String,
    /// Default tracing filter when `RUST_LOG` is not set
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl Settings {
    /// Load settings from the default location and apply environment overrides.
    ///
    /// An unreadable or invalid file falls back to defaults; the error is
    /// handed back for reporting and the overrides still apply.
    pub fn load() -> (Self, Option<ConfigError>) {
        Self::load_from(Self::config_path().as_deref(), |key| std::env::var(key).ok())
    }

    fn load_from<F>(path: Option<&Path>, lookup: F) -> (Self, Option<ConfigError>)
    where
        F: Fn(&str) -> Option<String>,
    {
        let (mut settings, error) = match path.map(Self::from_file) {
            Some(Ok(settings)) => (settings, None),
            Some(Err(e)) => (Self::default(), Some(e)),
            None => (Self::default(), None),
        };
        settings.apply_overrides(lookup);
        (settings, error)
    }

    /// Where the settings file is expected
    pub fn config_path() -> Option<PathBuf> {
        let mut path = dirs::config_dir().or_else(dirs::home_dir)?;
        path.push("cataract-scan");
        path.push("config.toml");
        Some(path)
    }

    /// Read settings from `path`; a missing file yields defaults
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply overrides from a key lookup (the process environment in production)
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(endpoint) = lookup(ENDPOINT_ENV).filter(|v| !v.trim().is_empty()) {
            self.endpoint = endpoint.trim().to_string();
        }
        if let Some(level) = lookup(LOG_LEVEL_ENV).filter(|v| !v.trim().is_empty()) {
            self.log_level = level.trim().to_string();
        }
    }

    /// Full URL of the prediction route
    pub fn predict_url(&self) -> String {
        self.route("predict")
    }

    /// URL probed to check that the service is up
    pub fn health_url(&self) -> String {
        self.route("")
    }

    fn route(&self, path: &str) -> String {
        format!("{}/{}", self.endpoint.trim_end_matches('/'), path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.endpoint, "http://localhost:8000");
        assert_eq!(settings.log_level, "info");
        assert_eq!(settings.predict_url(), "http://localhost:8000/predict");
        assert_eq!(settings.health_url(), "http://localhost:8000/");
    }

    #[test]
    fn test_trailing_slash_is_not_doubled() {
        let settings = Settings {
            endpoint: "http://10.0.0.5:8000/".to_string(),
            ..Settings::default()
        };
        assert_eq!(settings.predict_url(), "http://10.0.0.5:8000/predict");
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::from_file(&dir.path().join("config.toml")).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "endpoint = \"http://inference.local:9000\"").unwrap();

        let settings = Settings::from_file(&path).unwrap();
        assert_eq!(settings.endpoint, "http://inference.local:9000");
        assert_eq!(settings.log_level, "info");
    }

    #[test]
    fn test_invalid_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "endpoint = 8000\n").unwrap();

        let err = Settings::from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "endpont = \"http://typo\"\n").unwrap();

        assert!(Settings::from_file(&path).is_err());
    }

    #[test]
    fn test_environment_overrides() {
        let mut settings = Settings::default();
        settings.apply_overrides(|key| match key {
            ENDPOINT_ENV => Some(" http://gpu-box:8000 ".to_string()),
            LOG_LEVEL_ENV => Some("debug".to_string()),
            _ => None,
        });
        assert_eq!(settings.endpoint, "http://gpu-box:8000");
        assert_eq!(settings.log_level, "debug");
    }

    #[test]
    fn test_overrides_survive_an_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "endpont = \"x\"\n").unwrap();

        let (settings, error) = Settings::load_from(Some(&path), |key| match key {
            ENDPOINT_ENV => Some("http://gpu-box:8000".to_string()),
            LOG_LEVEL_ENV => Some("warn".to_string()),
            _ => None,
        });

        assert!(matches!(error, Some(ConfigError::Parse { .. })));
        assert_eq!(settings.endpoint, "http://gpu-box:8000");
        assert_eq!(settings.log_level, "warn");
    }

    #[test]
    fn test_load_reads_file_then_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "endpoint = \"http://file:9000\"\nlog_level = \"debug\"\n").unwrap();

        let (settings, error) = Settings::load_from(Some(&path), |key| {
            (key == LOG_LEVEL_ENV).then(|| "trace".to_string())
        });

        assert!(error.is_none());
        assert_eq!(settings.endpoint, "http://file:9000");
        assert_eq!(settings.log_level, "trace");
    }

    #[test]
    fn test_no_config_dir_uses_defaults_and_overrides() {
        let (settings, error) = Settings::load_from(None, |key| {
            (key == ENDPOINT_ENV).then(|| "http://gpu-box:8000".to_string())
        });
        assert!(error.is_none());
        assert_eq!(settings.endpoint, "http://gpu-box:8000");
        assert_eq!(settings.log_level, "info");
    }

    #[test]
    fn test_blank_override_is_ignored() {
        let mut settings = Settings::default();
        settings.apply_overrides(|_| Some("   ".to_string()));
        assert_eq!(settings, Settings::default());
    }
}
