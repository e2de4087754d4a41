//! Runtime settings for the backend client.
//!
//! Settings are layered: built-in defaults, then an optional YAML file, then
//! command-line flags (which clap also fills from environment variables).
//! An empty value at any layer is treated as unset.
//!
//! ```yaml
//! api_base: https://ethics.example.org
//! timeout_secs: 90
//! ```

use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

/// Backend address used when nothing else is configured.
pub const DEFAULT_API_BASE: &str = "http://localhost:8000";

/// Request timeout used when nothing else is configured. Evaluation calls
/// wait on a language model, so this is generous.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid API base URL {value:?}: {source}")]
    InvalidApiBase {
        value: String,
        #[source]
        source: url::ParseError,
    },

    #[error("API base URL {0:?} must use http or https")]
    UnsupportedScheme(String),
}

/// The subset of settings that may appear in a config file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSettings {
    api_base: Option<String>,
    timeout_secs: Option<u64>,
}

/// Resolved client settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Base URL of the backend, always ending in `/` so endpoint paths join
    /// underneath it instead of replacing its last segment.
    pub api_base: Url,
    pub timeout: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base: Url::parse(&format!("{DEFAULT_API_BASE}/"))
                .expect("default API base is a valid URL"),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl Settings {
    /// Load settings from an optional YAML file on top of the defaults.
    #[instrument(level = "debug")]
    pub async fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.to_string(),
                source,
            })?;
        let settings = Self::from_yaml_str(&raw).map_err(|e| match e {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.to_string(),
                source,
            },
            other => other,
        })?;
        debug!(api_base = %settings.api_base, "Loaded config file");
        Ok(settings)
    }

    /// Parse settings from YAML text on top of the defaults.
    pub fn from_yaml_str(raw: &str) -> Result<Self, ConfigError> {
        // An empty document deserializes to unit, not to a map.
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        let file: FileSettings = serde_yaml::from_str(raw).map_err(|source| ConfigError::Parse {
            path: "<inline>".to_string(),
            source,
        })?;
        let mut settings = Self::default();
        if let Some(base) = file.api_base {
            settings = settings.with_api_base(&base)?;
        }
        if let Some(secs) = file.timeout_secs {
            settings = settings.with_timeout_secs(secs);
        }
        Ok(settings)
    }

    /// Override the API base. Blank input leaves the current value alone.
    pub fn with_api_base(mut self, raw: &str) -> Result<Self, ConfigError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(self);
        }
        self.api_base = normalize_api_base(trimmed)?;
        Ok(self)
    }

    /// Override the timeout. Zero leaves the current value alone.
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        if secs > 0 {
            self.timeout = Duration::from_secs(secs);
        }
        self
    }
}

fn normalize_api_base(raw: &str) -> Result<Url, ConfigError> {
    let with_slash = format!("{}/", raw.trim_end_matches('/'));
    let url = Url::parse(&with_slash).map_err(|source| ConfigError::InvalidApiBase {
        value: raw.to_string(),
        source,
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        _ => Err(ConfigError::UnsupportedScheme(raw.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.api_base.as_str(), "http://localhost:8000/");
        assert_eq!(settings.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    }

    #[test]
    fn test_api_base_gets_trailing_slash() {
        let settings = Settings::default()
            .with_api_base("https://ethics.example.org/api")
            .unwrap();
        assert_eq!(settings.api_base.as_str(), "https://ethics.example.org/api/");
        assert_eq!(
            settings.api_base.join("scrape").unwrap().as_str(),
            "https://ethics.example.org/api/scrape"
        );
    }

    #[test]
    fn test_blank_api_base_is_ignored() {
        let settings = Settings::default().with_api_base("   ").unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_invalid_api_base() {
        let err = Settings::default().with_api_base("not a url").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidApiBase { .. }));

        let err = Settings::default().with_api_base("ftp://files.example").unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedScheme(_)));
    }

    #[test]
    fn test_from_yaml() {
        let settings =
            Settings::from_yaml_str("api_base: http://10.0.0.5:9000\ntimeout_secs: 30\n").unwrap();
        assert_eq!(settings.api_base.as_str(), "http://10.0.0.5:9000/");
        assert_eq!(settings.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_from_yaml_partial_and_empty() {
        let settings = Settings::from_yaml_str("timeout_secs: 5").unwrap();
        assert_eq!(settings.api_base.as_str(), "http://localhost:8000/");
        assert_eq!(settings.timeout, Duration::from_secs(5));

        assert_eq!(Settings::from_yaml_str("").unwrap(), Settings::default());
    }

    #[test]
    fn test_from_yaml_rejects_unknown_keys() {
        let err = Settings::from_yaml_str("api_url: http://x").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_zero_timeout_is_ignored() {
        let settings = Settings::default().with_timeout_secs(0);
        assert_eq!(settings.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let err = Settings::load(Some("/definitely/not/here.yaml")).await.unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
        assert_eq!(Settings::load(None).await.unwrap(), Settings::default());
    }
}
