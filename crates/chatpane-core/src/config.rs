use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;
use crate::strings::Locale;
use crate::typewriter::{Typewriter, DEFAULT_MAX_DELAY_MS, DEFAULT_MIN_DELAY_MS};
use crate::widget::WidgetConfig;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:8080";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

pub const ENDPOINT_ENV: &str = "CHATPANE_ENDPOINT";
pub const LOCALE_ENV: &str = "CHATPANE_LOCALE";

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub endpoint: Option<String>,
    pub locale: Option<String>,
    pub min_delay_ms: Option<u64>,
    pub max_delay_ms: Option<u64>,
    pub request_timeout_secs: Option<u64>,
}

/// Fully resolved runtime settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub endpoint: String,
    pub widget: WidgetConfig,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from the default location. A missing file yields defaults.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::get_config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::get_config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let io_err = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };

        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let content = serde_json::to_string_pretty(self).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, content).map_err(io_err)
    }

    /// Environment variables win over the file.
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(endpoint) = lookup(ENDPOINT_ENV).filter(|v| !v.trim().is_empty()) {
            self.endpoint = Some(endpoint);
        }
        if let Some(locale) = lookup(LOCALE_ENV).filter(|v| !v.trim().is_empty()) {
            self.locale = Some(locale);
        }
        self
    }

    /// Overlay the fields that are set in `other`.
    pub fn merge(mut self, other: Config) -> Self {
        self.endpoint = other.endpoint.or(self.endpoint);
        self.locale = other.locale.or(self.locale);
        self.min_delay_ms = other.min_delay_ms.or(self.min_delay_ms);
        self.max_delay_ms = other.max_delay_ms.or(self.max_delay_ms);
        self.request_timeout_secs = other.request_timeout_secs.or(self.request_timeout_secs);
        self
    }

    pub fn resolve(&self) -> Result<Settings, ConfigError> {
        let endpoint = self
            .endpoint
            .clone()
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
        if endpoint.trim().is_empty() {
            return Err(ConfigError::EmptyEndpoint);
        }

        let locale = match &self.locale {
            Some(name) => {
                Locale::from_str(name).ok_or_else(|| ConfigError::UnknownLocale(name.clone()))?
            }
            None => Locale::default(),
        };

        let typewriter = Typewriter::new(
            self.min_delay_ms.unwrap_or(DEFAULT_MIN_DELAY_MS),
            self.max_delay_ms.unwrap_or(DEFAULT_MAX_DELAY_MS),
        )?;

        let timeout_secs = self
            .request_timeout_secs
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        let request_timeout = Duration::from_secs(timeout_secs);

        Ok(Settings {
            endpoint,
            widget: WidgetConfig {
                locale,
                typewriter,
                request_timeout,
            },
        })
    }

    pub fn get_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;

        Ok(config_dir.join("chatpane").join("config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config, Config::default());

        let settings = config.resolve().unwrap();
        assert_eq!(settings.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(settings.widget.locale, Locale::English);
        assert_eq!(settings.widget.typewriter.min_delay(), Duration::from_millis(10));
        assert_eq!(settings.widget.typewriter.max_delay(), Duration::from_millis(50));
        assert_eq!(settings.widget.request_timeout, Duration::from_secs(60));
    }

    #[test]
    fn save_then_load_keeps_fields() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = Config {
            endpoint: Some("http://chat.local:9000".into()),
            locale: Some("zh".into()),
            min_delay_ms: Some(5),
            max_delay_ms: Some(8),
            request_timeout_secs: Some(3),
        };

        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn malformed_file_reports_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();

        match Config::load_from(&path) {
            Err(ConfigError::Parse { path: p, .. }) => assert_eq!(p, path),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn env_then_cli_layering() {
        let file = Config {
            endpoint: Some("http://file".into()),
            locale: Some("en".into()),
            ..Config::default()
        };
        let env = |key: &str| match key {
            ENDPOINT_ENV => Some("http://env".to_string()),
            LOCALE_ENV => Some("  ".to_string()),
            _ => None,
        };
        let cli = Config {
            locale: Some("zh".into()),
            max_delay_ms: Some(80),
            ..Config::default()
        };

        let settings = file.with_env_overrides(env).merge(cli).resolve().unwrap();
        assert_eq!(settings.endpoint, "http://env");
        assert_eq!(settings.widget.locale, Locale::Chinese);
        assert_eq!(settings.widget.typewriter.max_delay(), Duration::from_millis(80));
    }

    #[test]
    fn resolve_rejects_bad_values() {
        let bad_locale = Config {
            locale: Some("klingon".into()),
            ..Config::default()
        };
        assert!(matches!(bad_locale.resolve(), Err(ConfigError::UnknownLocale(_))));

        let bad_delays = Config {
            min_delay_ms: Some(100),
            ..Config::default()
        };
        assert!(matches!(
            bad_delays.resolve(),
            Err(ConfigError::DelayRange { min: 100, max: 50 })
        ));

        let empty = Config {
            endpoint: Some(" ".into()),
            ..Config::default()
        };
        assert!(matches!(empty.resolve(), Err(ConfigError::EmptyEndpoint)));

        let no_timeout = Config {
            request_timeout_secs: Some(0),
            ..Config::default()
        };
        assert!(matches!(no_timeout.resolve(), Err(ConfigError::ZeroTimeout)));
    }
}
