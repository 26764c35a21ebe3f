//! Startup configuration: the API credential and tunable settings.
//!
//! The credential is resolved once, before anything is fetched, and handed to
//! [`crate::api::NytClient`] at construction. Settings come from an optional
//! YAML file; CLI flags layered on top in `main`.

use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, instrument};

pub const DEFAULT_BASE_URL: &str = "https://api.nytimes.com";
pub const DEFAULT_API_KEY_FILE: &str = "api_key.json";
/// Largest keyword chart the presenters lay out.
pub const MAX_TOP_N: usize = 50;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no NYT API key: pass --api-key, set NYT_API_KEY, or create {0}")]
    MissingCredential(String),

    #[error("NYT API key is blank")]
    BlankCredential,

    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("credential file {path} is not valid: {source}")]
    CredentialFile {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("config file {path} is not valid: {source}")]
    SettingsFile {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid setting: {0}")]
    Invalid(String),
}

/// The NYT developer API key. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(raw: impl Into<String>) -> Result<Self, ConfigError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ConfigError::BlankCredential);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

#[derive(Debug, Deserialize)]
struct CredentialFile {
    #[serde(rename = "NYT_API_KEY")]
    nyt_api_key: String,
}

/// Resolve the API key: an explicit value wins, otherwise read `file`.
#[instrument(level = "info", skip_all, fields(file = %file.display()))]
pub fn load_api_key(explicit: Option<&str>, file: &Path) -> Result<ApiKey, ConfigError> {
    if let Some(key) = explicit {
        debug!("Using API key from flag or environment");
        return ApiKey::new(key);
    }

    let path = file.display().to_string();
    if !file.exists() {
        return Err(ConfigError::MissingCredential(path));
    }
    let content = std::fs::read_to_string(file).map_err(|source| ConfigError::Read {
        path: path.clone(),
        source,
    })?;
    let parsed: CredentialFile = serde_json::from_str(&content)
        .map_err(|source| ConfigError::CredentialFile { path, source })?;
    info!("Loaded API key from credential file");
    ApiKey::new(parsed.nyt_api_key)
}

/// Tunables for the fetcher and presenters.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Scheme and host of the API, without a trailing path.
    pub base_url: String,
    pub request_timeout_secs: u64,
    /// Day requests in flight at once for the search variant.
    pub concurrency: usize,
    /// Longest date range accepted, in days.
    pub max_days: i64,
    pub top_n: usize,
    pub api_key_file: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: 30,
            concurrency: 4,
            max_days: 31,
            top_n: crate::analysis::TOP_N,
            api_key_file: PathBuf::from(DEFAULT_API_KEY_FILE),
        }
    }
}

impl Settings {
    /// Load settings from a YAML file. Missing keys take their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let display = path.display().to_string();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: display.clone(),
            source,
        })?;
        let settings: Self = serde_yaml::from_str(&content).map_err(|source| {
            ConfigError::SettingsFile {
                path: display,
                source,
            }
        })?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if url::Url::parse(&self.base_url).is_err() {
            return Err(ConfigError::Invalid(format!(
                "base_url {:?} is not a URL",
                self.base_url
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "request_timeout_secs must be greater than 0".into(),
            ));
        }
        if self.concurrency == 0 {
            return Err(ConfigError::Invalid("concurrency must be greater than 0".into()));
        }
        if self.max_days < 1 {
            return Err(ConfigError::Invalid("max_days must be at least 1".into()));
        }
        if self.top_n == 0 || self.top_n > MAX_TOP_N {
            return Err(ConfigError::Invalid(format!(
                "top_n must be between 1 and {MAX_TOP_N}"
            )));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
