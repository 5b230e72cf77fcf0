//! Configuration handling for the certdesk client.
//!
//! Configuration is stored in `.certdesk/config.yaml` and includes:
//! - The base API address and request timeouts
//! - An optional bearer token for the API

use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{DeskError, Result};

pub const CONFIG_DIR: &str = ".certdesk";
pub const DEFAULT_API_URL: &str = "http://localhost:3001";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

const API_URL_ENV: &str = "CERTDESK_API_URL";
const API_TOKEN_ENV: &str = "CERTDESK_API_TOKEN";

/// Keys accepted by `config get` / `config set`
pub const VALID_KEYS: &[&str] = &[
    "api.url",
    "api.timeout",
    "api.connect_timeout",
    "auth.token",
];

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base address of the certification API
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Total request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Connection timeout in seconds
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    #[serde(default)]
    pub auth: AuthConfig,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_connect_timeout_secs() -> u64 {
    DEFAULT_CONNECT_TIMEOUT_SECS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            auth: AuthConfig::default(),
        }
    }
}

/// Authentication configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl Config {
    /// Get the path to the config file
    pub fn config_path() -> PathBuf {
        PathBuf::from(CONFIG_DIR).join("config.yaml")
    }

    /// Load configuration from file, or return default if not found
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(&path)?;
        let config: Config = serde_yaml_ng::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_yaml_ng::to_string(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    /// Effective API base URL, environment first
    pub fn api_url(&self) -> Result<Url> {
        let raw = match env::var(API_URL_ENV) {
            Ok(value) if !value.is_empty() => value,
            _ => self.api_url.clone(),
        };
        parse_api_url(&raw)
    }

    /// Get the API token from the environment or config file
    pub fn api_token(&self) -> Option<String> {
        if let Ok(token) = env::var(API_TOKEN_ENV)
            && !token.is_empty()
        {
            return Some(token);
        }

        self.auth.token.clone()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Read a value by dotted key
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let key = validate_key(key)?;
        let value = match key {
            "api.url" => Some(self.api_url.clone()),
            "api.timeout" => Some(self.timeout_secs.to_string()),
            "api.connect_timeout" => Some(self.connect_timeout_secs.to_string()),
            "auth.token" => self.auth.token.clone(),
            _ => unreachable!("validated above"),
        };
        Ok(value)
    }

    /// Set a value by dotted key
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let key = validate_key(key)?;
        match key {
            "api.url" => {
                parse_api_url(value)?;
                self.api_url = value.trim_end_matches('/').to_string();
            }
            "api.timeout" => self.timeout_secs = parse_seconds(key, value)?,
            "api.connect_timeout" => self.connect_timeout_secs = parse_seconds(key, value)?,
            "auth.token" => self.auth.token = Some(value.to_string()),
            _ => unreachable!("validated above"),
        }
        Ok(())
    }
}

/// Reject unknown keys and suggest dot notation for underscore spellings
fn validate_key(key: &str) -> Result<&'static str> {
    if let Some(known) = VALID_KEYS.iter().find(|k| **k == key) {
        return Ok(*known);
    }

    if let Some(pos) = key.find('_') {
        let dot_version = format!("{}.{}", &key[..pos], &key[pos + 1..]);
        if VALID_KEYS.contains(&dot_version.as_str()) {
            return Err(DeskError::Config(format!(
                "invalid config key '{key}'. Use dot notation: '{dot_version}'"
            )));
        }
    }

    Err(DeskError::Config(format!(
        "unknown config key '{key}', expected one of: {}",
        VALID_KEYS.join(", ")
    )))
}

fn parse_api_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw)
        .map_err(|e| DeskError::Config(format!("invalid API url '{raw}': {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(DeskError::Config(format!(
            "invalid API url '{raw}': unsupported scheme '{other}'"
        ))),
    }
}

fn parse_seconds(key: &str, value: &str) -> Result<u64> {
    match value.parse::<u64>() {
        Ok(0) | Err(_) => Err(DeskError::Config(format!(
            "{key} must be a positive number of seconds, got '{value}'"
        ))),
        Ok(secs) => Ok(secs),
    }
}
