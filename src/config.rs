use crate::lookup::{CITY_MIN_CHARS, DEFAULT_DEBOUNCE, LOCATION_MIN_CHARS, LookupPolicy};
use crate::providers::osrm::DEFAULT_ROUTING_URL;
use crate::providers::photon::{
    CITY_SUGGESTION_LIMIT, DEFAULT_GEOCODE_URL, LOCATION_SUGGESTION_LIMIT,
};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_CONFIG_PATH: &str = "config/config.toml";
pub const DEFAULT_SERVER_PORT: u16 = 8080;
pub const DEFAULT_PROVIDER_TIMEOUT_MS: u64 = 8_000;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub app: AppSection,
    pub logging: LoggingSection,
    #[serde(default)]
    pub server: Option<ServerSection>,
    #[serde(default)]
    pub providers: Option<ProvidersSection>,
    #[serde(default)]
    pub lookup: Option<LookupSection>,
    #[serde(default)]
    pub insights: Option<InsightsSection>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppSection {
    pub name: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingSection {
    pub level: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSection {
    /// Port to listen on (default: 8080)
    pub port: Option<u16>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ProvidersSection {
    pub geocode_url: Option<String>,
    pub routing_url: Option<String>,
    /// Outbound request timeout in milliseconds (default: 8000)
    pub timeout_ms: Option<u64>,
    /// Public map style token, handed to the map front end as-is.
    pub map_api_key: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LookupSection {
    pub debounce_ms: Option<u64>,
    pub city_min_chars: Option<usize>,
    pub location_min_chars: Option<usize>,
    pub city_limit: Option<usize>,
    pub location_limit: Option<usize>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct InsightsSection {
    /// JSON congestion table overriding the built-in one.
    pub table_path: Option<PathBuf>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Read(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

pub fn load_default() -> Result<Config, ConfigError> {
    load_from_path(DEFAULT_CONFIG_PATH)
}

pub fn load_from_path(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let contents = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&contents)?;
    Ok(config)
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

impl Config {
    /// Returns the server port (default: 8080)
    pub fn server_port(&self) -> u16 {
        self.server
            .as_ref()
            .and_then(|s| s.port)
            .unwrap_or(DEFAULT_SERVER_PORT)
    }

    pub fn geocode_url(&self) -> &str {
        non_blank(self.providers.as_ref().and_then(|p| p.geocode_url.as_deref()))
            .unwrap_or(DEFAULT_GEOCODE_URL)
    }

    pub fn routing_url(&self) -> &str {
        non_blank(self.providers.as_ref().and_then(|p| p.routing_url.as_deref()))
            .unwrap_or(DEFAULT_ROUTING_URL)
    }

    pub fn provider_timeout(&self) -> Duration {
        let millis = self
            .providers
            .as_ref()
            .and_then(|p| p.timeout_ms)
            .unwrap_or(DEFAULT_PROVIDER_TIMEOUT_MS);
        Duration::from_millis(millis)
    }

    pub fn map_api_key(&self) -> Option<&str> {
        non_blank(self.providers.as_ref().and_then(|p| p.map_api_key.as_deref()))
    }

    pub fn lookup_debounce(&self) -> Duration {
        self.lookup
            .as_ref()
            .and_then(|l| l.debounce_ms)
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_DEBOUNCE)
    }

    pub fn city_lookup_policy(&self) -> LookupPolicy {
        let min_chars = self
            .lookup
            .as_ref()
            .and_then(|l| l.city_min_chars)
            .unwrap_or(CITY_MIN_CHARS);
        LookupPolicy::city()
            .with_debounce(self.lookup_debounce())
            .with_min_chars(min_chars)
    }

    pub fn location_lookup_policy(&self) -> LookupPolicy {
        let min_chars = self
            .lookup
            .as_ref()
            .and_then(|l| l.location_min_chars)
            .unwrap_or(LOCATION_MIN_CHARS);
        LookupPolicy::location()
            .with_debounce(self.lookup_debounce())
            .with_min_chars(min_chars)
    }

    /// `(city, location)` suggestion limits (default: 8 and 6)
    pub fn suggestion_limits(&self) -> (usize, usize) {
        let lookup = self.lookup.as_ref();
        (
            lookup
                .and_then(|l| l.city_limit)
                .unwrap_or(CITY_SUGGESTION_LIMIT),
            lookup
                .and_then(|l| l.location_limit)
                .unwrap_or(LOCATION_SUGGESTION_LIMIT),
        )
    }

    pub fn congestion_table_path(&self) -> Option<&Path> {
        let path = self.insights.as_ref()?.table_path.as_deref()?;
        if path.as_os_str().is_empty() {
            None
        } else {
            Some(path)
        }
    }
}
