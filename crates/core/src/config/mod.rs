//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (MCP_OFFLINE_*)
//! 2. TOML config file (if MCP_OFFLINE_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (MCP_OFFLINE_*)
/// 2. TOML config file (if MCP_OFFLINE_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to SQLite cache database.
    ///
    /// Set via MCP_OFFLINE_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// User-Agent string for HTTP requests.
    ///
    /// Set via MCP_OFFLINE_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Maximum bytes to fetch per request.
    ///
    /// Set via MCP_OFFLINE_MAX_BYTES environment variable.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// HTTP request timeout in milliseconds.
    ///
    /// Set via MCP_OFFLINE_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Origin that relative request paths and the precache manifest resolve against.
    ///
    /// Set via MCP_OFFLINE_ORIGIN environment variable.
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Prefix shared by every store name.
    ///
    /// Set via MCP_OFFLINE_CACHE_PREFIX environment variable.
    #[serde(default = "default_cache_prefix")]
    pub cache_prefix: String,

    /// Policy version. Changing it retires the stores of the previous version
    /// on the next activation.
    ///
    /// Set via MCP_OFFLINE_VERSION environment variable.
    #[serde(default = "default_version")]
    pub version: String,

    /// Path prefix that marks a request as an API call.
    ///
    /// Set via MCP_OFFLINE_API_PREFIX environment variable.
    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,

    /// Paths fetched into the static store during install.
    ///
    /// Set via MCP_OFFLINE_PRECACHE environment variable.
    #[serde(default = "default_precache")]
    pub precache: Vec<String>,
}

/// The allow-list of store names for one policy version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct StoreNames {
    pub umbrella: String,
    pub static_assets: String,
    pub api: String,
}

impl StoreNames {
    /// Derive the three store names from a prefix and version.
    pub fn new(prefix: &str, version: &str) -> Self {
        Self {
            umbrella: format!("{prefix}-{version}"),
            static_assets: format!("{prefix}-static-{version}"),
            api: format!("{prefix}-api-{version}"),
        }
    }

    /// Whether `name` belongs to the allow-list.
    pub fn contains(&self, name: &str) -> bool {
        name == self.umbrella || name == self.static_assets || name == self.api
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./mcp-offline-cache.sqlite")
}

fn default_user_agent() -> String {
    "mcp-offline/0.1".into()
}

fn default_max_bytes() -> usize {
    5_242_880 // 5MB
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_origin() -> String {
    "http://localhost:5173".into()
}

fn default_cache_prefix() -> String {
    "alexa-tech".into()
}

fn default_version() -> String {
    "v1".into()
}

fn default_api_prefix() -> String {
    "/api/".into()
}

fn default_precache() -> Vec<String> {
    ["/", "/index.html", "/src/main.tsx", "/manifest.json"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            user_agent: default_user_agent(),
            max_bytes: default_max_bytes(),
            timeout_ms: default_timeout_ms(),
            origin: default_origin(),
            cache_prefix: default_cache_prefix(),
            version: default_version(),
            api_prefix: default_api_prefix(),
            precache: default_precache(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Store names for the configured prefix and version.
    pub fn store_names(&self) -> StoreNames {
        StoreNames::new(&self.cache_prefix, &self.version)
    }

    /// The origin parsed as a URL.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if `origin` is not an absolute http(s) URL.
    pub fn origin_url(&self) -> Result<url::Url, ConfigError> {
        let parsed = url::Url::parse(&self.origin)
            .map_err(|e| ConfigError::Invalid { field: "origin".into(), reason: e.to_string() })?;

        match parsed.scheme() {
            "http" | "https" => Ok(parsed),
            scheme => Err(ConfigError::Invalid {
                field: "origin".into(),
                reason: format!("unsupported scheme: {scheme}"),
            }),
        }
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `MCP_OFFLINE_`
    /// 2. TOML file from `MCP_OFFLINE_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("MCP_OFFLINE_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("MCP_OFFLINE_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}
