//! Runtime settings for the review server and the admin CLI
//!
//! Values come from a YAML file (`config.yml` by default). Any key left out
//! keeps its built-in value, and `LOGBOOK_<SECTION>_<KEY>` environment
//! variables win over both.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";
const DEFAULT_DATABASE_URL: &str = "data/logbook.db";
const DEFAULT_CACHE_TTL_SECONDS: u64 = 60;
const DEFAULT_CACHE_CAPACITY: u64 = 1_000;
const DEFAULT_BASE_URL: &str = "http://localhost:8080";
const DEFAULT_TIMEOUT_SECONDS: u64 = 10;
const DEFAULT_STATS_STALE_SECONDS: u64 = 30;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    /// Server-side response cache
    pub cache: CacheConfig,
    /// Used by `logbook-review` only
    pub client: ClientConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Origin of the admin front end allowed through CORS
    pub cors_origin: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.into(),
            port: DEFAULT_PORT,
            cors_origin: DEFAULT_CORS_ORIGIN.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub driver: DatabaseDriver,
    /// File path or `sqlite:` URL for SQLite, `mysql://` URL for MySQL
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            driver: DatabaseDriver::Sqlite,
            url: DEFAULT_DATABASE_URL.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseDriver {
    #[default]
    Sqlite,
    Mysql,
}

impl FromStr for DatabaseDriver {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sqlite" => Ok(Self::Sqlite),
            "mysql" => Ok(Self::Mysql),
            other => Err(format!("unknown database driver: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub ttl_seconds: u64,
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: DEFAULT_CACHE_TTL_SECONDS,
            max_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Root of the review server; `/api/...` is appended to it
    pub base_url: String,
    pub timeout_seconds: u64,
    /// How long a fetched `adminStats` snapshot is served without refetching
    pub stats_stale_seconds: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            stats_stale_seconds: DEFAULT_STATS_STALE_SECONDS,
        }
    }
}

impl ClientConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn stats_stale_time(&self) -> Duration {
        Duration::from_secs(self.stats_stale_seconds)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Cannot read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config in {path} {detail}")]
    Parse { path: String, detail: String },
}

impl Config {
    /// Read `path`; a missing or blank file gives the defaults
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_yaml::from_str(&raw).map_err(|e| {
            let detail = match e.location() {
                Some(at) => format!("(line {}, column {}): {}", at.line(), at.column(), e),
                None => format!(": {}", e),
            };
            ConfigError::Parse {
                path: path.display().to_string(),
                detail,
            }
            .into()
        })
    }

    /// [`Config::load`] followed by `LOGBOOK_*` overrides
    ///
    /// Variables that fail to parse are ignored.
    pub fn load_with_env(path: &Path) -> anyhow::Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        override_from_env("LOGBOOK_SERVER_HOST", &mut self.server.host);
        override_from_env("LOGBOOK_SERVER_PORT", &mut self.server.port);
        override_from_env("LOGBOOK_SERVER_CORS_ORIGIN", &mut self.server.cors_origin);
        override_from_env("LOGBOOK_DATABASE_DRIVER", &mut self.database.driver);
        override_from_env("LOGBOOK_DATABASE_URL", &mut self.database.url);
        override_from_env("LOGBOOK_CACHE_TTL_SECONDS", &mut self.cache.ttl_seconds);
        override_from_env("LOGBOOK_CLIENT_BASE_URL", &mut self.client.base_url);
        override_from_env("LOGBOOK_CLIENT_TIMEOUT_SECONDS", &mut self.client.timeout_seconds);
        override_from_env(
            "LOGBOOK_CLIENT_STATS_STALE_SECONDS",
            &mut self.client.stats_stale_seconds,
        );
    }
}

fn override_from_env<T: FromStr>(key: &str, slot: &mut T) {
    let Ok(raw) = std::env::var(key) else {
        return;
    };
    match raw.parse() {
        Ok(value) => *slot = value,
        Err(_) => tracing::warn!(key, value = %raw, "Ignoring unparsable environment override"),
    }
}

#[cfg(test)]
static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
