//! Environment-backed configuration.
//!
//! Every setting has a default. Override with `FACTMATCH_*` environment
//! variables, optionally loaded from an env file first (see [`load_env_file`]).

pub mod error;


pub use error::ConfigError;

use std::env;
use std::net::IpAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::cache::CacheConfig;
use crate::constants::{
    DEFAULT_CORPUS_TABLES, DEFAULT_DB_MAX_CONNECTIONS, DEFAULT_EMBED_TIMEOUT_MS,
    DEFAULT_MEMO_CAPACITY, DEFAULT_RELOAD_BACKOFF_SECS, DEFAULT_STORE_TIMEOUT_MS,
    DEFAULT_STUB_DIM, PRIMARY_THRESHOLD, SECONDARY_THRESHOLD,
};
use crate::corpus::is_valid_table_name;
use crate::embedding::EmbedderConfig;
use crate::matching::MatcherConfig;

/// Server configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `FACTMATCH_*` overrides on top of defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port. Default: `8080`.
    pub port: u16,

    /// IP address to bind to. Default: `127.0.0.1`.
    pub bind_addr: IpAddr,

    /// fastText `.vec` file. Unset runs the stub embedder.
    pub model_path: Option<PathBuf>,

    /// Cap on vocabulary rows read from the model file.
    pub model_max_words: Option<usize>,

    /// Stub embedder dimension. Default: `300`.
    pub stub_dim: usize,

    /// MySQL URL of the corpus database.
    pub database_url: String,

    /// Corpus pool size. Default: `5`.
    pub db_max_connections: u32,

    /// Source tables unioned into the corpus. Default: `sms_tfc,sms_mgp`.
    pub corpus_tables: Vec<String>,

    /// Redis URL of the freshness store.
    pub redis_url: String,

    pub primary_threshold: f32,
    pub secondary_threshold: f32,

    /// Timeout for each corpus or freshness store call.
    pub store_timeout: Duration,

    /// Timeout for embedding one query.
    pub embed_timeout: Duration,

    /// Minimum delay between failed corpus loads.
    pub reload_backoff: Duration,

    /// Match memo entries; `0` disables the memo. Default: `10_000`.
    pub memo_capacity: u64,
}

/// Default corpus database URL used when `FACTMATCH_DATABASE_URL` is not set.
pub const DEFAULT_DATABASE_URL: &str = "mysql://root@127.0.0.1:3306/factcheck";

/// Default Redis URL used when `FACTMATCH_REDIS_URL` is not set.
pub const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379/";

/// Env file read by [`load_env_file`] unless `FACTMATCH_ENV_FILE` names another.
pub const DEFAULT_ENV_FILE: &str = "conf/env";

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            bind_addr: IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
            model_path: None,
            model_max_words: None,
            stub_dim: DEFAULT_STUB_DIM,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            db_max_connections: DEFAULT_DB_MAX_CONNECTIONS,
            corpus_tables: DEFAULT_CORPUS_TABLES.iter().map(|t| t.to_string()).collect(),
            redis_url: DEFAULT_REDIS_URL.to_string(),
            primary_threshold: PRIMARY_THRESHOLD,
            secondary_threshold: SECONDARY_THRESHOLD,
            store_timeout: Duration::from_millis(DEFAULT_STORE_TIMEOUT_MS),
            embed_timeout: Duration::from_millis(DEFAULT_EMBED_TIMEOUT_MS),
            reload_backoff: Duration::from_secs(DEFAULT_RELOAD_BACKOFF_SECS),
            memo_capacity: DEFAULT_MEMO_CAPACITY,
        }
    }
}

/// Loads `FACTMATCH_ENV_FILE` (or `conf/env`) into the process environment.
///
/// Variables already set win. Returns the file that was loaded, if any.
pub fn load_env_file() -> Option<PathBuf> {
    let path = env::var("FACTMATCH_ENV_FILE")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_ENV_FILE));

    if !path.is_file() {
        return None;
    }
    dotenvy::from_path(&path).ok().map(|_| path)
}

/// URL the `--health-check` probe hits: the local `/health-check` on `FACTMATCH_PORT`.
///
/// A missing or unparseable port falls back to the default; the probe must not fail on config.
pub fn health_check_url() -> String {
    let port = env::var(Config::ENV_PORT)
        .ok()
        .and_then(|p| p.trim().parse::<u16>().ok())
        .filter(|&p| p != 0)
        .unwrap_or_else(|| Config::default().port);

    format!("http://127.0.0.1:{}/health-check", port)
}

impl Config {
    const ENV_PORT: &'static str = "FACTMATCH_PORT";
    const ENV_BIND_ADDR: &'static str = "FACTMATCH_BIND_ADDR";
    const ENV_MODEL_PATH: &'static str = "FACTMATCH_MODEL_PATH";
    const ENV_MODEL_MAX_WORDS: &'static str = "FACTMATCH_MODEL_MAX_WORDS";
    const ENV_STUB_DIM: &'static str = "FACTMATCH_STUB_DIM";
    const ENV_DATABASE_URL: &'static str = "FACTMATCH_DATABASE_URL";
    const ENV_DB_MAX_CONNECTIONS: &'static str = "FACTMATCH_DB_MAX_CONNECTIONS";
    const ENV_CORPUS_TABLES: &'static str = "FACTMATCH_CORPUS_TABLES";
    const ENV_REDIS_URL: &'static str = "FACTMATCH_REDIS_URL";
    const ENV_PRIMARY_THRESHOLD: &'static str = "FACTMATCH_PRIMARY_THRESHOLD";
    const ENV_SECONDARY_THRESHOLD: &'static str = "FACTMATCH_SECONDARY_THRESHOLD";
    const ENV_STORE_TIMEOUT_MS: &'static str = "FACTMATCH_STORE_TIMEOUT_MS";
    const ENV_EMBED_TIMEOUT_MS: &'static str = "FACTMATCH_EMBED_TIMEOUT_MS";
    const ENV_RELOAD_BACKOFF_SECS: &'static str = "FACTMATCH_RELOAD_BACKOFF_SECS";
    const ENV_MEMO_CAPACITY: &'static str = "FACTMATCH_MEMO_CAPACITY";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = Self::parse_port_from_env(defaults.port)?;
        let bind_addr = Self::parse_bind_addr_from_env(defaults.bind_addr)?;
        let model_path = Self::parse_optional_path_from_env(Self::ENV_MODEL_PATH);
        let model_max_words = Self::parse_optional_from_env(Self::ENV_MODEL_MAX_WORDS)?;
        let stub_dim = Self::parse_from_env(Self::ENV_STUB_DIM, defaults.stub_dim)?;
        let database_url = Self::parse_string_from_env(Self::ENV_DATABASE_URL, defaults.database_url);
        let db_max_connections =
            Self::parse_from_env(Self::ENV_DB_MAX_CONNECTIONS, defaults.db_max_connections)?;
        let corpus_tables = Self::parse_list_from_env(Self::ENV_CORPUS_TABLES, defaults.corpus_tables);
        let redis_url = Self::parse_string_from_env(Self::ENV_REDIS_URL, defaults.redis_url);
        let primary_threshold =
            Self::parse_from_env(Self::ENV_PRIMARY_THRESHOLD, defaults.primary_threshold)?;
        let secondary_threshold =
            Self::parse_from_env(Self::ENV_SECONDARY_THRESHOLD, defaults.secondary_threshold)?;
        let store_timeout = Duration::from_millis(Self::parse_from_env(
            Self::ENV_STORE_TIMEOUT_MS,
            defaults.store_timeout.as_millis() as u64,
        )?);
        let embed_timeout = Duration::from_millis(Self::parse_from_env(
            Self::ENV_EMBED_TIMEOUT_MS,
            defaults.embed_timeout.as_millis() as u64,
        )?);
        let reload_backoff = Duration::from_secs(Self::parse_from_env(
            Self::ENV_RELOAD_BACKOFF_SECS,
            defaults.reload_backoff.as_secs(),
        )?);
        let memo_capacity = Self::parse_from_env(Self::ENV_MEMO_CAPACITY, defaults.memo_capacity)?;

        Ok(Self {
            port,
            bind_addr,
            model_path,
            model_max_words,
            stub_dim,
            database_url,
            db_max_connections,
            corpus_tables,
            redis_url,
            primary_threshold,
            secondary_threshold,
            store_timeout,
            embed_timeout,
            reload_backoff,
            memo_capacity,
        })
    }

    /// Validates paths and basic invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let in_range = |t: f32| (0.0..=1.0).contains(&t);
        if !in_range(self.primary_threshold) || !in_range(self.secondary_threshold) {
            return Err(self.threshold_error("thresholds must be within [0, 1]"));
        }
        if self.secondary_threshold > self.primary_threshold {
            return Err(self.threshold_error("secondary must not exceed primary"));
        }

        if self.corpus_tables.is_empty() {
            return Err(ConfigError::InvalidTable {
                name: String::new(),
            });
        }
        if let Some(bad) = self.corpus_tables.iter().find(|t| !is_valid_table_name(t)) {
            return Err(ConfigError::InvalidTable { name: bad.clone() });
        }

        for (name, value) in [
            (Self::ENV_STORE_TIMEOUT_MS, self.store_timeout),
            (Self::ENV_EMBED_TIMEOUT_MS, self.embed_timeout),
        ] {
            if value.is_zero() {
                return Err(ConfigError::InvalidValue {
                    name,
                    value: "0".to_string(),
                    reason: "timeout must be greater than zero".to_string(),
                });
            }
        }

        if self.db_max_connections == 0 {
            return Err(ConfigError::InvalidValue {
                name: Self::ENV_DB_MAX_CONNECTIONS,
                value: "0".to_string(),
                reason: "pool needs at least one connection".to_string(),
            });
        }

        if let Some(ref path) = self.model_path {
            if !path.exists() {
                return Err(ConfigError::PathNotFound { path: path.clone() });
            }
            if !path.is_file() {
                return Err(ConfigError::NotAFile { path: path.clone() });
            }
        } else if self.stub_dim == 0 {
            return Err(ConfigError::InvalidValue {
                name: Self::ENV_STUB_DIM,
                value: "0".to_string(),
                reason: "stub dimension must be greater than zero".to_string(),
            });
        }

        Ok(())
    }

    /// Returns `"{bind_addr}:{port}"` (useful for logging/binding).
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    /// Embedder settings; no model path means stub mode.
    pub fn embedder_config(&self) -> EmbedderConfig {
        match self.model_path.as_deref() {
            Some(path) => EmbedderConfig::new(path).max_words(self.model_max_words),
            None => EmbedderConfig::stub().stub_dim(self.stub_dim),
        }
    }

    pub fn matcher_config(&self) -> MatcherConfig {
        MatcherConfig {
            primary_threshold: self.primary_threshold,
            secondary_threshold: self.secondary_threshold,
        }
    }

    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig {
            store_timeout: self.store_timeout,
            reload_backoff: self.reload_backoff,
        }
    }

    fn threshold_error(&self, reason: &'static str) -> ConfigError {
        ConfigError::InvalidThresholds {
            primary: self.primary_threshold,
            secondary: self.secondary_threshold,
            reason,
        }
    }

    fn parse_port_from_env(default: u16) -> Result<u16, ConfigError> {
        match env::var(Self::ENV_PORT) {
            Ok(value) => {
                let port: u16 = value.parse().map_err(|e| ConfigError::PortParseError {
                    value: value.clone(),
                    source: e,
                })?;

                if port == 0 {
                    return Err(ConfigError::InvalidPort { value });
                }

                Ok(port)
            }
            Err(_) => Ok(default),
        }
    }

    fn parse_bind_addr_from_env(default: IpAddr) -> Result<IpAddr, ConfigError> {
        match env::var(Self::ENV_BIND_ADDR) {
            Ok(value) => value
                .parse()
                .map_err(|e| ConfigError::InvalidBindAddr { value, source: e }),
            Err(_) => Ok(default),
        }
    }

    fn parse_optional_path_from_env(var_name: &str) -> Option<PathBuf> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
    }

    fn parse_string_from_env(var_name: &str, default: String) -> String {
        env::var(var_name).unwrap_or(default)
    }

    fn parse_list_from_env(var_name: &str, default: Vec<String>) -> Vec<String> {
        match env::var(var_name) {
            Ok(value) => value
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect(),
            Err(_) => default,
        }
    }

    fn parse_from_env<T>(var_name: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        Ok(Self::parse_optional_from_env(var_name)?.unwrap_or(default))
    }

    fn parse_optional_from_env<T>(var_name: &'static str) -> Result<Option<T>, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        let Ok(value) = env::var(var_name) else {
            return Ok(None);
        };
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        trimmed
            .parse()
            .map(Some)
            .map_err(|e: T::Err| ConfigError::InvalidValue {
                name: var_name,
                value: value.clone(),
                reason: e.to_string(),
            })
    }
}
