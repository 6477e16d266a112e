//! Configuration for fourget-mcp
//!
//! There are two ways to build a [`Config`], and they fail differently:
//!
//! 1. Explicitly, via struct literal over [`Config::default`]. Out-of-range
//!    values are rejected by [`Config::validate`] with a [`ConfigError`].
//! 2. From the environment, via [`Config::from_env`]. A missing, malformed or
//!    below-minimum variable falls back to its default without error. The
//!    assembled config is still validated, so cross-field rules apply.

use std::time::Duration;

use thiserror::Error;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://4get.ca";
pub const DEFAULT_TIMEOUT_SECS: f64 = 20.0;
pub const DEFAULT_CACHE_TTL_SECS: f64 = 600.0;
pub const DEFAULT_CACHE_MAXSIZE: usize = 128;
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_RETRY_BASE_DELAY_SECS: f64 = 1.0;
pub const DEFAULT_RETRY_MAX_DELAY_SECS: f64 = 60.0;
pub const DEFAULT_CONNECTION_POOL_MAXSIZE: usize = 10;
pub const DEFAULT_CONNECTION_POOL_MAX_KEEPALIVE: usize = 5;

/// Configuration errors, each naming the offending field and value
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid base_url: {0}")]
    InvalidBaseUrl(String),
    #[error("base_url must use http or https scheme: {0}")]
    UnsupportedScheme(String),
    #[error("timeout must be positive: {0}")]
    Timeout(f64),
    #[error("cache_ttl must be non-negative: {0}")]
    CacheTtl(f64),
    #[error("cache_maxsize must be at least 1: {0}")]
    CacheMaxsize(usize),
    #[error("retry_base_delay must be positive: {0}")]
    RetryBaseDelay(f64),
    #[error("retry_max_delay must be positive: {0}")]
    RetryMaxDelay(f64),
    #[error("retry_base_delay ({base}) must not exceed retry_max_delay ({max})")]
    RetryDelayOrder { base: f64, max: f64 },
    #[error("connection_pool_maxsize must be at least 1: {0}")]
    PoolMaxsize(usize),
    #[error("connection_pool_max_keepalive must be at least 1: {0}")]
    PoolKeepalive(usize),
    #[error(
        "connection_pool_max_keepalive ({keepalive}) must not exceed connection_pool_maxsize ({maxsize})"
    )]
    PoolOrder { keepalive: usize, maxsize: usize },
    #[error("{field} is too large to represent as a duration: {value}")]
    DurationOverflow { field: &'static str, value: f64 },
}

/// Client configuration
///
/// Durations are kept as fractional seconds so that out-of-range input
/// (zero or negative) is representable and can be rejected by validation.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Base URL of the 4get instance, without trailing slash
    pub base_url: String,
    /// Optional pass token, sent as the `pass` cookie
    pub pass_token: Option<String>,
    /// User-Agent header value
    pub user_agent: String,
    /// Per-request timeout in seconds
    pub timeout_secs: f64,
    /// Cache entry lifetime in seconds; zero disables caching
    pub cache_ttl_secs: f64,
    /// Maximum number of cached responses
    pub cache_maxsize: usize,
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Backoff delay for the first retry, in seconds
    pub retry_base_delay_secs: f64,
    /// Upper bound on the backoff delay before jitter, in seconds
    pub retry_max_delay_secs: f64,
    /// Maximum concurrent upstream connections
    pub connection_pool_maxsize: usize,
    /// Maximum idle connections kept alive
    pub connection_pool_max_keepalive: usize,
}

pub fn default_user_agent() -> String {
    format!("fourget-mcp/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            pass_token: None,
            user_agent: default_user_agent(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            cache_maxsize: DEFAULT_CACHE_MAXSIZE,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_base_delay_secs: DEFAULT_RETRY_BASE_DELAY_SECS,
            retry_max_delay_secs: DEFAULT_RETRY_MAX_DELAY_SECS,
            connection_pool_maxsize: DEFAULT_CONNECTION_POOL_MAXSIZE,
            connection_pool_max_keepalive: DEFAULT_CONNECTION_POOL_MAX_KEEPALIVE,
        }
    }
}

impl Config {
    /// Load configuration from `FOURGET_*` environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup("FOURGET_BASE_URL")
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let user_agent = lookup("FOURGET_USER_AGENT")
            .filter(|ua| !ua.is_empty())
            .unwrap_or_else(default_user_agent);

        let config = Self {
            base_url,
            pass_token: lookup("FOURGET_PASS"),
            user_agent,
            timeout_secs: read_secs(&lookup, "FOURGET_TIMEOUT", DEFAULT_TIMEOUT_SECS, None),
            cache_ttl_secs: read_secs(&lookup, "FOURGET_CACHE_TTL", DEFAULT_CACHE_TTL_SECS, None),
            cache_maxsize: read_count(&lookup, "FOURGET_CACHE_MAXSIZE", DEFAULT_CACHE_MAXSIZE, 1),
            max_retries: read_count(&lookup, "FOURGET_MAX_RETRIES", DEFAULT_MAX_RETRIES, 0),
            retry_base_delay_secs: read_secs(
                &lookup,
                "FOURGET_RETRY_BASE_DELAY",
                DEFAULT_RETRY_BASE_DELAY_SECS,
                Some(0.1),
            ),
            retry_max_delay_secs: read_secs(
                &lookup,
                "FOURGET_RETRY_MAX_DELAY",
                DEFAULT_RETRY_MAX_DELAY_SECS,
                Some(1.0),
            ),
            connection_pool_maxsize: read_count(
                &lookup,
                "FOURGET_CONNECTION_POOL_MAXSIZE",
                DEFAULT_CONNECTION_POOL_MAXSIZE,
                1,
            ),
            connection_pool_max_keepalive: read_count(
                &lookup,
                "FOURGET_CONNECTION_POOL_MAX_KEEPALIVE",
                DEFAULT_CONNECTION_POOL_MAX_KEEPALIVE,
                1,
            ),
        };

        config.validate()?;
        Ok(config)
    }

    /// Check every field, returning the first violation found
    pub fn validate(&self) -> Result<(), ConfigError> {
        let parsed = Url::parse(&self.base_url)
            .map_err(|_| ConfigError::InvalidBaseUrl(self.base_url.clone()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::UnsupportedScheme(self.base_url.clone()));
        }
        if parsed.host_str().map_or(true, str::is_empty) {
            return Err(ConfigError::InvalidBaseUrl(self.base_url.clone()));
        }

        // Negated comparisons so that NaN is rejected too
        if !(self.timeout_secs > 0.0) || !self.timeout_secs.is_finite() {
            return Err(ConfigError::Timeout(self.timeout_secs));
        }
        if !(self.cache_ttl_secs >= 0.0) || !self.cache_ttl_secs.is_finite() {
            return Err(ConfigError::CacheTtl(self.cache_ttl_secs));
        }
        if self.cache_maxsize < 1 {
            return Err(ConfigError::CacheMaxsize(self.cache_maxsize));
        }
        if !(self.retry_base_delay_secs > 0.0) || !self.retry_base_delay_secs.is_finite() {
            return Err(ConfigError::RetryBaseDelay(self.retry_base_delay_secs));
        }
        if !(self.retry_max_delay_secs > 0.0) || !self.retry_max_delay_secs.is_finite() {
            return Err(ConfigError::RetryMaxDelay(self.retry_max_delay_secs));
        }
        for (field, value) in [
            ("timeout", self.timeout_secs),
            ("cache_ttl", self.cache_ttl_secs),
            ("retry_base_delay", self.retry_base_delay_secs),
            ("retry_max_delay", self.retry_max_delay_secs),
        ] {
            if !fits_duration(value) {
                return Err(ConfigError::DurationOverflow { field, value });
            }
        }
        if self.retry_base_delay_secs > self.retry_max_delay_secs {
            return Err(ConfigError::RetryDelayOrder {
                base: self.retry_base_delay_secs,
                max: self.retry_max_delay_secs,
            });
        }
        if self.connection_pool_maxsize < 1 {
            return Err(ConfigError::PoolMaxsize(self.connection_pool_maxsize));
        }
        if self.connection_pool_max_keepalive < 1 {
            return Err(ConfigError::PoolKeepalive(self.connection_pool_max_keepalive));
        }
        if self.connection_pool_max_keepalive > self.connection_pool_maxsize {
            return Err(ConfigError::PoolOrder {
                keepalive: self.connection_pool_max_keepalive,
                maxsize: self.connection_pool_maxsize,
            });
        }

        Ok(())
    }

    /// Per-request timeout. Saturates for values [`Config::validate`] rejects.
    pub fn timeout(&self) -> Duration {
        saturating_duration(self.timeout_secs)
    }

    /// Cache entry lifetime. Saturates for values [`Config::validate`] rejects.
    pub fn cache_ttl(&self) -> Duration {
        saturating_duration(self.cache_ttl_secs)
    }
}

fn fits_duration(secs: f64) -> bool {
    Duration::try_from_secs_f64(secs).is_ok()
}

/// Negative and NaN become zero, too-large values become `Duration::MAX`
pub(crate) fn saturating_duration(secs: f64) -> Duration {
    Duration::try_from_secs_f64(secs.max(0.0)).unwrap_or(Duration::MAX)
}

fn read_secs<F>(lookup: &F, name: &str, default: f64, minimum: Option<f64>) -> f64
where
    F: Fn(&str) -> Option<String>,
{
    let Some(value) = lookup(name)
        .and_then(|raw| raw.trim().parse::<f64>().ok())
        // Sign is left to validation; only magnitude must fit a Duration
        .filter(|v| fits_duration(v.abs()))
    else {
        return default;
    };
    match minimum {
        Some(min) if value < min => default,
        _ => value,
    }
}

fn read_count<F, T>(lookup: &F, name: &str, default: T, minimum: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr + PartialOrd,
{
    lookup(name)
        .and_then(|raw| raw.trim().parse::<T>().ok())
        .filter(|v| *v >= minimum)
        .unwrap_or(default)
}
