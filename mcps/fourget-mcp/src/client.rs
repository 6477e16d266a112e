//! Async HTTP client for the 4get API
//!
//! A search goes through four steps:
//!
//! 1. Build and normalize query parameters ([`QueryParams`]).
//! 2. Look the request up in the [`TtlCache`]; a hit returns immediately.
//! 3. Send `GET {base_url}/api/v1/{endpoint}`, retrying rate limits (429),
//!    connect failures and timeouts with exponential backoff.
//! 4. Check the JSON envelope's `status` field, cache the payload, return it.
//!
//! Concurrent identical misses are not coalesced; each issues its own request.

use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, COOKIE};
use reqwest::{Client, StatusCode};
use serde_json::{Map, Value};
use tokio::sync::Semaphore;

use crate::backoff::backoff_delay;
use crate::cache::TtlCache;
use crate::config::Config;
use crate::error::{FourGetError, FourGetResult};
use crate::params::{QueryParams, EXTENDED_SEARCH_PARAM};

const RATE_LIMITED: &str = "rate limited or invalid pass token";

/// 4get search endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Web,
    Images,
    News,
}

impl Endpoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            Endpoint::Web => "web",
            Endpoint::Images => "images",
            Endpoint::News => "news",
        }
    }
}

/// Optional inputs to a search call
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    /// Token from a previous response's `npt` field; replaces the query
    pub page_token: Option<String>,
    /// Extended web search. Only sent to the web endpoint.
    pub extended_search: Option<bool>,
    /// Extra query parameters, passed through after normalization
    pub params: Map<String, Value>,
}

impl SearchOptions {
    pub fn page(token: impl Into<String>) -> Self {
        Self {
            page_token: Some(token.into()),
            ..Self::default()
        }
    }
}

/// Client for the 4get meta-search API with caching and retries
#[derive(Debug, Clone)]
pub struct FourGetClient {
    config: Arc<Config>,
    cache: Arc<TtlCache>,
    http: Client,
    connections: Arc<Semaphore>,
}

impl FourGetClient {
    /// Create a client with its own cache sized from `config`
    pub fn new(config: Config) -> FourGetResult<Self> {
        config.validate()?;
        let cache = Arc::new(TtlCache::new(config.cache_ttl(), config.cache_maxsize));
        Self::with_cache(config, cache)
    }

    /// Create a client that stores responses in a shared cache
    ///
    /// The cache keeps its own TTL and size; `config.cache_ttl_secs` and
    /// `config.cache_maxsize` are validated but not applied to it.
    pub fn with_cache(config: Config, cache: Arc<TtlCache>) -> FourGetResult<Self> {
        config.validate()?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(token) = &config.pass_token {
            let cookie = HeaderValue::from_str(&format!("pass={}", token)).map_err(|_| {
                FourGetError::Client("pass token contains characters not allowed in a header".into())
            })?;
            headers.insert(COOKIE, cookie);
        }

        let http = Client::builder()
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .timeout(config.timeout())
            .pool_max_idle_per_host(config.connection_pool_max_keepalive)
            .build()?;

        let connections = Arc::new(Semaphore::new(config.connection_pool_maxsize));

        Ok(Self {
            config: Arc::new(config),
            cache,
            http,
            connections,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn cache(&self) -> &Arc<TtlCache> {
        &self.cache
    }

    /// Web search. Response carries `web`, and optionally `npt`, `answer`, `spelling`, `related`.
    pub async fn web_search(&self, query: &str, options: SearchOptions) -> FourGetResult<Value> {
        self.search(Endpoint::Web, query, options).await
    }

    /// Image search. Response carries `image` and optionally `npt`.
    pub async fn image_search(&self, query: &str, options: SearchOptions) -> FourGetResult<Value> {
        self.search(Endpoint::Images, query, options).await
    }

    /// News search. Response carries `news` and optionally `npt`.
    pub async fn news_search(&self, query: &str, options: SearchOptions) -> FourGetResult<Value> {
        self.search(Endpoint::News, query, options).await
    }

    /// Search any endpoint, returning the upstream envelope unmodified
    pub async fn search(
        &self,
        endpoint: Endpoint,
        query: &str,
        options: SearchOptions,
    ) -> FourGetResult<Value> {
        let mut params =
            QueryParams::for_search(query, options.page_token.as_deref(), &options.params);
        if endpoint == Endpoint::Web {
            if let Some(extended) = options.extended_search {
                params.set(EXTENDED_SEARCH_PARAM, if extended { "true" } else { "false" });
            }
        }

        let key = params.cache_key(endpoint.as_str());
        if let Some(cached) = self.cache.get(&key).await {
            tracing::debug!(endpoint = endpoint.as_str(), "cache hit");
            return Ok(cached);
        }
        tracing::debug!(endpoint = endpoint.as_str(), "cache miss");

        let payload = self.request(endpoint, &params).await?;
        self.cache.set(key, payload.clone()).await;
        Ok(payload)
    }

    async fn request(&self, endpoint: Endpoint, params: &QueryParams) -> FourGetResult<Value> {
        let url = format!("{}/api/v1/{}", self.config.base_url, endpoint.as_str());
        let max_retries = self.config.max_retries;
        let mut last_error = None;

        for attempt in 0..=max_retries {
            match self.send_once(&url, params).await {
                Ok(payload) => return Ok(payload),
                Err(e) if e.is_retryable() && attempt < max_retries => {
                    let delay = backoff_delay(
                        attempt,
                        self.config.retry_base_delay_secs,
                        self.config.retry_max_delay_secs,
                    );
                    tracing::warn!(
                        endpoint = endpoint.as_str(),
                        attempt = attempt + 1,
                        max_attempts = max_retries + 1,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "retrying 4get request"
                    );
                    last_error = Some(e);
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error
            .unwrap_or_else(|| FourGetError::Client("retry loop ended without a result".into())))
    }

    async fn send_once(&self, url: &str, params: &QueryParams) -> FourGetResult<Value> {
        let _permit = self
            .connections
            .acquire()
            .await
            .map_err(|_| FourGetError::Client("connection limiter closed".into()))?;

        let response = self.http.get(url).query(params.pairs()).send().await?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(FourGetError::Auth(RATE_LIMITED.to_string()));
        }
        if !status.is_success() {
            return Err(FourGetError::HttpStatus {
                status: status.as_u16(),
                url: response.url().to_string(),
            });
        }

        let body = response.bytes().await?;
        let payload: Value = serde_json::from_slice(&body)?;
        check_envelope(payload)
    }
}

/// Accept an envelope whose `status` is "ok", rejecting anything else
pub fn check_envelope(payload: Value) -> FourGetResult<Value> {
    let status = match payload.get("status") {
        None | Some(Value::Null) => {
            return Err(FourGetError::Client(
                "missing 'status' field in 4get response".into(),
            ))
        }
        Some(status) => status,
    };

    if status.as_str() == Some("ok") {
        return Ok(payload);
    }

    let message = ["message", "error", "detail"]
        .iter()
        .filter_map(|field| payload.get(*field))
        .find(|value| !value.is_null())
        .map(json_text);

    Err(FourGetError::Api {
        status: json_text(status),
        message,
    })
}

fn json_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
