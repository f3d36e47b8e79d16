//! HTTP fetching with throttling and optional on-disk caching.
//!
//! Every remote call in the crate goes through a `Fetcher`. Requests are
//! spaced by a `Throttle`; responses can be kept under a cache directory so
//! immutable documents (replay logs) are only downloaded once across runs.

mod throttle;

pub use throttle::Throttle;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tokio::fs;
use tracing::debug;
use url::Url;

/// Errors that can occur during fetching.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Rate limited by {host}, retry after {retry_after_secs}s")]
    RateLimited { host: String, retry_after_secs: u64 },

    #[error("HTTP {status}: {message}")]
    HttpStatus { status: u16, message: String },

    #[error("Content too large: {size} bytes (max {max_size})")]
    ContentTooLarge { size: usize, max_size: usize },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Response missing field: {0}")]
    MissingField(String),
}

impl FetchError {
    /// True for an HTTP 404 from the remote service.
    pub fn is_not_found(&self) -> bool {
        matches!(self, FetchError::HttpStatus { status: 404, .. })
    }
}

/// Metadata stored alongside cached content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheMetadata {
    pub url: String,
    pub fetched_at: DateTime<Utc>,
    pub content_type: Option<String>,
    pub content_length: usize,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Configuration for the HTTP fetcher.
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    /// Directory to cache responses in (None disables caching)
    pub cache_dir: Option<PathBuf>,

    /// How long cached content is considered fresh
    pub cache_ttl: Duration,

    /// Maximum content size to fetch
    pub max_content_size: usize,

    /// Request timeout
    pub timeout: Duration,

    /// User agent string
    pub user_agent: String,

    /// Minimum delay between consecutive network requests
    pub request_delay: Duration,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            cache_dir: None,
            cache_ttl: Duration::from_secs(24 * 3600),
            max_content_size: 20 * 1024 * 1024, // 20MB
            timeout: Duration::from_secs(20),
            user_agent: concat!("showdown-teams/", env!("CARGO_PKG_VERSION")).to_string(),
            request_delay: Duration::from_millis(300),
        }
    }
}

/// Throttled HTTP fetcher with optional local caching.
#[derive(Clone)]
pub struct Fetcher {
    client: Client,
    config: FetcherConfig,
    throttle: Arc<Throttle>,
}

impl Fetcher {
    /// Create a new fetcher with the given configuration.
    pub fn new(config: FetcherConfig) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .unwrap_or_else(|_| HeaderValue::from_static("showdown-teams")),
        );

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()?;

        let throttle = Arc::new(Throttle::new(config.request_delay));
        Ok(Self {
            client,
            config,
            throttle,
        })
    }

    /// Create a fetcher with default configuration.
    pub fn with_defaults() -> Result<Self, FetchError> {
        Self::new(FetcherConfig::default())
    }

    /// A fetcher sharing this one's HTTP client but with its own throttle.
    pub fn with_request_delay(&self, delay: Duration) -> Self {
        let mut config = self.config.clone();
        config.request_delay = delay;
        Self {
            client: self.client.clone(),
            config,
            throttle: Arc::new(Throttle::new(delay)),
        }
    }

    pub fn config(&self) -> &FetcherConfig {
        &self.config
    }

    /// Fetch a URL as text, using the cache if available and fresh.
    pub async fn fetch_text(&self, url: &Url) -> Result<String, FetchError> {
        if let Some(text) = self.read_cache(url).await? {
            return Ok(text);
        }
        self.fetch_text_fresh(url).await
    }

    /// Fetch a URL from the network, ignoring (but refreshing) the cache.
    pub async fn fetch_text_fresh(&self, url: &Url) -> Result<String, FetchError> {
        let (text, content_type) = self.download(url).await?;
        if self.config.cache_dir.is_some() {
            self.write_cache(url, &text, content_type).await?;
        }
        Ok(text)
    }

    /// Fetch and decode a JSON document, using the cache.
    pub async fn get_json<T: DeserializeOwned>(&self, url: &Url) -> Result<T, FetchError> {
        let text = self.fetch_text(url).await?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Fetch and decode a JSON document straight from the network.
    pub async fn get_json_fresh<T: DeserializeOwned>(&self, url: &Url) -> Result<T, FetchError> {
        let text = self.fetch_text_fresh(url).await?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Throttled network request.
    async fn download(&self, url: &Url) -> Result<(String, Option<String>), FetchError> {
        self.throttle.acquire().await;
        debug!("Fetching {}", url);

        let response = self.client.get(url.as_str()).send().await?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);

            return Err(FetchError::RateLimited {
                host: url.host_str().unwrap_or("unknown").to_string(),
                retry_after_secs: retry_after,
            });
        }

        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let content = response.bytes().await?;
        if content.len() > self.config.max_content_size {
            return Err(FetchError::ContentTooLarge {
                size: content.len(),
                max_size: self.config.max_content_size,
            });
        }

        Ok((String::from_utf8_lossy(&content).into_owned(), content_type))
    }

    /// Return cached content for a URL if present and fresh.
    async fn read_cache(&self, url: &Url) -> Result<Option<String>, FetchError> {
        let (Some(cache_path), Some(meta_path)) =
            (self.cache_path_for_url(url), self.meta_path_for_url(url))
        else {
            return Ok(None);
        };

        if !cache_path.exists() || !meta_path.exists() {
            return Ok(None);
        }

        let meta_content = fs::read_to_string(&meta_path).await?;
        let meta: CacheMetadata = match serde_json::from_str(&meta_content) {
            Ok(m) => m,
            Err(_) => return Ok(None),
        };

        let age = Utc::now().signed_duration_since(meta.fetched_at);
        if age.num_seconds() > self.config.cache_ttl.as_secs() as i64 {
            debug!("Cache expired for {}", url);
            return Ok(None);
        }

        debug!("Serving {} from cache", url);
        Ok(Some(fs::read_to_string(&cache_path).await?))
    }

    async fn write_cache(
        &self,
        url: &Url,
        content: &str,
        content_type: Option<String>,
    ) -> Result<(), FetchError> {
        let (Some(cache_path), Some(meta_path)) =
            (self.cache_path_for_url(url), self.meta_path_for_url(url))
        else {
            return Ok(());
        };

        if let Some(parent) = cache_path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&cache_path, content).await?;

        let fetched_at = Utc::now();
        let meta = CacheMetadata {
            url: url.to_string(),
            fetched_at,
            content_type,
            content_length: content.len(),
            expires_at: Some(
                fetched_at + chrono::Duration::seconds(self.config.cache_ttl.as_secs() as i64),
            ),
        };
        fs::write(&meta_path, serde_json::to_string_pretty(&meta)?).await?;

        debug!("Cached {} at {}", url, cache_path.display());
        Ok(())
    }

    /// Cache path for a URL, if caching is enabled.
    fn cache_path_for_url(&self, url: &Url) -> Option<PathBuf> {
        let dir = self.config.cache_dir.as_ref()?;
        let host = url.host_str().unwrap_or("unknown");
        Some(dir.join(host).join(format!(
            "{}.{}",
            Self::url_hash(url),
            Self::extension_for_url(url)
        )))
    }

    fn meta_path_for_url(&self, url: &Url) -> Option<PathBuf> {
        let dir = self.config.cache_dir.as_ref()?;
        let host = url.host_str().unwrap_or("unknown");
        Some(dir.join(host).join(format!("{}.meta.json", Self::url_hash(url))))
    }

    /// Hash a URL to a short string.
    fn url_hash(url: &Url) -> String {
        let mut hasher = Sha256::new();
        hasher.update(url.as_str().as_bytes());
        let result = hasher.finalize();
        hex::encode(&result[..8])
    }

    fn extension_for_url(url: &Url) -> &'static str {
        let path = url.path().to_lowercase();
        if path.ends_with(".html") {
            "html"
        } else if path.ends_with(".txt") || path.ends_with(".log") {
            "txt"
        } else {
            "json"
        }
    }
}

/// Join path segments onto a base URL, keeping any path the base already has.
pub fn endpoint(base: &str, segments: &[&str]) -> Result<Url, FetchError> {
    let mut url = Url::parse(base)
        .map_err(|e| FetchError::InvalidUrl(format!("{}: {}", base, e)))?;
    url.path_segments_mut()
        .map_err(|_| FetchError::InvalidUrl(format!("{} cannot be a base", base)))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}
