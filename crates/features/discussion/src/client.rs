//! Comments service access over HTTP, with a TTL cache in front.

use crate::error::DiscussionError;
use crate::ports::{ThreadInfo, ThreadService};
use async_trait::async_trait;
use campus_domain::config::DiscussionConfig;
use moka::future::Cache;
use reqwest::StatusCode;
use reqwest::header::{HeaderMap, HeaderValue};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Header the comments service authenticates callers with.
pub const API_KEY_HEADER: &str = "X-Edx-Api-Key";

/// Reads threads from `GET {service_url}/api/v1/threads/{id}`.
#[derive(Debug, Clone)]
pub struct HttpThreadService {
    client: reqwest::Client,
    base_url: String,
}

impl HttpThreadService {
    /// # Errors
    /// [`DiscussionError::Internal`] if the API key is not a valid header value
    /// or the HTTP client cannot be built.
    pub fn new(config: &DiscussionConfig) -> Result<Self, DiscussionError> {
        let mut default_headers = HeaderMap::new();
        if let Some(key) = &config.api_key {
            let mut value = HeaderValue::from_str(key).map_err(|e| DiscussionError::Internal {
                message: e.to_string().into(),
                context: Some("Invalid comments service API key".into()),
            })?;
            value.set_sensitive(true);
            default_headers.insert(API_KEY_HEADER, value);
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .default_headers(default_headers)
            .build()
            .map_err(|e| DiscussionError::Internal {
                message: e.to_string().into(),
                context: Some("Failed to build comments service client".into()),
            })?;

        Ok(Self { client, base_url: config.service_url.trim_end_matches('/').to_owned() })
    }

    fn thread_url(&self, thread_id: &str) -> String {
        format!("{}/api/v1/threads/{thread_id}?mark_as_read=false", self.base_url)
    }
}

/// Thread ids are opaque tokens; anything that could alter the request path
/// cannot name a thread.
fn is_valid_thread_id(thread_id: &str) -> bool {
    !thread_id.is_empty()
        && thread_id.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

fn upstream(err: &reqwest::Error, context: &'static str) -> DiscussionError {
    DiscussionError::Upstream { message: err.to_string().into(), context: Some(context.into()) }
}

#[async_trait]
impl ThreadService for HttpThreadService {
    async fn thread(&self, thread_id: &str) -> Result<Option<ThreadInfo>, DiscussionError> {
        if !is_valid_thread_id(thread_id) {
            debug!(thread_id, "Rejecting thread id with unexpected characters");
            return Ok(None);
        }

        let response = self
            .client
            .get(self.thread_url(thread_id))
            .send()
            .await
            .map_err(|e| upstream(&e, "Thread request failed"))?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => response
                .json::<ThreadInfo>()
                .await
                .map(Some)
                .map_err(|e| upstream(&e, "Unreadable thread response")),
            status => Err(DiscussionError::Upstream {
                message: format!("comments service answered {status}").into(),
                context: Some(thread_id.to_owned().into()),
            }),
        }
    }
}

/// Caches found threads. Misses and failures are not cached.
#[derive(Debug, Clone)]
pub struct CachedThreadService {
    inner: Arc<dyn ThreadService>,
    cache: Cache<String, ThreadInfo>,
}

impl CachedThreadService {
    #[must_use]
    pub fn new(inner: Arc<dyn ThreadService>, capacity: u64, ttl: Duration) -> Self {
        let cache = Cache::builder().max_capacity(capacity).time_to_live(ttl).build();
        Self { inner, cache }
    }

    #[must_use]
    pub fn from_config(inner: Arc<dyn ThreadService>, config: &DiscussionConfig) -> Self {
        Self::new(
            inner,
            config.thread_cache_capacity,
            Duration::from_secs(config.thread_cache_ttl_seconds),
        )
    }
}

#[async_trait]
impl ThreadService for CachedThreadService {
    async fn thread(&self, thread_id: &str) -> Result<Option<ThreadInfo>, DiscussionError> {
        let loaded = self
            .cache
            .try_get_with(thread_id.to_owned(), async {
                self.inner.thread(thread_id).await?.ok_or_else(|| {
                    DiscussionError::ThreadNotFound { thread_id: thread_id.to_owned(), context: None }
                })
            })
            .await
            .map_err(|e: Arc<DiscussionError>| {
                Arc::try_unwrap(e).unwrap_or_else(|arc| DiscussionError::Internal {
                    message: arc.to_string().into(),
                    context: Some("Cache loader returned an error, but it was shared (Arc)".into()),
                })
            });

        match loaded {
            Ok(info) => Ok(Some(info)),
            Err(DiscussionError::ThreadNotFound { .. }) => Ok(None),
            Err(err) => Err(err),
        }
    }
}
