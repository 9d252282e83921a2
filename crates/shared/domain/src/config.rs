use crate::user::DiscussionRole;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::net::{IpAddr, Ipv4Addr};
use std::ops::{Deref, DerefMut};
use std::path::PathBuf;
use std::sync::Arc;

/// Top-level API configuration shared across services.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfigInner {
    pub server: ServerConfig,
    pub discussion: DiscussionConfig,
    pub certificates: CertificatesConfig,
    pub toggles: TogglesConfig,
}

/// Thin Arc-wrapped config for inexpensive cloning into subsystems.
#[derive(Default, Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(flatten, default)]
    inner: Arc<ApiConfigInner>,
}

impl Deref for ApiConfig {
    type Target = ApiConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for ApiConfig {
    fn deref_mut(&mut self) -> &mut ApiConfigInner {
        Arc::make_mut(&mut self.inner)
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub address: IpAddr,
    pub port: u16,
    pub ssl: Option<SslConfig>,
}

/// TLS certificate/key paths.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SslConfig {
    pub cert: PathBuf,
    pub key: PathBuf,
}

/// Discussion (comments) service access and gate limits.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DiscussionConfig {
    /// Base URL of the comments service.
    pub service_url: String,
    /// Sent as `X-Edx-Api-Key` when present.
    pub api_key: Option<String>,
    pub timeout_seconds: u64,
    /// Largest request body the access gate will buffer.
    pub body_limit_bytes: usize,
    pub thread_cache_capacity: u64,
    pub thread_cache_ttl_seconds: u64,
    /// Courses served by the built-in catalog.
    pub courses: Vec<CourseSettings>,
    /// Forum role grants for the built-in role registry.
    pub roles: Vec<RoleGrant>,
}

/// One course as written in config. Blackouts use the raw course setting
/// shape: a list of `[start, end]` strings.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CourseSettings {
    pub key: String,
    pub display_name: String,
    pub discussion_blackouts: Vec<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RoleGrant {
    pub user: u64,
    pub course: String,
    pub roles: DiscussionRole,
}

/// Certificate task queue settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CertificatesConfig {
    pub retry_delay_seconds: u64,
    pub max_retries: u32,
    pub queue_capacity: usize,
}

/// Startup switch overrides keyed by full switch name (`namespace.name`).
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TogglesConfig {
    pub overrides: BTreeMap<String, bool>,
}

// --- Default ---

impl Default for ServerConfig {
    fn default() -> Self {
        Self { address: IpAddr::V4(Ipv4Addr::UNSPECIFIED), port: 4583, ssl: None }
    }
}

impl Default for SslConfig {
    fn default() -> Self {
        Self { cert: PathBuf::from("cert.pem"), key: PathBuf::from("key.pem") }
    }
}

impl Default for DiscussionConfig {
    fn default() -> Self {
        Self {
            service_url: "http://localhost:18080".to_owned(),
            api_key: None,
            timeout_seconds: 5,
            body_limit_bytes: 64 * 1024,
            thread_cache_capacity: 10_000,
            thread_cache_ttl_seconds: 300,
            courses: Vec::new(),
            roles: Vec::new(),
        }
    }
}

impl Default for CertificatesConfig {
    fn default() -> Self {
        Self { retry_delay_seconds: 30, max_retries: 2, queue_capacity: 1024 }
    }
}
