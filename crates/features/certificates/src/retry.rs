use crate::error::TaskError;
use campus_domain::config::CertificatesConfig;
use std::time::Duration;

/// Fixed-delay retry with a cap on re-submissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub delay: Duration,
    /// Re-submissions after the first attempt.
    pub max_retries: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { delay: Duration::from_secs(30), max_retries: 2 }
    }
}

impl From<&CertificatesConfig> for RetryPolicy {
    fn from(config: &CertificatesConfig) -> Self {
        Self {
            delay: Duration::from_secs(config.retry_delay_seconds),
            max_retries: config.max_retries,
        }
    }
}

impl RetryPolicy {
    /// `attempt` is zero-based: the first run is attempt 0.
    #[must_use]
    pub const fn allows_retry(&self, attempt: u32, err: &TaskError) -> bool {
        err.is_retryable() && attempt < self.max_retries
    }
}
