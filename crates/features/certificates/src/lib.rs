//! Certificate generation as a queued background task.
//!
//! [`CertificateTask`] performs one attempt: resolve the student, parse the
//! course key, re-check the verification status when the caller expected a
//! particular one, then hand off to the generator. A status mismatch is the
//! only retryable outcome; [`CertificateWorker`] re-queues such tasks with
//! their original arguments after the [`RetryPolicy`] delay and records
//! anything it gives up on in the [`FailedTaskLedger`].

mod error;
#[cfg(feature = "server")]
mod handlers;
mod ledger;
pub mod memory;
mod ports;
mod queue;
mod retry;
mod task;
mod worker;

pub use error::{
    CertificateError, CertificateErrorExt, ServiceError, ServiceErrorExt, TaskError, TaskErrorExt,
};
#[cfg(feature = "server")]
pub use handlers::{TaskAccepted, router};
pub use ledger::{FailedTask, FailedTaskLedger};
pub use ports::{
    CertificateGenerator, CertificateRequest, GeneratedCertificate, Student, UserDirectory,
    VerificationService,
};
pub use queue::{CertificateQueue, TaskEnvelope, TaskEvent};
pub use retry::RetryPolicy;
pub use task::{CertificateTask, GenerateCertificate};
pub use worker::CertificateWorker;

use campus_domain::config::CertificatesConfig;
use campus_event_bus::EventBus;
use campus_kernel::domain::registry::InitializedSlice;

/// Certificates feature state
#[campus_derive::campus_slice]
pub struct Certificates {
    pub queue: CertificateQueue,
    pub ledger: FailedTaskLedger,
    pub policy: RetryPolicy,
    pub task: CertificateTask,
    pub queue_capacity: usize,
}

/// Builds the slice state: queue producer, ledger and retry policy.
///
/// # Errors
/// [`CertificateError::Queue`] when the queue cannot be created on `events`.
pub fn build(
    config: &CertificatesConfig,
    events: &EventBus,
    task: CertificateTask,
) -> Result<Certificates, CertificateError> {
    let queue = CertificateQueue::new(events, config.queue_capacity)?;

    Ok(Certificates::new(CertificatesInner {
        queue,
        ledger: FailedTaskLedger::new(),
        policy: RetryPolicy::from(config),
        task,
        queue_capacity: config.queue_capacity,
    }))
}

/// Initialize the certificates feature. The worker is started separately
/// with [`CertificateWorker::new`].
///
/// # Errors
/// See [`build`].
pub fn init(
    config: &CertificatesConfig,
    events: &EventBus,
    task: CertificateTask,
) -> Result<InitializedSlice, CertificateError> {
    let slice = build(config, events, task)?;
    tracing::info!(
        queue_capacity = slice.queue_capacity,
        max_retries = slice.policy.max_retries,
        "Certificates slice initialized"
    );
    Ok(InitializedSlice::new(slice))
}
