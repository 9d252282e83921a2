use crate::error::{CertificateError, CertificateErrorExt};
use crate::ports::GeneratedCertificate;
use crate::task::GenerateCertificate;
use campus_event_bus::EventBus;
use campus_kernel::safe_nanoid;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::info;

/// A queued task run. Retries carry the original arguments with a bumped
/// attempt counter.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskEnvelope {
    pub id: String,
    pub attempt: u32,
    pub args: GenerateCertificate,
}

impl TaskEnvelope {
    #[must_use]
    pub fn new(args: GenerateCertificate) -> Self {
        Self { id: safe_nanoid!(), attempt: 0, args }
    }

    #[must_use]
    pub fn next_attempt(&self) -> Self {
        Self { id: self.id.clone(), attempt: self.attempt + 1, args: self.args.clone() }
    }
}

/// Task outcomes broadcast on the event bus.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskEvent {
    Succeeded { task_id: String, attempt: u32, certificate: GeneratedCertificate },
    /// `attempt` is the attempt that will run after `delay`.
    Retrying { task_id: String, attempt: u32, delay: Duration, reason: String },
    Failed { task_id: String, attempts: u32, error: String },
}

impl TaskEvent {
    #[must_use]
    pub fn task_id(&self) -> &str {
        match self {
            Self::Succeeded { task_id, .. }
            | Self::Retrying { task_id, .. }
            | Self::Failed { task_id, .. } => task_id,
        }
    }
}

/// Producer side of the certificate work queue.
#[derive(Debug, Clone)]
pub struct CertificateQueue {
    sender: mpsc::Sender<Arc<TaskEnvelope>>,
}

impl CertificateQueue {
    /// # Errors
    /// [`CertificateError::Queue`] if the bus already uses the envelope type
    /// for something else or `capacity` is zero.
    pub fn new(events: &EventBus, capacity: usize) -> Result<Self, CertificateError> {
        let sender = events
            .mpsc_sender_with_capacity::<TaskEnvelope>(capacity)
            .context("certificate queue")?;
        Ok(Self { sender })
    }

    /// Queues a first attempt and returns its task id. Never waits.
    ///
    /// # Errors
    /// [`CertificateError::QueueFull`] when at capacity,
    /// [`CertificateError::QueueClosed`] once the worker is gone.
    pub fn enqueue(&self, args: GenerateCertificate) -> Result<String, CertificateError> {
        let envelope = TaskEnvelope::new(args);
        let id = envelope.id.clone();

        self.sender.try_send(Arc::new(envelope)).map_err(|err| match err {
            mpsc::error::TrySendError::Full(_) => CertificateError::QueueFull {
                message: "no capacity left".into(),
                context: Some(id.clone().into()),
            },
            mpsc::error::TrySendError::Closed(_) => CertificateError::QueueClosed {
                message: "worker stopped".into(),
                context: Some(id.clone().into()),
            },
        })?;

        info!(task_id = %id, "Certificate task queued");
        Ok(id)
    }

    /// A handle that does not keep the queue open on its own.
    pub(crate) fn downgrade(&self) -> PendingQueue {
        PendingQueue { sender: self.sender.downgrade() }
    }
}

/// Re-submission handle held by parked retries.
///
/// The queue closes once every [`CertificateQueue`] is dropped, even while
/// retries are still waiting on their timers.
#[derive(Debug, Clone)]
pub(crate) struct PendingQueue {
    sender: mpsc::WeakSender<Arc<TaskEnvelope>>,
}

impl PendingQueue {
    pub(crate) async fn resubmit(&self, envelope: TaskEnvelope) -> Result<(), CertificateError> {
        let closed = |id: String| CertificateError::QueueClosed {
            message: "no producers left".into(),
            context: Some(id.into()),
        };

        let Some(sender) = self.sender.upgrade() else {
            return Err(closed(envelope.id));
        };
        let id = envelope.id.clone();
        sender.send(Arc::new(envelope)).await.map_err(|_| closed(id))
    }
}
