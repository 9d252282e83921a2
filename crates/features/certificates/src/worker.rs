use crate::Certificates;
use crate::error::{CertificateError, CertificateErrorExt, TaskError};
use crate::ledger::{FailedTask, FailedTaskLedger};
use crate::queue::{PendingQueue, TaskEnvelope, TaskEvent};
use crate::retry::RetryPolicy;
use crate::task::CertificateTask;
use campus_event_bus::{EventBus, EventReceiverExt};
use std::fmt::Display;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, error, info, info_span, warn};

/// Single consumer of the certificate queue.
///
/// Tasks run one at a time. A retry is parked on its own timer so the loop
/// keeps draining the queue while it waits. A parked retry that never gets
/// to run again, because of shutdown or a closed queue, lands in the ledger.
#[derive(Debug)]
pub struct CertificateWorker {
    task: CertificateTask,
    policy: RetryPolicy,
    pending: PendingQueue,
    outcomes: Outcomes,
    receiver: mpsc::Receiver<Arc<TaskEnvelope>>,
    shutdown: CancellationToken,
}

impl CertificateWorker {
    /// Takes the consumer end of the queue. Only one worker can exist per bus.
    ///
    /// # Errors
    /// [`CertificateError::Queue`] if a worker already took the queue.
    pub fn new(
        slice: &Certificates,
        events: &EventBus,
        shutdown: CancellationToken,
    ) -> Result<Self, CertificateError> {
        let receiver = events
            .subscribe_mpsc::<TaskEnvelope>(slice.queue_capacity)
            .context("certificate worker")?;

        Ok(Self {
            task: slice.task.clone(),
            policy: slice.policy,
            pending: slice.queue.downgrade(),
            outcomes: Outcomes { ledger: slice.ledger.clone(), events: events.clone() },
            receiver,
            shutdown,
        })
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Drains the queue until shutdown or until the queue closes.
    ///
    /// The queue closes once every [`crate::CertificateQueue`] is dropped and
    /// the bus released its own sender with [`EventBus::shutdown`].
    pub async fn run(mut self) {
        info!(
            max_retries = self.policy.max_retries,
            delay_secs = self.policy.delay.as_secs(),
            "Certificate worker started"
        );

        loop {
            tokio::select! {
                biased;
                () = self.shutdown.cancelled() => break,
                next = self.receiver.recv_event() => match next {
                    Some(envelope) => self.process(&envelope).await,
                    None => break,
                },
            }
        }

        info!("Certificate worker stopped");
    }

    async fn process(&self, envelope: &TaskEnvelope) {
        let span = info_span!("certificate_task", task_id = %envelope.id, attempt = envelope.attempt);

        async {
            match self.task.run(&envelope.args).await {
                Ok(certificate) => {
                    info!(user = %certificate.student, course = %certificate.course_key, "Certificate generated");
                    self.outcomes.emit(TaskEvent::Succeeded {
                        task_id: envelope.id.clone(),
                        attempt: envelope.attempt,
                        certificate,
                    });
                },
                Err(err) if self.policy.allows_retry(envelope.attempt, &err) => {
                    self.schedule_retry(envelope, &err);
                },
                Err(err) => {
                    error!(attempts = envelope.attempt + 1, error = %err, "Certificate task failed permanently");
                    self.outcomes.fail(envelope, &err);
                },
            }
        }
        .instrument(span)
        .await;
    }

    fn schedule_retry(&self, envelope: &TaskEnvelope, err: &TaskError) {
        let next = envelope.next_attempt();
        let delay = self.policy.delay;
        info!(next_attempt = next.attempt, delay_secs = delay.as_secs(), "Retry scheduled");

        self.outcomes.emit(TaskEvent::Retrying {
            task_id: next.id.clone(),
            attempt: next.attempt,
            delay,
            reason: err.to_string(),
        });

        let ran = envelope.clone();
        let pending = self.pending.clone();
        let outcomes = self.outcomes.clone();
        let shutdown = self.shutdown.clone();
        tokio::spawn(async move {
            tokio::select! {
                () = shutdown.cancelled() => {
                    warn!(task_id = %ran.id, "Pending retry dropped on shutdown");
                    outcomes.fail(&ran, "retry dropped on shutdown");
                },
                () = tokio::time::sleep(delay) => {
                    if let Err(err) = pending.resubmit(next).await {
                        error!(task_id = %ran.id, error = %err, "Failed to re-submit certificate task");
                        outcomes.fail(&ran, &err);
                    }
                },
            }
        });
    }
}

/// Where terminal outcomes go: the failed-task ledger and the event bus.
#[derive(Debug, Clone)]
struct Outcomes {
    ledger: FailedTaskLedger,
    events: EventBus,
}

impl Outcomes {
    fn fail(&self, envelope: &TaskEnvelope, error: impl Display) {
        let record = FailedTask::new(envelope, error);
        let event = TaskEvent::Failed {
            task_id: record.id.clone(),
            attempts: record.attempts,
            error: record.error.clone(),
        };
        self.ledger.record(record);
        self.emit(event);
    }

    fn emit(&self, event: TaskEvent) {
        if let Err(err) = self.events.publish(event) {
            warn!(error = %err, "Task event not published");
        }
    }
}
