use crate::queue::TaskEnvelope;
use crate::task::GenerateCertificate;
use campus_derive::api_model;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::fmt::Display;
use std::sync::Arc;

/// A task that will not run again.
#[api_model]
#[derive(Clone, PartialEq)]
pub struct FailedTask {
    pub id: String,
    #[cfg_attr(feature = "server", schema(value_type = Object))]
    pub args: GenerateCertificate,
    /// Number of runs, including the first.
    pub attempts: u32,
    pub error: String,
    #[cfg_attr(feature = "server", schema(value_type = String, format = DateTime))]
    pub failed_at: DateTime<Utc>,
}

impl FailedTask {
    /// `envelope` is the last attempt that ran.
    #[must_use]
    pub fn new(envelope: &TaskEnvelope, error: impl Display) -> Self {
        Self {
            id: envelope.id.clone(),
            args: envelope.args.clone(),
            attempts: envelope.attempt + 1,
            error: error.to_string(),
            failed_at: Utc::now(),
        }
    }
}

/// Append-only record of permanently failed tasks, kept for inspection.
#[derive(Debug, Clone, Default)]
pub struct FailedTaskLedger {
    entries: Arc<RwLock<Vec<FailedTask>>>,
}

impl FailedTaskLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, task: FailedTask) {
        self.entries.write().push(task);
    }

    /// Oldest first.
    #[must_use]
    pub fn list(&self) -> Vec<FailedTask> {
        self.entries.read().clone()
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<FailedTask> {
        self.entries.read().iter().find(|task| task.id == id).cloned()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TaskError;
    use campus_domain::UserId;

    #[test]
    fn records_attempt_count_and_error_text() {
        let ledger = FailedTaskLedger::new();
        let envelope = TaskEnvelope::new(GenerateCertificate::new(3u64, "a/b/c")).next_attempt();
        let error = TaskError::NotFound { student: UserId(3), context: None };

        ledger.record(FailedTask::new(&envelope, &error));

        let stored = ledger.get(&envelope.id).unwrap();
        assert_eq!(stored.attempts, 2);
        assert_eq!(stored.error, "Student not found: 3");
        assert_eq!(stored.args, envelope.args);
        assert_eq!(ledger.len(), 1);
        assert!(ledger.get("missing").is_none());
    }

    #[test]
    fn clones_share_entries() {
        let ledger = FailedTaskLedger::new();
        let view = ledger.clone();
        let envelope = TaskEnvelope::new(GenerateCertificate::new(1u64, "a/b/c"));
        ledger.record(FailedTask::new(
            &envelope,
            &TaskError::NotFound { student: UserId(1), context: None },
        ));
        assert!(!view.is_empty());
    }
}
