//! In-process port implementations for wiring without external systems.

use crate::error::ServiceError;
use crate::ports::{
    CertificateGenerator, CertificateRequest, GeneratedCertificate, Student, UserDirectory,
    VerificationService,
};
use async_trait::async_trait;
use campus_domain::{UserId, VerificationStatus};
use fxhash::FxHashMap;
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Default)]
pub struct InMemoryUsers {
    users: RwLock<FxHashMap<UserId, Student>>,
}

impl InMemoryUsers {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(self, student: Student) -> Self {
        self.insert(student);
        self
    }

    pub fn insert(&self, student: Student) {
        self.users.write().insert(student.id, student);
    }
}

#[async_trait]
impl UserDirectory for InMemoryUsers {
    async fn find_user(&self, id: UserId) -> Result<Option<Student>, ServiceError> {
        Ok(self.users.read().get(&id).cloned())
    }
}

/// Users without a recorded status read as `none`.
#[derive(Debug, Default)]
pub struct InMemoryVerification {
    statuses: RwLock<FxHashMap<UserId, VerificationStatus>>,
    reads: AtomicUsize,
}

impl InMemoryVerification {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_status(&self, user: UserId, status: VerificationStatus) {
        self.statuses.write().insert(user, status);
    }

    /// How many times a status was looked up.
    #[must_use]
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl VerificationService for InMemoryVerification {
    async fn user_status(&self, student: &Student) -> Result<VerificationStatus, ServiceError> {
        self.reads.fetch_add(1, Ordering::Relaxed);
        Ok(self.statuses.read().get(&student.id).cloned().unwrap_or(VerificationStatus::None))
    }
}

/// Keeps every request it receives and answers with a `downloadable`
/// certificate, or with the configured rejection.
#[derive(Debug, Default)]
pub struct RecordingGenerator {
    requests: Mutex<Vec<CertificateRequest>>,
    reject_with: Option<String>,
}

impl RecordingGenerator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn rejecting(message: impl Into<String>) -> Self {
        Self { requests: Mutex::default(), reject_with: Some(message.into()) }
    }

    #[must_use]
    pub fn requests(&self) -> Vec<CertificateRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl CertificateGenerator for RecordingGenerator {
    async fn generate(
        &self,
        request: CertificateRequest,
    ) -> Result<GeneratedCertificate, ServiceError> {
        let certificate = GeneratedCertificate {
            student: request.student.id,
            course_key: request.course_key.clone(),
            status: "downloadable".to_owned(),
        };
        self.requests.lock().push(request);

        match &self.reject_with {
            Some(message) => {
                Err(ServiceError::Rejected { message: message.clone().into(), context: None })
            },
            None => Ok(certificate),
        }
    }
}
