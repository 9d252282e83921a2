//! Boundaries to the user store, identity verification and certificate
//! generation.

use crate::error::ServiceError;
use async_trait::async_trait;
use campus_domain::{CourseKey, UserId, VerificationStatus};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt::Debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: UserId,
    pub username: String,
}

impl Student {
    pub fn new(id: impl Into<UserId>, username: impl Into<String>) -> Self {
        Self { id: id.into(), username: username.into() }
    }
}

/// Everything the generator needs: the resolved student, the parsed course
/// key and the caller's remaining task arguments, untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct CertificateRequest {
    pub student: Student,
    pub course_key: CourseKey,
    pub options: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedCertificate {
    pub student: UserId,
    pub course_key: CourseKey,
    pub status: String,
}

#[async_trait]
pub trait UserDirectory: Debug + Send + Sync {
    async fn find_user(&self, id: UserId) -> Result<Option<Student>, ServiceError>;
}

#[async_trait]
pub trait VerificationService: Debug + Send + Sync {
    async fn user_status(&self, student: &Student) -> Result<VerificationStatus, ServiceError>;
}

#[async_trait]
pub trait CertificateGenerator: Debug + Send + Sync {
    async fn generate(
        &self,
        request: CertificateRequest,
    ) -> Result<GeneratedCertificate, ServiceError>;
}
