use crate::error::{ServiceError, TaskError};
use crate::ports::{
    CertificateGenerator, CertificateRequest, GeneratedCertificate, UserDirectory,
    VerificationService,
};
use campus_domain::{CourseKey, UserId, VerificationStatus};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, warn};

/// Arguments of a certificate generation task.
///
/// Keys other than the three named ones are kept in `extra` and handed to the
/// generator unchanged (`generation_mode`, `forced_grade`, ..).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateCertificate {
    pub student: UserId,
    pub course_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_verification_status: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl GenerateCertificate {
    pub fn new(student: impl Into<UserId>, course_key: impl Into<String>) -> Self {
        Self {
            student: student.into(),
            course_key: course_key.into(),
            expected_verification_status: None,
            extra: Map::new(),
        }
    }

    #[must_use]
    pub fn expect_status(mut self, status: impl Into<String>) -> Self {
        self.expected_verification_status = Some(status.into());
        self
    }

    #[must_use]
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// The expected status, if one was given. An empty string counts as none.
    #[must_use]
    pub fn expected_status(&self) -> Option<&str> {
        self.expected_verification_status.as_deref().filter(|s| !s.is_empty())
    }
}

/// Runs one attempt of certificate generation against the configured ports.
#[derive(Debug, Clone)]
pub struct CertificateTask {
    users: Arc<dyn UserDirectory>,
    verification: Arc<dyn VerificationService>,
    generator: Arc<dyn CertificateGenerator>,
}

impl CertificateTask {
    pub fn new(
        users: Arc<dyn UserDirectory>,
        verification: Arc<dyn VerificationService>,
        generator: Arc<dyn CertificateGenerator>,
    ) -> Self {
        Self { users, verification, generator }
    }

    /// Resolves the student and course, double-checks the verification status
    /// when the caller supplied one, then generates.
    ///
    /// # Errors
    /// * [`TaskError::NotFound`] / [`TaskError::MalformedKey`] for bad input.
    /// * [`TaskError::Retry`] when the actual verification status differs from
    ///   the expected one. This is the only retryable outcome.
    /// * [`TaskError::Lookup`] / [`TaskError::Generation`] when a port fails.
    pub async fn run(&self, args: &GenerateCertificate) -> Result<GeneratedCertificate, TaskError> {
        let student = self
            .users
            .find_user(args.student)
            .await
            .map_err(|err| lookup_failed(&err, "user directory"))?
            .ok_or(TaskError::NotFound { student: args.student, context: None })?;
        let course_key: CourseKey = args.course_key.parse()?;

        if let Some(expected) = args.expected_status() {
            let actual = self
                .verification
                .user_status(&student)
                .await
                .map_err(|err| lookup_failed(&err, "verification service"))?;

            if VerificationStatus::from(expected) != actual {
                warn!(
                    expected,
                    actual = %actual,
                    user = %student.id,
                    course = %course_key,
                    "Expected verification status differs from actual verification status"
                );
                return Err(TaskError::Retry {
                    expected: expected.to_owned(),
                    actual: actual.to_string(),
                    context: None,
                });
            }
        }

        debug!(user = %student.id, course = %course_key, "Generating certificate");
        let request = CertificateRequest { student, course_key, options: args.extra.clone() };
        Ok(self.generator.generate(request).await?)
    }
}

fn lookup_failed(err: &ServiceError, port: &'static str) -> TaskError {
    TaskError::Lookup { message: err.to_string().into(), context: Some(port.into()) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extra_arguments_are_kept_aside() {
        let args: GenerateCertificate = serde_json::from_value(json!({
            "student": "12",
            "course_key": "course-v1:edX+DemoX+Demo",
            "expected_verification_status": "approved",
            "generation_mode": "batch",
            "forced_grade": 0.9
        }))
        .unwrap();

        assert_eq!(args.student, UserId(12));
        assert_eq!(args.expected_status(), Some("approved"));
        assert_eq!(args.extra.len(), 2);
        assert_eq!(args.extra["generation_mode"], "batch");
    }

    #[test]
    fn serialization_round_trips_the_original_shape() {
        let args = GenerateCertificate::new(5u64, "edX/DemoX/Demo").with_option("generation_mode", "self");
        let value = serde_json::to_value(&args).unwrap();
        assert_eq!(
            value,
            json!({ "student": 5, "course_key": "edX/DemoX/Demo", "generation_mode": "self" })
        );
    }

    #[test]
    fn blank_expected_status_is_ignored() {
        let args = GenerateCertificate::new(1u64, "a/b/c").expect_status("");
        assert_eq!(args.expected_status(), None);
    }

    #[test]
    fn missing_student_fails_to_parse() {
        let parsed = serde_json::from_value::<GenerateCertificate>(json!({ "course_key": "a/b/c" }));
        assert!(parsed.is_err());
    }
}
