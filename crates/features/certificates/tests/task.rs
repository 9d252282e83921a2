use campus_certificates::memory::{InMemoryUsers, InMemoryVerification, RecordingGenerator};
use campus_certificates::{CertificateTask, GenerateCertificate, Student, TaskError};
use campus_domain::{UserId, VerificationStatus};
use serde_json::json;
use std::sync::Arc;

const COURSE: &str = "course-v1:edX+DemoX+Demo_Course";

struct Fixture {
    verification: Arc<InMemoryVerification>,
    generator: Arc<RecordingGenerator>,
    task: CertificateTask,
}

fn fixture(generator: RecordingGenerator) -> Fixture {
    let users = Arc::new(InMemoryUsers::new().with(Student::new(7u64, "learner")));
    let verification = Arc::new(InMemoryVerification::new());
    let generator = Arc::new(generator);
    let task = CertificateTask::new(users, verification.clone(), generator.clone());
    Fixture { verification, generator, task }
}

#[tokio::test]
async fn generates_without_touching_verification_when_no_status_expected() {
    let fx = fixture(RecordingGenerator::new());
    let args = GenerateCertificate::new(7u64, COURSE).with_option("generation_mode", "batch");

    let certificate = fx.task.run(&args).await.unwrap();

    assert_eq!(certificate.student, UserId(7));
    assert_eq!(fx.verification.reads(), 0);
    let requests = fx.generator.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].student.username, "learner");
    assert_eq!(requests[0].course_key.to_string(), COURSE);
    assert_eq!(requests[0].options, json!({ "generation_mode": "batch" }).as_object().cloned().unwrap());
}

#[tokio::test]
async fn matching_status_generates() {
    let fx = fixture(RecordingGenerator::new());
    fx.verification.set_status(UserId(7), VerificationStatus::Approved);

    let args = GenerateCertificate::new(7u64, COURSE).expect_status("approved");
    fx.task.run(&args).await.unwrap();

    assert_eq!(fx.verification.reads(), 1);
    assert_eq!(fx.generator.requests().len(), 1);
}

#[tokio::test]
async fn status_mismatch_asks_for_retry() {
    let fx = fixture(RecordingGenerator::new());
    fx.verification.set_status(UserId(7), VerificationStatus::Denied);

    let args = GenerateCertificate::new(7u64, COURSE).expect_status("approved");
    let err = fx.task.run(&args).await.unwrap_err();

    assert!(err.is_retryable());
    assert!(matches!(
        err,
        TaskError::Retry { ref expected, ref actual, .. } if expected == "approved" && actual == "denied"
    ));
    assert!(fx.generator.requests().is_empty());
}

#[tokio::test]
async fn unknown_student_is_not_found() {
    let fx = fixture(RecordingGenerator::new());
    let err = fx.task.run(&GenerateCertificate::new(99u64, COURSE)).await.unwrap_err();

    assert!(matches!(err, TaskError::NotFound { student: UserId(99), .. }));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn malformed_course_key_is_rejected_before_verification() {
    let fx = fixture(RecordingGenerator::new());
    let args = GenerateCertificate::new(7u64, "not a course").expect_status("approved");

    let err = fx.task.run(&args).await.unwrap_err();

    assert!(matches!(err, TaskError::MalformedKey { .. }));
    assert!(!err.is_retryable());
    assert_eq!(fx.verification.reads(), 0);
}

#[tokio::test]
async fn generator_failure_is_permanent() {
    let fx = fixture(RecordingGenerator::rejecting("grade not passing"));
    let err = fx.task.run(&GenerateCertificate::new(7u64, COURSE)).await.unwrap_err();

    assert!(matches!(err, TaskError::Generation { .. }));
    assert!(err.to_string().contains("grade not passing"));
    assert!(!err.is_retryable());
}
