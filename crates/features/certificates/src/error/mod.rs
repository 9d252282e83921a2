mod certificate;
mod service;
mod task;

pub use certificate::{CertificateError, CertificateErrorExt};
pub use service::{ServiceError, ServiceErrorExt};
pub use task::{TaskError, TaskErrorExt};

#[cfg(test)]
mod tests {
    use super::{
        CertificateError, CertificateErrorExt, ServiceError, ServiceErrorExt, TaskError,
        TaskErrorExt,
    };
    use campus_domain::UserId;
    use campus_event_bus::EventBusError;

    #[test]
    fn each_error_formats_its_own_context() {
        let service: Result<(), ServiceError> =
            Err(ServiceError::Unavailable { message: "timeout".into(), context: None });
        let err = ServiceErrorExt::context(service, "generator").unwrap_err();
        assert_eq!(err.to_string(), "Service unavailable (generator): timeout");

        let task: Result<(), TaskError> =
            Err(TaskError::NotFound { student: UserId(9), context: None });
        let err = TaskErrorExt::context(task, "lookup").unwrap_err();
        assert_eq!(err.to_string(), "Student not found (lookup): 9");

        let queue: Result<(), EventBusError> =
            Err(EventBusError::ReceiverTaken { message: "envelope".into(), context: None });
        let err = CertificateErrorExt::context(queue, "certificate worker").unwrap_err();
        assert!(matches!(err, CertificateError::Queue { .. }));
        assert!(err.to_string().starts_with("Certificate queue error (certificate worker): "));
    }

    #[test]
    fn generation_failure_wraps_the_service_error() {
        let err = TaskError::from(ServiceError::Rejected { message: "bad grade".into(), context: None });
        assert!(!err.is_retryable());
        assert_eq!(err.to_string(), "Certificate generation failed: Request rejected: bad grade");
    }
}
