use super::ServiceError;
use campus_domain::{DomainError, UserId};
use std::borrow::Cow;

/// Outcome of one certificate task attempt that did not produce a certificate.
#[campus_derive::campus_error]
pub enum TaskError {
    #[error("Student not found{}: {student}", format_context(.context))]
    NotFound { student: UserId, context: Option<Cow<'static, str>> },

    #[error("Malformed course key{}: {source}", format_context(.context))]
    MalformedKey { source: DomainError, context: Option<Cow<'static, str>> },

    /// The verification status has not caught up with what the caller saw.
    #[error(
        "Verification status mismatch{}: expected {expected}, actual {actual}",
        format_context(.context)
    )]
    Retry { expected: String, actual: String, context: Option<Cow<'static, str>> },

    /// A user or verification lookup failed.
    #[error("Lookup failed{}: {message}", format_context(.context))]
    Lookup { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Certificate generation failed{}: {source}", format_context(.context))]
    Generation { source: ServiceError, context: Option<Cow<'static, str>> },
}

impl TaskError {
    /// Only a verification mismatch is worth another attempt.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Retry { .. })
    }
}
