use std::borrow::Cow;

/// Parse failures for domain identifiers and course settings.
#[campus_derive::campus_error]
pub enum DomainError {
    /// The course key is not `course-v1:ORG+COURSE+RUN` or `ORG/COURSE/RUN`.
    #[error("Malformed course key{}: {key}", format_context(.context))]
    MalformedKey { key: String, context: Option<Cow<'static, str>> },

    /// A user identifier is not a non-negative integer.
    #[error("Malformed user id{}: {value}", format_context(.context))]
    MalformedUserId { value: String, context: Option<Cow<'static, str>> },

    /// A blackout entry could not be turned into a `[start, end]` window.
    #[error("Invalid discussion blackout{}: {message}", format_context(.context))]
    InvalidBlackout { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
