use campus_domain::DomainError;
use campus_domain::constants::BLACKOUT_MESSAGE;
use campus_kernel::server::ApiError;
use std::borrow::Cow;

#[campus_derive::campus_error]
pub enum DiscussionError {
    /// The request body lacks the field the endpoint reads its course from.
    #[error("Missing field{}: {field}", format_context(.context))]
    MissingField { field: &'static str, context: Option<Cow<'static, str>> },

    #[error("Malformed course key{}: {source}", format_context(.context))]
    MalformedKey { source: DomainError, context: Option<Cow<'static, str>> },

    #[error("Course not found{}: {key}", format_context(.context))]
    CourseNotFound { key: String, context: Option<Cow<'static, str>> },

    #[error("Thread not found{}: {thread_id}", format_context(.context))]
    ThreadNotFound { thread_id: String, context: Option<Cow<'static, str>> },

    /// Discussions are blacked out and the user holds no forum privilege.
    #[error("Discussion blackout{}", format_context(.context))]
    Blackout { context: Option<Cow<'static, str>> },

    #[error("Request body exceeds {limit} bytes{}", format_context(.context))]
    PayloadTooLarge { limit: usize, context: Option<Cow<'static, str>> },

    /// The request body stream broke off before it was fully read.
    #[error("Unreadable request body{}: {message}", format_context(.context))]
    UnreadableBody { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The comments service failed or returned an unusable response.
    #[error("Comments service error{}: {message}", format_context(.context))]
    Upstream { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Internal error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl DiscussionError {
    pub(crate) fn malformed_key(key: impl Into<String>) -> Self {
        Self::MalformedKey {
            source: DomainError::MalformedKey { key: key.into(), context: None },
            context: None,
        }
    }
}

impl From<DiscussionError> for ApiError {
    fn from(err: DiscussionError) -> Self {
        match err {
            DiscussionError::MissingField { field, .. } => Self::field_required(field),
            DiscussionError::MalformedKey { source, .. } => {
                Self::MalformedKey { message: source.to_string().into(), context: None }
            },
            DiscussionError::CourseNotFound { .. } | DiscussionError::ThreadNotFound { .. } => {
                Self::NotFound { message: err.to_string().into(), context: None }
            },
            DiscussionError::Blackout { .. } => {
                Self::Forbidden { message: BLACKOUT_MESSAGE.into(), context: None }
            },
            DiscussionError::PayloadTooLarge { .. } => {
                Self::PayloadTooLarge { message: err.to_string().into(), context: None }
            },
            DiscussionError::UnreadableBody { .. } => {
                Self::BadRequest { message: err.to_string().into(), context: None }
            },
            DiscussionError::Upstream { message, context } => Self::Upstream { message, context },
            DiscussionError::Internal { message, context } => Self::Internal { message, context },
        }
    }
}
