use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use campus_domain::constants::FIELD_REQUIRED;
use serde_json::{Map, Value, json};
use std::borrow::Cow;
use tracing::error;

/// Errors surfaced to HTTP clients.
///
/// Response bodies follow the form conventions of the LMS: validation errors
/// are keyed by field, everything else is `{"errors": [..]}`.
#[campus_derive::campus_error]
pub enum ApiError {
    /// A required request field is absent.
    #[error("Validation error{}: {field} {message}", format_context(.context))]
    Validation {
        field: Cow<'static, str>,
        message: Cow<'static, str>,
        context: Option<Cow<'static, str>>,
    },

    /// The request itself could not be read.
    #[error("Bad request{}: {message}", format_context(.context))]
    BadRequest { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Not found{}: {message}", format_context(.context))]
    NotFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Malformed key{}: {message}", format_context(.context))]
    MalformedKey { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Unauthorized{}: {message}", format_context(.context))]
    Unauthorized { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Forbidden{}: {message}", format_context(.context))]
    Forbidden { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Payload too large{}: {message}", format_context(.context))]
    PayloadTooLarge { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Temporarily unable to accept work.
    #[error("Service unavailable{}: {message}", format_context(.context))]
    Unavailable { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A dependent service failed or answered with garbage.
    #[error("Upstream error{}: {message}", format_context(.context))]
    Upstream { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Internal error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl ApiError {
    /// Shortcut for a "This field is required." validation failure.
    #[must_use]
    pub fn field_required(field: impl Into<Cow<'static, str>>) -> Self {
        Self::Validation { field: field.into(), message: FIELD_REQUIRED.into(), context: None }
    }

    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation { .. } | Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } | Self::MalformedKey { .. } => StatusCode::NOT_FOUND,
            Self::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            Self::Forbidden { .. } => StatusCode::FORBIDDEN,
            Self::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Unavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            Self::Upstream { .. } => StatusCode::BAD_GATEWAY,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> Value {
        match self {
            Self::Validation { field, message, .. } => {
                let mut body = Map::new();
                body.insert(field.to_string(), json!([message]));
                Value::Object(body)
            },
            Self::BadRequest { message, .. }
            | Self::NotFound { message, .. }
            | Self::MalformedKey { message, .. }
            | Self::Unauthorized { message, .. }
            | Self::Forbidden { message, .. }
            | Self::PayloadTooLarge { message, .. }
            | Self::Unavailable { message, .. }
            | Self::Upstream { message, .. } => error_body([message.as_ref()]),
            Self::Internal { .. } => error_body(["Internal server error"]),
        }
    }
}

/// `{"errors": [..]}` response body.
pub fn error_body<I, S>(messages: I) -> Value
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let errors: Vec<Value> = messages.into_iter().map(|m| Value::from(m.as_ref())).collect();
    json!({ "errors": errors })
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        }

        (status, Json(self.body())).into_response()
    }
}

impl From<super::ApiStateError> for ApiError {
    fn from(err: super::ApiStateError) -> Self {
        Self::Internal { message: err.to_string().into(), context: None }
    }
}
