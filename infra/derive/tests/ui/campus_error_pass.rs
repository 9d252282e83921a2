use campus_derive::campus_error;
use std::borrow::Cow;

#[campus_error]
pub enum DemoError {
    #[error("IO error{}: {source}", format_context(.context))]
    Io {
        #[source]
        source: std::io::Error,
        context: Option<Cow<'static, str>>,
    },

    #[error("Missing field{}: {field}", format_context(.context))]
    Missing { field: &'static str, context: Option<Cow<'static, str>> },

    #[error("Internal error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn read() -> Result<(), DemoError> {
    Err(std::io::Error::other("disk")).context("reading switches")
}

fn main() {
    let err = read().unwrap_err();
    assert_eq!(err.to_string(), "IO error (reading switches): disk");

    let err: DemoError = "boom".into();
    assert!(matches!(err, DemoError::Internal { .. }));

    let err: Result<(), DemoError> =
        Err(DemoError::Missing { field: "course_id", context: None });
    let err = err.context("request body").unwrap_err();
    assert_eq!(err.to_string(), "Missing field (request body): course_id");
}
