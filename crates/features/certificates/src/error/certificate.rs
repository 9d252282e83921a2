use campus_event_bus::EventBusError;
use std::borrow::Cow;

#[campus_derive::campus_error]
pub enum CertificateError {
    #[error("Certificate queue error{}: {source}", format_context(.context))]
    Queue { source: EventBusError, context: Option<Cow<'static, str>> },

    #[error("Certificate queue is full{}: {message}", format_context(.context))]
    QueueFull { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Certificate queue is closed{}: {message}", format_context(.context))]
    QueueClosed { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Internal certificate error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
