use std::borrow::Cow;

#[campus_derive::campus_error]
pub enum ToggleError {
    /// No switch is registered under this full name.
    #[error("Unknown switch{}: {name}", format_context(.context))]
    Unknown { name: String, context: Option<Cow<'static, str>> },

    /// Another switch definition already owns this full name.
    #[error("Conflicting switch registration{}: {name}", format_context(.context))]
    Conflict { name: String, context: Option<Cow<'static, str>> },

    #[error("Internal toggle error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
