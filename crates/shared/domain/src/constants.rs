//! OpenAPI tags and shared literals.

pub const SYSTEM_TAG: &str = "System";
pub const DISCUSSION_TAG: &str = "Discussion";
pub const CERTIFICATES_TAG: &str = "Certificates";
pub const TOGGLES_TAG: &str = "Toggles";

/// Validation message attached to a missing request field.
pub const FIELD_REQUIRED: &str = "This field is required.";

/// Body of the 403 returned while discussions are blacked out.
pub const BLACKOUT_MESSAGE: &str = "Discussions are in a black out period.";
