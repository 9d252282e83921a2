//! HTTP building blocks shared by the feature routers.

mod error;
mod health;
pub mod router;
mod state;
mod user;

pub use error::{ApiError, ApiErrorExt, error_body};
pub use state::{ApiState, ApiStateBuilder, ApiStateError, ApiStateErrorExt, ApiStateInner};
pub use user::{RequestUser, STAFF_HEADER, USER_HEADER};
