//! # Domain Models
//!
//! Plain domain types shared by every slice: course keys and blackout windows,
//! user identity, configuration and the feature-slice registry.
//! No I/O here; parsing and small predicates only.

pub mod config;
pub mod constants;
pub mod course;
pub mod error;
pub mod registry;
pub mod user;

pub use course::{BlackoutWindow, Course, CourseKey, any_blackout_active};
pub use error::{DomainError, DomainErrorExt};
pub use user::{DiscussionRole, UserId, VerificationStatus};
