//! Discussion access gate.
//!
//! Course discussions can be closed for configured blackout windows. While a
//! window is open only users with a forum privilege in the course (or global
//! staff) get through. The course is taken from the request: `course_id` on
//! the threads endpoint, or the course of `thread_id` (looked up in the
//! comments service) everywhere else.
//!
//! [`AccessGate`] holds the decision and [`discussion_accessible`] is the
//! axum middleware that wraps handlers with it.

pub mod client;
mod error;
mod gate;
#[cfg(feature = "server")]
mod handlers;
pub mod memory;
mod middleware;
mod ports;

pub use error::{DiscussionError, DiscussionErrorExt};
pub use gate::{AccessGate, Endpoint};
#[cfg(feature = "server")]
pub use handlers::{Accepted, router};
pub use middleware::{GateState, GatedCourse, discussion_accessible};
pub use ports::{
    Clock, CourseCatalog, DiscussionPrivileges, FixedClock, SystemClock, ThreadInfo, ThreadService,
};

use crate::client::{CachedThreadService, HttpThreadService};
use crate::memory::{InMemoryCourses, RoleRegistry};
use campus_domain::config::DiscussionConfig;
use campus_kernel::domain::registry::InitializedSlice;
use std::sync::Arc;

/// Discussion feature state
#[campus_derive::campus_slice]
pub struct Discussion {
    pub gate: AccessGate,
    pub body_limit: usize,
}

/// Builds the slice around an existing gate.
#[must_use]
pub fn with_gate(gate: AccessGate, config: &DiscussionConfig) -> Discussion {
    Discussion::new(DiscussionInner { gate, body_limit: config.body_limit_bytes })
}

/// Initialize the discussion feature: courses and role grants from config,
/// threads from the comments service behind a cache.
///
/// # Errors
/// A malformed course key in the course or role settings, or an HTTP client
/// that cannot be built.
pub fn init(config: &DiscussionConfig) -> Result<InitializedSlice, DiscussionError> {
    let courses = InMemoryCourses::from_settings(&config.courses).context("discussion.courses")?;
    let roles = RoleRegistry::from_grants(&config.roles).context("discussion.roles")?;
    let threads = CachedThreadService::from_config(Arc::new(HttpThreadService::new(config)?), config);

    tracing::info!(
        courses = courses.len(),
        service_url = %config.service_url,
        body_limit = config.body_limit_bytes,
        "Discussion slice initialized"
    );

    let gate = AccessGate::new(Arc::new(courses), Arc::new(threads), Arc::new(roles));
    Ok(InitializedSlice::new(with_gate(gate, config)))
}
