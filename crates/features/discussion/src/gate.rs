//! The discussion access decision.
//!
//! [`AccessGate::check`] resolves the course a request targets, then denies
//! the request only when a blackout window is active for that course and the
//! caller holds no forum privilege in it. It keeps no state between calls.

use crate::error::DiscussionError;
use crate::ports::{Clock, CourseCatalog, DiscussionPrivileges, SystemClock, ThreadService};
use campus_domain::{Course, CourseKey};
use campus_kernel::server::RequestUser;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// Which request field names the course.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// Reads `course_id` from the body.
    Threads,
    /// Reads `thread_id` and asks the comments service for its course.
    Comments,
}

impl Endpoint {
    /// Maps an endpoint name onto its context source. Only `threads` reads
    /// the course directly; every other endpoint goes through a thread.
    #[must_use]
    pub fn from_flag(flag: &str) -> Self {
        if flag == "threads" { Self::Threads } else { Self::Comments }
    }

    #[must_use]
    pub const fn context_field(self) -> &'static str {
        match self {
            Self::Threads => "course_id",
            Self::Comments => "thread_id",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Threads => f.write_str("threads"),
            Self::Comments => f.write_str("comments"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AccessGate {
    courses: Arc<dyn CourseCatalog>,
    threads: Arc<dyn ThreadService>,
    privileges: Arc<dyn DiscussionPrivileges>,
    clock: Arc<dyn Clock>,
}

impl AccessGate {
    #[must_use]
    pub fn new(
        courses: Arc<dyn CourseCatalog>,
        threads: Arc<dyn ThreadService>,
        privileges: Arc<dyn DiscussionPrivileges>,
    ) -> Self {
        Self { courses, threads, privileges, clock: Arc::new(SystemClock) }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Decides whether `user` may reach a discussion endpoint with this body.
    ///
    /// Returns the course the request targets when access is allowed.
    ///
    /// # Errors
    /// - [`DiscussionError::MissingField`] when the endpoint's context field is absent
    /// - [`DiscussionError::MalformedKey`] when the course id does not parse
    /// - [`DiscussionError::ThreadNotFound`] / [`DiscussionError::CourseNotFound`]
    /// - [`DiscussionError::Upstream`] when the comments service fails
    /// - [`DiscussionError::Blackout`] when discussions are closed to this user
    pub async fn check(
        &self,
        user: &RequestUser,
        endpoint: Endpoint,
        body: &Value,
    ) -> Result<Course, DiscussionError> {
        let course_id = self.course_id_from_context(endpoint, body).await?;
        let key: CourseKey = course_id.parse()?;

        let course = self
            .courses
            .course(&key)
            .await?
            .ok_or_else(|| DiscussionError::CourseNotFound { key: key.to_string(), context: None })?;

        let now = self.clock.now();
        if !course.is_discussion_blacked_out(now) {
            return Ok(course);
        }

        if self.privileges.has_discussion_privileges(user, &course.key).await? {
            debug!(user = %user.id, course = %course.key, "Privileged user passes discussion blackout");
            return Ok(course);
        }

        info!(user = %user.id, course = %course.key, %endpoint, "Discussion blacked out");
        Err(DiscussionError::Blackout { context: None })
    }

    async fn course_id_from_context(
        &self,
        endpoint: Endpoint,
        body: &Value,
    ) -> Result<String, DiscussionError> {
        let field = endpoint.context_field();
        let value =
            body.get(field).ok_or(DiscussionError::MissingField { field, context: None })?;

        match endpoint {
            Endpoint::Threads => match value {
                Value::String(course_id) => Ok(course_id.clone()),
                other => Err(DiscussionError::malformed_key(other.to_string())),
            },
            Endpoint::Comments => {
                let thread_id = match value {
                    Value::String(id) => id.clone(),
                    Value::Number(id) => id.to_string(),
                    _ => return Err(DiscussionError::MissingField { field, context: None }),
                };

                let thread = self.threads.thread(&thread_id).await?.ok_or_else(|| {
                    DiscussionError::ThreadNotFound { thread_id: thread_id.clone(), context: None }
                })?;

                thread
                    .course_id
                    .ok_or_else(|| DiscussionError::malformed_key(String::new()))
            },
        }
    }
}
