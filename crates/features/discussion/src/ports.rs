use crate::error::DiscussionError;
use async_trait::async_trait;
use campus_domain::{Course, CourseKey};
use campus_kernel::server::RequestUser;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::fmt::Debug;

/// The part of a comments-service thread the gate needs.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ThreadInfo {
    pub id: String,
    #[serde(default)]
    pub course_id: Option<String>,
}

/// Course lookup by key.
#[async_trait]
pub trait CourseCatalog: Debug + Send + Sync {
    async fn course(&self, key: &CourseKey) -> Result<Option<Course>, DiscussionError>;
}

/// Thread lookup in the comments service. `Ok(None)` means the thread does not exist.
#[async_trait]
pub trait ThreadService: Debug + Send + Sync {
    async fn thread(&self, thread_id: &str) -> Result<Option<ThreadInfo>, DiscussionError>;
}

/// Moderator/staff capability check for a course.
#[async_trait]
pub trait DiscussionPrivileges: Debug + Send + Sync {
    async fn has_discussion_privileges(
        &self,
        user: &RequestUser,
        course: &CourseKey,
    ) -> Result<bool, DiscussionError>;
}

pub trait Clock: Debug + Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Always reports the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
