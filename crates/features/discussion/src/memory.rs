//! In-process catalog, thread store and role registry.

use crate::error::DiscussionError;
use crate::ports::{CourseCatalog, DiscussionPrivileges, ThreadInfo, ThreadService};
use async_trait::async_trait;
use campus_domain::config::{CourseSettings, RoleGrant};
use campus_domain::{BlackoutWindow, Course, CourseKey, DiscussionRole, UserId};
use campus_kernel::server::RequestUser;
use fxhash::FxHashMap;
use parking_lot::RwLock;
use tracing::info;

#[derive(Debug, Default)]
pub struct InMemoryCourses {
    courses: RwLock<FxHashMap<CourseKey, Course>>,
}

impl InMemoryCourses {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the catalog from configured course settings.
    ///
    /// A course whose blackout setting does not parse is loaded without
    /// blackouts.
    ///
    /// # Errors
    /// [`DiscussionError::MalformedKey`] if a course key does not parse.
    pub fn from_settings(settings: &[CourseSettings]) -> Result<Self, DiscussionError> {
        let catalog = Self::new();
        for entry in settings {
            let key: CourseKey = entry.key.parse()?;
            let blackouts = BlackoutWindow::parse_setting(&entry.discussion_blackouts)
                .unwrap_or_else(|err| {
                    info!(course = %key, error = %err, "Ignoring unparseable discussion blackouts");
                    Vec::new()
                });
            catalog.insert(Course::new(key, entry.display_name.clone()).with_blackouts(blackouts));
        }
        Ok(catalog)
    }

    #[must_use]
    pub fn with(self, course: Course) -> Self {
        self.insert(course);
        self
    }

    pub fn insert(&self, course: Course) {
        self.courses.write().insert(course.key.clone(), course);
    }

    pub fn len(&self) -> usize {
        self.courses.read().len()
    }
}

#[async_trait]
impl CourseCatalog for InMemoryCourses {
    async fn course(&self, key: &CourseKey) -> Result<Option<Course>, DiscussionError> {
        Ok(self.courses.read().get(key).cloned())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryThreads {
    threads: RwLock<FxHashMap<String, ThreadInfo>>,
}

impl InMemoryThreads {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(self, thread_id: &str, course_id: Option<&str>) -> Self {
        self.insert(thread_id, course_id);
        self
    }

    pub fn insert(&self, thread_id: &str, course_id: Option<&str>) {
        let info =
            ThreadInfo { id: thread_id.to_owned(), course_id: course_id.map(str::to_owned) };
        self.threads.write().insert(thread_id.to_owned(), info);
    }
}

#[async_trait]
impl ThreadService for InMemoryThreads {
    async fn thread(&self, thread_id: &str) -> Result<Option<ThreadInfo>, DiscussionError> {
        Ok(self.threads.read().get(thread_id).cloned())
    }
}

/// Forum roles per user and course. Global staff are privileged everywhere.
#[derive(Debug, Default)]
pub struct RoleRegistry {
    grants: RwLock<FxHashMap<(UserId, CourseKey), DiscussionRole>>,
}

impl RoleRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// # Errors
    /// [`DiscussionError::MalformedKey`] if a grant names an unparseable course.
    pub fn from_grants(grants: &[RoleGrant]) -> Result<Self, DiscussionError> {
        let registry = Self::new();
        for grant in grants {
            registry.grant(UserId(grant.user), grant.course.parse()?, grant.roles);
        }
        Ok(registry)
    }

    /// Adds `roles` to whatever the user already holds in the course.
    pub fn grant(&self, user: UserId, course: CourseKey, roles: DiscussionRole) {
        *self.grants.write().entry((user, course)).or_insert_with(DiscussionRole::empty) |= roles;
    }

    pub fn revoke(&self, user: UserId, course: &CourseKey) {
        self.grants.write().remove(&(user, course.clone()));
    }

    #[must_use]
    pub fn roles(&self, user: UserId, course: &CourseKey) -> DiscussionRole {
        self.grants
            .read()
            .get(&(user, course.clone()))
            .copied()
            .unwrap_or_else(DiscussionRole::empty)
    }
}

#[async_trait]
impl DiscussionPrivileges for RoleRegistry {
    async fn has_discussion_privileges(
        &self,
        user: &RequestUser,
        course: &CourseKey,
    ) -> Result<bool, DiscussionError> {
        Ok(user.is_staff || self.roles(user.id, course).is_privileged())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn demo_key() -> CourseKey {
        "course-v1:edX+DemoX+2024".parse().unwrap()
    }

    #[tokio::test]
    async fn student_role_is_not_privileged() {
        let registry = RoleRegistry::new();
        registry.grant(UserId(1), demo_key(), DiscussionRole::STUDENT);
        registry.grant(UserId(2), demo_key(), DiscussionRole::STUDENT | DiscussionRole::COMMUNITY_TA);

        let learner = RequestUser::new(UserId(1), false);
        let ta = RequestUser::new(UserId(2), false);
        assert!(!registry.has_discussion_privileges(&learner, &demo_key()).await.unwrap());
        assert!(registry.has_discussion_privileges(&ta, &demo_key()).await.unwrap());
    }

    #[tokio::test]
    async fn staff_is_privileged_without_grants() {
        let registry = RoleRegistry::new();
        let staff = RequestUser::new(UserId(3), true);
        assert!(registry.has_discussion_privileges(&staff, &demo_key()).await.unwrap());
    }

    #[tokio::test]
    async fn roles_are_scoped_to_the_course() {
        let registry = RoleRegistry::new();
        registry.grant(UserId(4), demo_key(), DiscussionRole::MODERATOR);
        let other: CourseKey = "edX/Other/2024".parse().unwrap();

        let user = RequestUser::new(UserId(4), false);
        assert!(!registry.has_discussion_privileges(&user, &other).await.unwrap());

        registry.revoke(UserId(4), &demo_key());
        assert!(registry.roles(UserId(4), &demo_key()).is_empty());
    }

    #[test]
    fn bad_blackout_setting_loads_course_without_blackouts() {
        let settings = vec![CourseSettings {
            key: demo_key().to_string(),
            display_name: "Demo".to_owned(),
            discussion_blackouts: vec![vec!["yesterday".to_owned(), "tomorrow".to_owned()]],
        }];
        let catalog = InMemoryCourses::from_settings(&settings).unwrap();
        let course = catalog.courses.read().get(&demo_key()).cloned().unwrap();
        assert!(course.discussion_blackouts.is_empty());
    }

    #[test]
    fn malformed_course_setting_key_is_rejected() {
        let settings = vec![CourseSettings { key: "not a key".to_owned(), ..Default::default() }];
        assert!(matches!(
            InMemoryCourses::from_settings(&settings),
            Err(DiscussionError::MalformedKey { .. })
        ));
    }
}
