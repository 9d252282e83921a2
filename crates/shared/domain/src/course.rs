//! Course identity and discussion blackout windows.

use crate::error::DomainError;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

const COURSE_PREFIX: &str = "course-v1:";

/// Opaque course identifier.
///
/// Parses the current `course-v1:ORG+COURSE+RUN` form and the deprecated
/// slash-separated `ORG/COURSE/RUN` form. `Display` renders the key in the
/// form it was parsed from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CourseKey {
    org: String,
    course: String,
    run: String,
    deprecated: bool,
}

impl CourseKey {
    /// Builds a `course-v1` key from its parts.
    ///
    /// # Errors
    /// [`DomainError::MalformedKey`] if any part is empty or has invalid characters.
    pub fn new(org: &str, course: &str, run: &str) -> Result<Self, DomainError> {
        Self::from_parts(org, course, run, false)
            .ok_or_else(|| malformed(format!("{COURSE_PREFIX}{org}+{course}+{run}")))
    }

    #[must_use]
    pub fn org(&self) -> &str {
        &self.org
    }

    #[must_use]
    pub fn course(&self) -> &str {
        &self.course
    }

    #[must_use]
    pub fn run(&self) -> &str {
        &self.run
    }

    /// Whether the key was written in the old `ORG/COURSE/RUN` form.
    #[must_use]
    pub const fn is_deprecated(&self) -> bool {
        self.deprecated
    }

    fn from_parts(org: &str, course: &str, run: &str, deprecated: bool) -> Option<Self> {
        let valid = is_key_part(org, false) && is_key_part(course, false) && is_key_part(run, true);
        valid.then(|| Self {
            org: org.to_owned(),
            course: course.to_owned(),
            run: run.to_owned(),
            deprecated,
        })
    }
}

fn is_key_part(part: &str, allow_percent: bool) -> bool {
    !part.is_empty()
        && part.chars().all(|c| {
            c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '~' | '-') || (allow_percent && c == '%')
        })
}

fn malformed(key: impl Into<String>) -> DomainError {
    DomainError::MalformedKey { key: key.into(), context: None }
}

impl FromStr for CourseKey {
    type Err = DomainError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let parsed = if let Some(body) = raw.strip_prefix(COURSE_PREFIX) {
            let mut parts = body.split('+');
            match (parts.next(), parts.next(), parts.next(), parts.next()) {
                (Some(org), Some(course), Some(run), None) => {
                    Self::from_parts(org, course, run, false)
                },
                _ => None,
            }
        } else {
            let mut parts = raw.split('/');
            match (parts.next(), parts.next(), parts.next(), parts.next()) {
                (Some(org), Some(course), Some(run), None) => {
                    Self::from_parts(org, course, run, true)
                },
                _ => None,
            }
        };

        parsed.ok_or_else(|| malformed(raw))
    }
}

impl fmt::Display for CourseKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.deprecated {
            write!(f, "{}/{}/{}", self.org, self.course, self.run)
        } else {
            write!(f, "{COURSE_PREFIX}{}+{}+{}", self.org, self.course, self.run)
        }
    }
}

impl Serialize for CourseKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CourseKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// A period during which ordinary learners cannot use course discussions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlackoutWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl BlackoutWindow {
    #[must_use]
    pub const fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Strict on both bounds: the start and end instants are outside the window.
    #[must_use]
    pub fn contains(&self, now: DateTime<Utc>) -> bool {
        self.start < now && now < self.end
    }

    /// Parses the raw course setting: a list of `[start, end]` string pairs.
    ///
    /// Empty entries are skipped. Bounds accept RFC 3339, naive
    /// `YYYY-MM-DDTHH:MM[:SS]` (read as UTC) or a bare date (midnight UTC).
    ///
    /// # Errors
    /// [`DomainError::InvalidBlackout`] when any non-empty entry is not a pair
    /// or a bound does not parse. The setting is all-or-nothing.
    pub fn parse_setting<S: AsRef<str>>(raw: &[Vec<S>]) -> Result<Vec<Self>, DomainError> {
        raw.iter()
            .filter(|entry| !entry.is_empty())
            .map(|entry| match entry.as_slice() {
                [start, end] => Ok(Self::new(parse_bound(start.as_ref())?, parse_bound(end.as_ref())?)),
                other => Err(DomainError::InvalidBlackout {
                    message: format!("expected [start, end], got {} values", other.len()).into(),
                    context: None,
                }),
            })
            .collect()
    }
}

/// True if `now` falls inside any window. Overlapping windows are not
/// distinguished.
#[must_use]
pub fn any_blackout_active(windows: &[BlackoutWindow], now: DateTime<Utc>) -> bool {
    windows.iter().any(|window| window.contains(now))
}

fn parse_bound(raw: &str) -> Result<DateTime<Utc>, DomainError> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(naive.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date.and_time(chrono::NaiveTime::MIN).and_utc());
    }

    Err(DomainError::InvalidBlackout {
        message: format!("unparseable datetime '{raw}'").into(),
        context: None,
    })
}

/// The slice of course state the discussion gate reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub key: CourseKey,
    pub display_name: String,
    #[serde(default)]
    pub discussion_blackouts: Vec<BlackoutWindow>,
}

impl Course {
    #[must_use]
    pub fn new(key: CourseKey, display_name: impl Into<String>) -> Self {
        Self { key, display_name: display_name.into(), discussion_blackouts: Vec::new() }
    }

    #[must_use]
    pub fn with_blackouts(mut self, windows: impl IntoIterator<Item = BlackoutWindow>) -> Self {
        self.discussion_blackouts.extend(windows);
        self
    }

    #[must_use]
    pub fn is_discussion_blacked_out(&self, now: DateTime<Utc>) -> bool {
        any_blackout_active(&self.discussion_blackouts, now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, h, m, 0).unwrap()
    }

    #[test]
    fn parses_current_key_form() {
        let key: CourseKey = "course-v1:edX+DemoX+Demo_Course".parse().unwrap();
        assert_eq!(key.org(), "edX");
        assert_eq!(key.course(), "DemoX");
        assert_eq!(key.run(), "Demo_Course");
        assert!(!key.is_deprecated());
        assert_eq!(key.to_string(), "course-v1:edX+DemoX+Demo_Course");
    }

    #[test]
    fn parses_deprecated_slash_form() {
        let key: CourseKey = "MITx/6.002x/2012_Fall".parse().unwrap();
        assert!(key.is_deprecated());
        assert_eq!(key.to_string(), "MITx/6.002x/2012_Fall");
    }

    #[test]
    fn rejects_malformed_keys() {
        for raw in [
            "",
            "not a key",
            "course-v1:edX+DemoX",
            "course-v1:edX+DemoX+Demo+Extra",
            "course-v1:edX++Demo",
            "edX/DemoX",
            "edX/Demo X/2024",
            "course-v1:edX+Demo%X+run",
        ] {
            let err = raw.parse::<CourseKey>().expect_err(raw);
            assert!(matches!(err, DomainError::MalformedKey { .. }), "{raw}");
        }
    }

    #[test]
    fn percent_is_allowed_in_run_only() {
        assert!("course-v1:edX+DemoX+2024%20T1".parse::<CourseKey>().is_ok());
    }

    #[test]
    fn course_key_serde_uses_string_form() {
        let key = CourseKey::new("edX", "DemoX", "Demo").unwrap();
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, "\"course-v1:edX+DemoX+Demo\"");
        let back: CourseKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, key);
        assert!(serde_json::from_str::<CourseKey>("\"garbage\"").is_err());
    }

    #[test]
    fn window_bounds_are_exclusive() {
        let window = BlackoutWindow::new(at(10, 0), at(11, 0));
        assert!(window.contains(at(10, 30)));
        assert!(!window.contains(at(10, 0)));
        assert!(!window.contains(at(11, 0)));
        assert!(!window.contains(at(9, 59)));
    }

    #[test]
    fn any_window_match_counts() {
        let windows = [
            BlackoutWindow::new(at(8, 0), at(9, 0)),
            BlackoutWindow::new(at(10, 0), at(12, 0)),
            BlackoutWindow::new(at(11, 0), at(13, 0)),
        ];
        assert!(any_blackout_active(&windows, at(11, 30)));
        assert!(any_blackout_active(&windows, at(8, 30)));
        assert!(!any_blackout_active(&windows, at(9, 30)));
        assert!(!any_blackout_active(&[], at(9, 30)));
    }

    #[test]
    fn parses_setting_formats() {
        let raw = vec![
            vec!["2026-03-14T10:00", "2026-03-14T11:00:00"],
            vec![],
            vec!["2026-03-15", "2026-03-16T00:00:00+02:00"],
        ];
        let windows = BlackoutWindow::parse_setting(&raw).unwrap();
        assert_eq!(windows.len(), 2);
        assert_eq!(windows[0].start, at(10, 0));
        assert_eq!(windows[0].end, at(11, 0));
        assert_eq!(windows[1].start, Utc.with_ymd_and_hms(2026, 3, 15, 0, 0, 0).unwrap());
        assert_eq!(windows[1].end, Utc.with_ymd_and_hms(2026, 3, 15, 22, 0, 0).unwrap());
    }

    #[test]
    fn malformed_setting_is_rejected_whole() {
        let raw = vec![vec!["2026-03-14T10:00", "2026-03-14T11:00"], vec!["tomorrow", "later"]];
        assert!(BlackoutWindow::parse_setting(&raw).is_err());

        let raw = vec![vec!["2026-03-14T10:00"]];
        assert!(BlackoutWindow::parse_setting(&raw).is_err());
    }
}
