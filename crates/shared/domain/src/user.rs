use crate::error::DomainError;
use bitflags::bitflags;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Numeric learner/staff identifier.
///
/// Deserializes from either a JSON number or a numeric string, since task
/// payloads carry both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct UserId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for UserId {
    type Err = DomainError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        raw.trim()
            .parse::<u64>()
            .map(Self)
            .map_err(|_| DomainError::MalformedUserId { value: raw.to_owned(), context: None })
    }
}

impl From<u64> for UserId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl<'de> Deserialize<'de> for UserId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(id) => Ok(Self(id)),
            Raw::Text(text) => text.parse().map_err(serde::de::Error::custom),
        }
    }
}

/// Identity verification outcome as reported by the verification service.
///
/// Unknown statuses are kept verbatim so a mismatch can still be logged.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VerificationStatus {
    Approved,
    Denied,
    Pending,
    MustReverify,
    Expired,
    None,
    Other(String),
}

impl VerificationStatus {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Approved => "approved",
            Self::Denied => "denied",
            Self::Pending => "pending",
            Self::MustReverify => "must_reverify",
            Self::Expired => "expired",
            Self::None => "none",
            Self::Other(raw) => raw,
        }
    }
}

impl From<&str> for VerificationStatus {
    fn from(raw: &str) -> Self {
        match raw {
            "approved" => Self::Approved,
            "denied" => Self::Denied,
            "pending" => Self::Pending,
            "must_reverify" => Self::MustReverify,
            "expired" => Self::Expired,
            "none" => Self::None,
            other => Self::Other(other.to_owned()),
        }
    }
}

impl fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for VerificationStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for VerificationStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::from(raw.as_str()))
    }
}

bitflags! {
    /// Forum roles a user can hold within one course.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct DiscussionRole: u8 {
        const STUDENT         = 1 << 0;
        const COMMUNITY_TA    = 1 << 1;
        const GROUP_MODERATOR = 1 << 2;
        const MODERATOR       = 1 << 3;
        const ADMINISTRATOR   = 1 << 4;

        /// Roles allowed to post during a blackout.
        const PRIVILEGED = Self::ADMINISTRATOR.bits()
            | Self::MODERATOR.bits()
            | Self::GROUP_MODERATOR.bits()
            | Self::COMMUNITY_TA.bits();
    }
}

impl DiscussionRole {
    #[must_use]
    pub const fn is_privileged(self) -> bool {
        self.intersects(Self::PRIVILEGED)
    }
}
