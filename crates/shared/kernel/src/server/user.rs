use super::ApiError;
use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::request::Parts;
use campus_domain::UserId;

/// Header carrying the authenticated user id, set by the trusted gateway.
pub const USER_HEADER: &str = "x-campus-user";
/// Header flagging global staff (`true`/`1`).
pub const STAFF_HEADER: &str = "x-campus-staff";

/// The authenticated caller, placed in request extensions by the host's
/// authentication layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestUser {
    pub id: UserId,
    pub is_staff: bool,
}

impl RequestUser {
    #[must_use]
    pub const fn new(id: UserId, is_staff: bool) -> Self {
        Self { id, is_staff }
    }

    /// Reads the gateway identity headers. `None` when the user header is
    /// missing or not numeric.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let id = headers.get(USER_HEADER)?.to_str().ok()?.parse::<UserId>().ok()?;
        let is_staff = headers
            .get(STAFF_HEADER)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.eq_ignore_ascii_case("true") || v == "1");

        Some(Self { id, is_staff })
    }
}

impl<S> FromRequestParts<S> for RequestUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<Self>().copied().ok_or_else(|| ApiError::Unauthorized {
            message: "Authentication credentials were not provided.".into(),
            context: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn reads_gateway_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(USER_HEADER, HeaderValue::from_static("17"));
        headers.insert(STAFF_HEADER, HeaderValue::from_static("TRUE"));

        let user = RequestUser::from_headers(&headers).unwrap();
        assert_eq!(user, RequestUser::new(UserId(17), true));
    }

    #[test]
    fn missing_or_bad_user_header_is_anonymous() {
        assert!(RequestUser::from_headers(&HeaderMap::new()).is_none());

        let mut headers = HeaderMap::new();
        headers.insert(USER_HEADER, HeaderValue::from_static("alice"));
        assert!(RequestUser::from_headers(&headers).is_none());
    }

    #[test]
    fn staff_defaults_to_false() {
        let mut headers = HeaderMap::new();
        headers.insert(USER_HEADER, HeaderValue::from_static("3"));
        assert!(!RequestUser::from_headers(&headers).unwrap().is_staff);
    }
}
