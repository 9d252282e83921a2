use crate::Discussion;
use crate::gate::Endpoint;
use crate::middleware::{GateState, GatedCourse, discussion_accessible};
use axum::{Extension, Json};
use campus_derive::{api_handler, api_model};
use campus_domain::CourseKey;
use campus_domain::constants::DISCUSSION_TAG;
use campus_kernel::server::{ApiState, ApiStateError};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

#[api_model]
/// Acknowledgement returned once a request passed the access gate
pub struct Accepted {
    pub accepted: bool,
    #[cfg_attr(feature = "server", schema(value_type = String))]
    pub course_id: CourseKey,
}

impl From<GatedCourse> for Accepted {
    fn from(GatedCourse(course): GatedCourse) -> Self {
        Self { accepted: true, course_id: course.key }
    }
}

#[api_handler(
    post,
    path = "/threads",
    responses(
        (status = OK, description = "Thread request accepted", body = Accepted),
        (status = BAD_REQUEST, description = "course_id missing"),
        (status = FORBIDDEN, description = "Discussions are in a black out period"),
        (status = NOT_FOUND, description = "Unknown or malformed course"),
    ),
    tag = DISCUSSION_TAG,
)]
pub(crate) async fn create_thread(Extension(course): Extension<GatedCourse>) -> Json<Accepted> {
    Json(course.into())
}

#[api_handler(
    post,
    path = "/comments",
    responses(
        (status = OK, description = "Comment request accepted", body = Accepted),
        (status = BAD_REQUEST, description = "thread_id missing"),
        (status = FORBIDDEN, description = "Discussions are in a black out period"),
        (status = NOT_FOUND, description = "Unknown thread or course"),
        (status = BAD_GATEWAY, description = "Comments service failure"),
    ),
    tag = DISCUSSION_TAG,
)]
pub(crate) async fn create_comment(Extension(course): Extension<GatedCourse>) -> Json<Accepted> {
    Json(course.into())
}

/// Routes mounted under `/api/discussion/v1`, each behind the access gate.
///
/// # Errors
/// [`ApiStateError`] when the discussion slice is not registered in `state`.
pub fn router(state: &ApiState) -> Result<OpenApiRouter<ApiState>, ApiStateError> {
    let discussion = state.try_get_slice::<Discussion>()?;
    let gated = |endpoint| GateState {
        gate: discussion.gate.clone(),
        endpoint,
        body_limit: discussion.body_limit,
    };

    let threads = OpenApiRouter::new().routes(routes!(create_thread)).layer(
        axum::middleware::from_fn_with_state(gated(Endpoint::Threads), discussion_accessible),
    );
    let comments = OpenApiRouter::new().routes(routes!(create_comment)).layer(
        axum::middleware::from_fn_with_state(gated(Endpoint::Comments), discussion_accessible),
    );

    Ok(threads.merge(comments))
}
