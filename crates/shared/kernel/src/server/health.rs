use super::ApiState;
use axum::extract::State;
use axum::http::header;
use axum::{Json, response::IntoResponse};
use campus_derive::{api_handler, api_model};
use campus_domain::constants::SYSTEM_TAG;

#[api_model]
/// Liveness report
struct HealthResponse {
    /// Always `up` while the process serves requests
    status: String,
    version: String,
    /// Seconds since startup
    uptime: u64,
    /// Feature slices registered in the API state
    slices: usize,
}

#[api_handler(
    get,
    path = "/health",
    responses((status = OK, description = "Service is up", body = HealthResponse)),
    tag = SYSTEM_TAG,
)]
pub(super) async fn health_handler(State(state): State<ApiState>) -> impl IntoResponse {
    let body = HealthResponse {
        status: "up".to_owned(),
        version: env!("CARGO_PKG_VERSION").to_owned(),
        uptime: state.uptime().as_secs(),
        slices: state.slice_ids().count(),
    };

    (
        [
            (header::CACHE_CONTROL, "no-store, no-cache, must-revalidate"),
            (header::PRAGMA, "no-cache"),
        ],
        Json(body),
    )
}
