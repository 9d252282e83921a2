use crate::{SwitchState, Toggles};
use axum::Json;
use axum::extract::State;
use campus_derive::api_handler;
use campus_domain::constants::TOGGLES_TAG;
use campus_kernel::server::{ApiError, ApiState};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

#[api_handler(
    get,
    path = "/switches",
    responses((status = OK, description = "Registered switches", body = [SwitchState])),
    tag = TOGGLES_TAG,
)]
pub(crate) async fn list_switches(
    State(state): State<ApiState>,
) -> Result<Json<Vec<SwitchState>>, ApiError> {
    let toggles = state.try_get_slice::<Toggles>()?;
    Ok(Json(toggles.registry.snapshot()))
}

/// Routes mounted under `/api/toggles/v1`.
pub fn router() -> OpenApiRouter<ApiState> {
    OpenApiRouter::new().routes(routes!(list_switches))
}
