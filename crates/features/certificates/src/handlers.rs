use crate::Certificates;
use crate::error::CertificateError;
use crate::ledger::FailedTask;
use crate::task::GenerateCertificate;
use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use campus_derive::{api_handler, api_model};
use campus_domain::constants::CERTIFICATES_TAG;
use campus_kernel::server::{ApiError, ApiState};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

#[api_model]
/// Receipt for a queued certificate task
pub struct TaskAccepted {
    pub task_id: String,
}

#[api_handler(
    post,
    path = "/generate",
    responses(
        (status = ACCEPTED, description = "Task queued", body = TaskAccepted),
        (status = SERVICE_UNAVAILABLE, description = "Queue full or worker stopped"),
    ),
    tag = CERTIFICATES_TAG,
)]
pub(crate) async fn generate(
    State(state): State<ApiState>,
    Json(args): Json<GenerateCertificate>,
) -> Result<(StatusCode, Json<TaskAccepted>), ApiError> {
    let certificates = state.try_get_slice::<Certificates>()?;
    let task_id = certificates.queue.enqueue(args).map_err(into_api_error)?;

    Ok((StatusCode::ACCEPTED, Json(TaskAccepted { task_id })))
}

#[api_handler(
    get,
    path = "/failed",
    responses((status = OK, description = "Permanently failed tasks", body = [FailedTask])),
    tag = CERTIFICATES_TAG,
)]
pub(crate) async fn failed_tasks(
    State(state): State<ApiState>,
) -> Result<Json<Vec<FailedTask>>, ApiError> {
    let certificates = state.try_get_slice::<Certificates>()?;
    Ok(Json(certificates.ledger.list()))
}

fn into_api_error(err: CertificateError) -> ApiError {
    match err {
        CertificateError::QueueFull { .. } | CertificateError::QueueClosed { .. } => {
            ApiError::Unavailable { message: err.to_string().into(), context: None }
        },
        other => ApiError::from(other.to_string()),
    }
}

/// Routes mounted under `/api/certificates/v1`.
pub fn router() -> OpenApiRouter<ApiState> {
    OpenApiRouter::new().routes(routes!(generate)).routes(routes!(failed_tasks))
}
