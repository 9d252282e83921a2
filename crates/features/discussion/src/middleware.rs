use crate::error::DiscussionError;
use crate::gate::{AccessGate, Endpoint};
use axum::body::Body;
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use campus_domain::Course;
use campus_kernel::server::{ApiError, RequestUser};
use futures_util::StreamExt;
use serde_json::{Map, Value};

/// Middleware state: the gate plus the endpoint it guards.
#[derive(Debug, Clone)]
pub struct GateState {
    pub gate: AccessGate,
    pub endpoint: Endpoint,
    pub body_limit: usize,
}

/// The course a gated request was allowed into, for the wrapped handler.
#[derive(Debug, Clone)]
pub struct GatedCourse(pub Course);

/// Runs [`AccessGate::check`] before the wrapped handler.
///
/// The body is buffered so the gate can read it and is handed on unchanged.
/// An empty or non-object body is read as `{}`, which fails on the missing
/// context field.
pub async fn discussion_accessible(
    State(state): State<GateState>,
    user: RequestUser,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let (mut parts, body) = request.into_parts();
    let bytes = buffer(body, state.body_limit).await?;

    let payload = serde_json::from_slice::<Value>(&bytes)
        .ok()
        .filter(Value::is_object)
        .unwrap_or_else(|| Value::Object(Map::new()));

    let course = state.gate.check(&user, state.endpoint, &payload).await?;
    parts.extensions.insert(GatedCourse(course));

    Ok(next.run(Request::from_parts(parts, Body::from(bytes))).await)
}

/// Reads the whole body, failing as soon as it grows past `limit`.
async fn buffer(body: Body, limit: usize) -> Result<Vec<u8>, DiscussionError> {
    let mut bytes = Vec::new();
    let mut stream = body.into_data_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|err| DiscussionError::UnreadableBody {
            message: err.to_string().into(),
            context: None,
        })?;
        if bytes.len() + chunk.len() > limit {
            return Err(DiscussionError::PayloadTooLarge { limit, context: None });
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(bytes)
}
