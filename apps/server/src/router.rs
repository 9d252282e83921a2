use crate::gateway;
use anyhow::{Context, Result};
use axum::Router;
use campus::features::{certificates, discussion, toggles};
use campus::kernel::server::ApiState;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_scalar::{Scalar, Servable};

#[derive(OpenApi)]
struct ApiDoc;

pub(crate) fn init(state: ApiState) -> Result<Router> {
    let api = ApiDoc::openapi();
    let discussion = discussion::router(&state).context("Discussion routes need their slice")?;

    // Separate the OpenAPI routes and the API documentation object
    let (openapi_routes, api_doc) = OpenApiRouter::with_openapi(api)
        .merge(campus::server::router::system_router())
        .nest("/api/toggles/v1", toggles::router())
        .nest("/api/discussion/v1", discussion)
        .nest("/api/certificates/v1", certificates::router())
        .layer(axum::middleware::from_fn(gateway::identify))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
        .split_for_parts();

    // Create the Scalar UI routes
    let scalar_routes = Scalar::with_url("/api", api_doc);

    Ok(Router::new().merge(openapi_routes).merge(scalar_routes))
}
