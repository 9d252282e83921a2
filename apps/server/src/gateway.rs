use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use campus::kernel::server::RequestUser;

/// Trusted-gateway identity: the reverse proxy in front of the server has
/// authenticated the caller and forwards the result as headers.
pub(crate) async fn identify(mut request: Request, next: Next) -> Response {
    if let Some(user) = RequestUser::from_headers(request.headers()) {
        request.extensions_mut().insert(user);
    }
    next.run(request).await
}
