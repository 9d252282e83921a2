use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use campus_kernel::domain::UserId;
use campus_kernel::server::{ApiError, RequestUser};
use serde_json::{Value, json};
use tower::ServiceExt;

async fn read_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn forbidden_renders_errors_list() {
    let response = ApiError::Forbidden {
        message: "Discussions are in a black out period.".into(),
        context: None,
    }
    .into_response();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(
        read_json(response).await,
        json!({ "errors": ["Discussions are in a black out period."] })
    );
}

#[tokio::test]
async fn handler_without_identity_is_rejected() {
    async fn whoami(user: RequestUser) -> String {
        user.id.to_string()
    }

    let app = Router::new().route("/whoami", get(whoami));
    let response = app
        .oneshot(Request::builder().uri("/whoami").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = read_json(response).await;
    assert_eq!(body["errors"][0], "Authentication credentials were not provided.");
}

#[tokio::test]
async fn handler_sees_identity_from_extensions() {
    async fn whoami(user: RequestUser) -> String {
        format!("{}:{}", user.id, user.is_staff)
    }

    let app = Router::new().route("/whoami", get(whoami));
    let mut request = Request::builder().uri("/whoami").body(Body::empty()).unwrap();
    request.extensions_mut().insert(RequestUser::new(UserId(9), true));

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"9:true");
}
