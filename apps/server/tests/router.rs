use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use campus::domain::DiscussionRole;
use campus::domain::config::{ApiConfig, CourseSettings, RoleGrant};
use campus::kernel::server::{STAFF_HEADER, USER_HEADER};
use campus_server::Server;
use serde_json::{Value, json};
use tower::ServiceExt;

const CLOSED: &str = "course-v1:edX+Closed+2024";
const OPEN: &str = "course-v1:edX+Open+2024";
const MODERATOR: &str = "7";

fn config() -> ApiConfig {
    let mut cfg = ApiConfig::default();
    cfg.discussion.courses = vec![
        CourseSettings {
            key: CLOSED.to_owned(),
            display_name: "Closed".to_owned(),
            discussion_blackouts: vec![vec!["2000-01-01".to_owned(), "2999-01-01".to_owned()]],
        },
        CourseSettings { key: OPEN.to_owned(), display_name: "Open".to_owned(), ..Default::default() },
    ];
    cfg.discussion.roles =
        vec![RoleGrant { user: 7, course: CLOSED.to_owned(), roles: DiscussionRole::MODERATOR }];
    cfg
}

async fn app() -> Router {
    let server = Server::builder().config(config()).build().await.expect("server builds");
    server.app().expect("router builds")
}

fn post(uri: &str, user: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(user) = user {
        builder = builder.header(USER_HEADER, user);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn read_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_is_served() {
    let response = app()
        .await
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["status"], "up");
    assert_eq!(body["slices"], 3);
}

#[tokio::test]
async fn learner_is_blocked_during_blackout() {
    let response = app()
        .await
        .oneshot(post("/api/discussion/v1/threads", Some("1"), json!({ "course_id": CLOSED })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(read_json(response).await, json!({ "errors": ["Discussions are in a black out period."] }));
}

#[tokio::test]
async fn moderator_passes_blackout() {
    let response = app()
        .await
        .oneshot(post("/api/discussion/v1/threads", Some(MODERATOR), json!({ "course_id": CLOSED })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await, json!({ "accepted": true, "courseId": CLOSED }));
}

#[tokio::test]
async fn staff_header_grants_privilege() {
    let mut request = post("/api/discussion/v1/threads", Some("2"), json!({ "course_id": CLOSED }));
    request.headers_mut().insert(STAFF_HEADER, "true".parse().unwrap());

    let response = app().await.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn open_course_is_reachable_by_anyone_identified() {
    let response = app()
        .await
        .oneshot(post("/api/discussion/v1/threads", Some("1"), json!({ "course_id": OPEN })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn identity_is_required() {
    let response = app()
        .await
        .oneshot(post("/api/discussion/v1/threads", None, json!({ "course_id": OPEN })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn comments_require_thread_id() {
    let response = app()
        .await
        .oneshot(post("/api/discussion/v1/comments", Some("1"), json!({ "body": "hi" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(read_json(response).await, json!({ "thread_id": ["This field is required."] }));
}

#[tokio::test]
async fn switches_are_listed() {
    let response = app()
        .await
        .oneshot(Request::builder().uri("/api/toggles/v1/switches").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    let names: Vec<&str> = body.as_array().unwrap().iter().filter_map(|s| s["name"].as_str()).collect();
    assert!(names.contains(&"third_party_auth.enable_multiple_sso_accounts_association_to_saml_user"));
}

#[tokio::test]
async fn certificate_requests_are_queued() {
    let response = app()
        .await
        .oneshot(post(
            "/api/certificates/v1/generate",
            None,
            json!({ "student": 5, "course_key": OPEN, "expected_verification_status": "approved" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    assert!(read_json(response).await["taskId"].is_string());
}
