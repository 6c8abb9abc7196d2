use axum::body::Body;
use axum::body::to_bytes;
use axum::http::Request;
use photoprompt_bot::server;
use tower::util::ServiceExt;

async fn get(uri: &str) -> (u16, String) {
    let app = server::build_router(None);

    let req = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    let resp = app.oneshot(req).await.expect("service call failed");
    let status = resp.status().as_u16();
    let body_bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(body_bytes.to_vec()).unwrap())
}

#[tokio::test]
async fn health_endpoint_returns_ok() {
    let (status, body) = get("/health").await;
    assert_eq!(status, 200);
    assert!(body.contains("\"status\":\"ok\""));
}

#[tokio::test]
async fn root_endpoint_answers_liveness_probes() {
    let (status, body) = get("/").await;
    assert_eq!(status, 200);
    assert!(body.contains("\"status\":\"ok\""));
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let (status, _) = get("/nope").await;
    assert_eq!(status, 404);
}
