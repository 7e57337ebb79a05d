use super::*;
use crate::types::StatusCheck;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use axum::response::Response;
use tower::ServiceExt;

mod system;

/// Router over `config` with the given status store
fn router_with(config: Config, status_log: StatusLog) -> Router {
    let config = Arc::new(config);
    let state = AppState::new(
        Downloader::new(config.clone()),
        Arc::new(status_log),
        config,
    );
    create_router(state)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_bytes(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

async fn body_json(response: Response) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

#[tokio::test]
async fn test_api_server_spawns_and_prepares_scratch_dir() {
    let dir = tempfile::tempdir().unwrap();
    let scratch = dir.path().join("scratch");
    let stale = scratch.join(uuid::Uuid::new_v4().to_string());
    std::fs::create_dir_all(&stale).unwrap();

    let mut config = Config::default();
    config.server.bind_address = "127.0.0.1:0".parse().unwrap();
    config.download.scratch_dir = scratch.clone();
    let config = Arc::new(config);

    let handle = tokio::spawn(start_api_server(config));

    // Poll until the startup purge has run
    let mut purged = false;
    for _ in 0..50 {
        if scratch.is_dir() && !stale.exists() {
            purged = true;
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    }

    handle.abort();
    assert!(purged, "stale workspace should be removed at startup");
}

#[tokio::test]
async fn test_api_server_fails_when_store_directory_is_unusable() {
    let dir = tempfile::tempdir().unwrap();
    // A regular file where the database directory should be
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, b"x").unwrap();

    let mut config = Config::default();
    config.server.bind_address = "127.0.0.1:0".parse().unwrap();
    config.download.scratch_dir = dir.path().join("scratch");
    config.persistence.database_url = Some(blocker);
    config.persistence.database_name = Some("media".into());

    assert!(start_api_server(Arc::new(config)).await.is_err());
}

#[tokio::test]
async fn test_cors_enabled() {
    let app = router_with(Config::default(), StatusLog::Unconfigured);

    let request = Request::builder()
        .uri("/api/health")
        .header("Origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .unwrap(),
        "*"
    );
}

#[tokio::test]
async fn test_cors_specific_origins() {
    let mut config = Config::default();
    config.server.cors_origins = vec!["http://localhost:3000".into()];
    let app = router_with(config, StatusLog::Unconfigured);

    let allowed = Request::builder()
        .uri("/api/health")
        .header("Origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(allowed).await.unwrap();
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .unwrap(),
        "http://localhost:3000"
    );

    let other = Request::builder()
        .uri("/api/health")
        .header("Origin", "http://evil.example")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(other).await.unwrap();
    assert!(
        response
            .headers()
            .get("access-control-allow-origin")
            .is_none()
    );
}

#[tokio::test]
async fn test_cors_disabled() {
    let mut config = Config::default();
    config.server.cors_enabled = false;
    let app = router_with(config, StatusLog::Unconfigured);

    let request = Request::builder()
        .uri("/api/health")
        .header("Origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert!(
        response
            .headers()
            .get("access-control-allow-origin")
            .is_none()
    );
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let app = router_with(Config::default(), StatusLog::Unconfigured);
    let response = app.oneshot(get("/api/nope")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
