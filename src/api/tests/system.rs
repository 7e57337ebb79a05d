use super::*;

#[tokio::test]
async fn test_root_greets() {
    let app = router_with(Config::default(), StatusLog::Unconfigured);

    let response = app.oneshot(get("/api/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        serde_json::json!({"message": "Hello World"})
    );
}

#[tokio::test]
async fn test_health_check() {
    let app = router_with(Config::default(), StatusLog::Unconfigured);

    let response = app.oneshot(get("/api/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["ok"], true);
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    let timestamp = json["timestamp"].as_str().unwrap();
    assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());
}

#[tokio::test]
async fn test_openapi_spec_is_served() {
    let app = router_with(Config::default(), StatusLog::Unconfigured);

    let response = app.oneshot(get("/api/openapi.json")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(json["openapi"].as_str().unwrap().starts_with("3."));
    assert!(json["paths"]["/api/download"]["post"].is_object());
}
