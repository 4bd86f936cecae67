//! Probe endpoints against a live database

mod common;

use axum::http::StatusCode;

#[tokio::test]
#[ignore = "requires database"]
async fn test_static_probes_report_version() {
    let app = common::TestApp::new().await;

    for (path, expected) in [("/health", "healthy"), ("/health/live", "alive")] {
        let (status, body) = app.get(path).await;
        assert_eq!(status, StatusCode::OK, "{}", path);

        let body = common::parse(&body);
        assert_eq!(body["status"], expected);
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
        assert!(body.get("checks").is_none());
    }
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_ready_checks_database_and_secret() {
    let app = common::TestApp::new().await;

    let (status, body) = app.get("/health/ready").await;
    assert_eq!(status, StatusCode::OK);

    let body = common::parse(&body);
    assert_eq!(body["status"], "ready");
    assert_eq!(body["checks"]["database"]["status"], "healthy");
    assert_eq!(body["checks"]["auth"]["status"], "healthy");
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_probes_need_no_token() {
    let app = common::TestApp::new().await;

    let (status, body) = app.get("/api/v1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "Blog API v1");

    let (status, _) = app.get("/health/ready").await;
    assert_ne!(status, StatusCode::UNAUTHORIZED);
}
