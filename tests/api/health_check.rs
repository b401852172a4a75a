use crate::helpers::{spawn_app, spawn_app_with};

#[tokio::test]
async fn health_check_works() {
    let app = spawn_app().await;

    let response = app.get("/api/health").await;

    assert!(response.status().is_success());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["status"], "healthy");
    assert!(body["timestamp"].as_str().unwrap().ends_with('Z'));
}

#[tokio::test]
async fn health_check_is_not_rate_limited() {
    let app = spawn_app_with(|c| c.rate_limit.max_requests = 2).await;

    for _ in 0..5 {
        assert_eq!(200, app.get("/api/health").await.status().as_u16());
    }
}

#[tokio::test]
async fn contact_health_reports_the_service_is_running() {
    let app = spawn_app().await;

    let response = app.get("/api/contact/health").await;

    assert_eq!(200, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(
        body,
        serde_json::json!({"success": true, "message": "Contact service is running"})
    );
}
