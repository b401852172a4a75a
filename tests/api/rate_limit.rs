use wiremock::{Mock, ResponseTemplate, matchers::any};

use crate::helpers::{spawn_app, spawn_app_with, valid_contact};

#[tokio::test]
async fn the_sixth_contact_submission_is_rejected() {
    let app = spawn_app().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(5)
        .mount(&app.email_server)
        .await;

    for _ in 0..5 {
        assert_eq!(200, app.post_contact(&valid_contact()).await.status().as_u16());
    }
    let response = app.post_contact(&valid_contact()).await;

    assert_eq!(429, response.status().as_u16());
    assert!(response.headers().contains_key("retry-after"));
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(
        body,
        serde_json::json!({
            "success": false,
            "error": "Too many contact form submissions. Please try again in 15 minutes."
        })
    );
}

#[tokio::test]
async fn rejected_submissions_count_towards_the_contact_limit() {
    let app = spawn_app().await;

    for _ in 0..5 {
        let response = app.post_contact(&serde_json::json!({})).await;
        assert_eq!(400, response.status().as_u16());
    }

    assert_eq!(429, app.post_contact(&valid_contact()).await.status().as_u16());
}

#[tokio::test]
async fn the_general_limit_applies_to_every_api_route() {
    let app = spawn_app_with(|c| c.rate_limit.max_requests = 3).await;

    for _ in 0..3 {
        let response = app.get("/api").await;
        assert_eq!(200, response.status().as_u16());
        assert_eq!(response.headers()["ratelimit-limit"], "3");
    }
    let response = app.get("/api/contact/health").await;

    assert_eq!(429, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(
        body["error"],
        "Too many requests from this IP, please try again later."
    );
}

#[tokio::test]
async fn remaining_requests_are_advertised() {
    let app = spawn_app().await;

    let response = app.get("/api").await;

    assert_eq!(response.headers()["ratelimit-limit"], "100");
    assert_eq!(response.headers()["ratelimit-remaining"], "99");
}
