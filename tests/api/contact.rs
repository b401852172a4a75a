use wiremock::{
    Mock, ResponseTemplate,
    matchers::{any, header, method, path},
};

use crate::helpers::{RECIPIENT, spawn_app, spawn_app_with, valid_contact};

#[tokio::test]
async fn contact_returns_200_and_the_message_id_for_a_valid_submission() {
    let app = spawn_app().await;

    Mock::given(path("/emails"))
        .and(method("POST"))
        .and(header("Authorization", "Bearer re_test_token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "msg_123"})),
        )
        .expect(1)
        .mount(&app.email_server)
        .await;

    let response = app.post_contact(&valid_contact()).await;

    assert_eq!(200, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(
        body,
        serde_json::json!({"success": true, "messageId": "msg_123"})
    );
}

#[tokio::test]
async fn the_notification_is_addressed_to_the_owner_with_reply_to_the_visitor() {
    let app = spawn_app().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "x"})))
        .expect(1)
        .mount(&app.email_server)
        .await;

    app.post_contact(&valid_contact()).await;

    let request = &app.email_server.received_requests().await.unwrap()[0];
    let body: serde_json::Value = serde_json::from_slice(&request.body).unwrap();
    assert_eq!(body["to"], serde_json::json!([RECIPIENT]));
    assert_eq!(body["reply_to"], "ursula_le_guin@gmail.com");
    assert_eq!(body["subject"], "Portfolio Contact: Collaboration");
    assert_eq!(body["from"], "Portfolio Contact <onboarding@resend.dev>");
    let html = body["html"].as_str().unwrap();
    assert!(html.contains("Ursula"));
    assert!(html.contains("I would love to work with you on a project."));
}

#[tokio::test]
async fn contact_returns_400_and_every_error_for_invalid_submissions() {
    let app = spawn_app().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.email_server)
        .await;

    let response = app
        .post_contact(&serde_json::json!({
            "subject": "",
            "message": "short",
            "senderEmail": "not-an-email"
        }))
        .await;

    assert_eq!(400, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(
        body,
        serde_json::json!({
            "success": false,
            "error": "Subject is required",
            "errors": [
                "Subject is required",
                "Message must be at least 10 characters",
                "Invalid email format"
            ]
        })
    );
}

#[tokio::test]
async fn contact_returns_400_for_a_malformed_body() {
    let app = spawn_app().await;

    let response = app
        .api_client
        .post(format!("{}/api/contact", &app.address))
        .header("Content-Type", "application/json")
        .body("{not json")
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(400, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn markup_is_stripped_before_delivery() {
    let app = spawn_app().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&app.email_server)
        .await;

    app.post_contact(&serde_json::json!({
        "subject": "<b>Hi</b>",
        "message": "<img src=x onerror=alert(1)> hello there"
    }))
    .await;

    let request = &app.email_server.received_requests().await.unwrap()[0];
    let body: serde_json::Value = serde_json::from_slice(&request.body).unwrap();
    assert_eq!(body["subject"], "Portfolio Contact: bHi/b");
    assert!(!body["html"].as_str().unwrap().contains("<img"));
    assert!(body.get("reply_to").is_none());
}

#[tokio::test]
async fn provider_failures_return_a_generic_500_in_production() {
    let app = spawn_app_with(|c| {
        c.application.environment = portfolio_relay::configuration::Environment::Production
    })
    .await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&app.email_server)
        .await;

    let response = app.post_contact(&valid_contact()).await;

    assert_eq!(500, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(
        body,
        serde_json::json!({"success": false, "error": "Internal server error"})
    );
}

#[tokio::test]
async fn provider_failures_expose_the_reason_in_development() {
    let app = spawn_app().await;

    Mock::given(any())
        .respond_with(
            ResponseTemplate::new(403)
                .set_body_json(serde_json::json!({"message": "API key is invalid"})),
        )
        .expect(1)
        .mount(&app.email_server)
        .await;

    let response = app.post_contact(&valid_contact()).await;

    assert_eq!(500, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(
        body["error"],
        "Email provider rejected the message with status 403: API key is invalid"
    );
}
