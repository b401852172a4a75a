use secrecy::SecretString;
use wiremock::{
    Mock, ResponseTemplate,
    matchers::{any, header, method, path},
};

use crate::helpers::{TestApp, spawn_app, spawn_app_with, valid_contact};

async fn spawn_configured_app() -> TestApp {
    spawn_app_with(|c| c.chat.api_key = Some(SecretString::from("gemini-test-key"))).await
}

fn conversation() -> serde_json::Value {
    serde_json::json!({
        "messages": [
            {"role": "assistant", "content": "Hi! How can I help?"},
            {"role": "user", "content": "Can you tell the owner I'd like to hire them?"}
        ]
    })
}

#[tokio::test]
async fn chat_without_an_api_key_reports_missing_configuration() {
    let app = spawn_app().await;

    let response = app.post_chat(&conversation()).await;

    assert_eq!(200, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(
        body,
        serde_json::json!({
            "message": "AI service is not configured. Please check your API key.",
            "error": "MISSING_API_KEY"
        })
    );
}

#[tokio::test]
async fn chat_rejects_an_empty_conversation() {
    let app = spawn_app().await;

    let response = app.post_chat(&serde_json::json!({"messages": []})).await;

    assert_eq!(400, response.status().as_u16());
}

#[tokio::test]
async fn chat_returns_the_model_reply() {
    let app = spawn_configured_app().await;

    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.5-flash:generateContent"))
        .and(header("x-goog-api-key", "gemini-test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "candidates": [{"content": {"parts": [{"text": "Happy to pass that on!"}]}}]
        })))
        .expect(1)
        .mount(&app.chat_server)
        .await;

    let response = app.post_chat(&conversation()).await;

    assert_eq!(200, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(
        body,
        serde_json::json!({"message": "Happy to pass that on!"})
    );
}

#[tokio::test]
async fn a_send_contact_email_tool_call_delivers_an_email() {
    let app = spawn_configured_app().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "candidates": [{"content": {"parts": [{
                "functionCall": {
                    "name": "send_contact_email",
                    "args": {
                        "subject": "Hiring enquiry",
                        "message": "A visitor would like to hire you for a project.",
                        "senderEmail": "visitor@example.com"
                    }
                }
            }]}}]
        })))
        .expect(1)
        .mount(&app.chat_server)
        .await;
    Mock::given(path("/emails"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "m1"})))
        .expect(1)
        .mount(&app.email_server)
        .await;

    let response = app.post_chat(&conversation()).await;

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["message"], "I'm sorry, I couldn't process that request.");
    assert_eq!(body["toolCalls"][0]["name"], "send_contact_email");
    assert_eq!(body["toolCalls"][0]["result"]["success"], true);
    assert_eq!(
        body["toolCalls"][0]["result"]["message"],
        "Email sent successfully! I will get back to you soon."
    );
}

#[tokio::test]
async fn provider_errors_become_friendly_replies() {
    let app = spawn_configured_app().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": {
                "code": 400,
                "message": "API key not valid. Please pass a valid API key.",
                "status": "INVALID_ARGUMENT"
            }
        })))
        .expect(1)
        .mount(&app.chat_server)
        .await;

    let response = app.post_chat(&conversation()).await;

    assert_eq!(200, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(
        body["message"],
        "The AI service is temporarily unavailable. Please contact the administrator to renew the API key."
    );
}

fn contact_email_calls(count: usize) -> serde_json::Value {
    let call = serde_json::json!({
        "functionCall": {
            "name": "send_contact_email",
            "args": {
                "subject": "Hiring enquiry",
                "message": "A visitor would like to hire you for a project."
            }
        }
    });
    let parts = vec![call; count];
    serde_json::json!({
        "candidates": [{"content": {"parts": parts}}]
    })
}

#[tokio::test]
async fn chat_tools_and_the_contact_form_share_the_contact_limit() {
    let app = spawn_configured_app().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200).set_body_json(contact_email_calls(4)))
        .mount(&app.chat_server)
        .await;
    Mock::given(path("/emails"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "m1"})))
        .expect(5)
        .mount(&app.email_server)
        .await;

    assert_eq!(200, app.post_contact(&valid_contact()).await.status().as_u16());
    let first: serde_json::Value = app.post_chat(&conversation()).await.json().await.unwrap();
    let second: serde_json::Value = app.post_chat(&conversation()).await.json().await.unwrap();
    let form = app.post_contact(&valid_contact()).await;

    for call in first["toolCalls"].as_array().unwrap() {
        assert_eq!(call["result"]["success"], true);
    }
    for call in second["toolCalls"].as_array().unwrap() {
        assert_eq!(call["result"]["success"], false);
        assert_eq!(
            call["result"]["error"],
            "Too many contact form submissions. Please try again in 15 minutes."
        );
    }
    assert_eq!(429, form.status().as_u16());
}
