use once_cell::sync::Lazy;
use portfolio_relay::{
    configuration::{Settings, get_configuration},
    startup::Application,
    telemetry::{get_subscriber, init_subscriber},
};
use secrecy::SecretString;
use wiremock::MockServer;

static TRACING: Lazy<()> = Lazy::new(|| {
    let default_filter_level = "info".to_string();
    let subscriber_name = "test".to_string();

    if std::env::var("TEST_LOG").is_ok() {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::stdout);
        init_subscriber(subscriber);
    } else {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::sink);
        init_subscriber(subscriber);
    }
});

pub const ALLOWED_ORIGIN: &str = "http://localhost:5173";
pub const RECIPIENT: &str = "owner@example.com";

pub struct TestApp {
    pub address: String,
    pub email_server: MockServer,
    pub chat_server: MockServer,
    pub api_client: reqwest::Client,
}

impl TestApp {
    pub async fn post_contact(&self, body: &serde_json::Value) -> reqwest::Response {
        self.api_client
            .post(format!("{}/api/contact", &self.address))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn post_chat(&self, body: &serde_json::Value) -> reqwest::Response {
        self.api_client
            .post(format!("{}/api/chat", &self.address))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.api_client
            .get(format!("{}{}", &self.address, path))
            .send()
            .await
            .expect("Failed to execute request.")
    }
}

pub fn valid_contact() -> serde_json::Value {
    serde_json::json!({
        "subject": "Collaboration",
        "message": "I would love to work with you on a project.",
        "senderName": "Ursula",
        "senderEmail": "ursula_le_guin@gmail.com"
    })
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(|_| {}).await
}

/// Spawns the server on a random port, with both providers pointed at
/// fresh mock servers. `customise` runs last.
pub async fn spawn_app_with(customise: impl FnOnce(&mut Settings)) -> TestApp {
    Lazy::force(&TRACING);

    let email_server = MockServer::start().await;
    let chat_server = MockServer::start().await;

    let config = {
        let mut c = get_configuration().expect("Failed to read configuration");
        c.application.port = 0;
        c.application.allowed_origins = vec![ALLOWED_ORIGIN.into()];
        c.email_client.base_url = email_server.uri();
        c.email_client.recipient_email = RECIPIENT.into();
        c.email_client.auth_token = Some(SecretString::from("re_test_token"));
        c.chat.base_url = chat_server.uri();
        c.chat.api_key = None;
        customise(&mut c);
        c
    };

    let app = Application::build(config)
        .await
        .expect("Failed to build application.");
    let port = app.get_port();
    let _ = tokio::spawn(app.run_until_stopped());

    TestApp {
        address: format!("http://127.0.0.1:{port}"),
        email_server,
        chat_server,
        api_client: reqwest::Client::new(),
    }
}
