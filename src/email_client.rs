use std::future::Future;
use std::time::Duration;

use reqwest::{Client, Url};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::domain::ContactAddress;

/// Identifier the email provider assigned to an accepted message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeliveryId(String);

impl DeliveryId {
    pub const UNKNOWN: &'static str = "unknown";

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn unknown() -> Self {
        Self(Self::UNKNOWN.into())
    }
}

impl AsRef<str> for DeliveryId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A single outbound notification.
#[derive(Debug, Clone, Copy)]
pub struct OutgoingEmail<'a> {
    pub to: &'a ContactAddress,
    pub reply_to: Option<&'a str>,
    pub subject: &'a str,
    pub html: &'a str,
}

#[derive(thiserror::Error, Debug)]
pub enum DeliveryError {
    #[error("Email provider rejected the message with status {status}: {message}")]
    Rejected { status: u16, message: String },
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

/// Anything able to deliver an [`OutgoingEmail`] exactly once.
pub trait EmailSender: Send + Sync + 'static {
    fn send_email(
        &self,
        email: OutgoingEmail<'_>,
    ) -> impl Future<Output = Result<DeliveryId, DeliveryError>> + Send;
}

/// Client for the Resend HTTP API.
#[derive(Clone)]
pub struct EmailClient {
    http_client: Client,
    base_url: Url,
    sender: ContactAddress,
    sender_name: String,
    auth_token: SecretString,
}

#[derive(Serialize)]
struct SendEmailRequest<'a> {
    from: String,
    to: Vec<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to: Option<&'a str>,
    subject: &'a str,
    html: &'a str,
}

#[derive(Deserialize)]
struct SendEmailResponse {
    id: Option<String>,
}

#[derive(Deserialize)]
struct ProviderError {
    message: Option<String>,
}

impl EmailClient {
    pub fn new(
        base_url: String,
        sender: ContactAddress,
        sender_name: String,
        auth_token: SecretString,
        timeout: Duration,
    ) -> Result<Self, anyhow::Error> {
        Ok(Self {
            http_client: Client::builder().timeout(timeout).build()?,
            base_url: Url::parse(&base_url)?,
            sender,
            sender_name,
            auth_token,
        })
    }

    fn from_header(&self) -> String {
        format!("{} <{}>", self.sender_name, self.sender.as_ref())
    }
}

impl EmailSender for EmailClient {
    #[tracing::instrument(
        name = "Sending an email through the provider",
        skip(self, email),
        fields(email.subject = %email.subject)
    )]
    async fn send_email(&self, email: OutgoingEmail<'_>) -> Result<DeliveryId, DeliveryError> {
        let url = self
            .base_url
            .join("emails")
            .expect("`emails` is a valid relative URL");

        let body = SendEmailRequest {
            from: self.from_header(),
            to: vec![email.to.as_ref()],
            reply_to: email.reply_to,
            subject: email.subject,
            html: email.html,
        };

        let response = self
            .http_client
            .post(url)
            .bearer_auth(self.auth_token.expose_secret())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ProviderError>()
                .await
                .ok()
                .and_then(|e| e.message)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown").to_owned());
            return Err(DeliveryError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let id = response
            .json::<SendEmailResponse>()
            .await
            .ok()
            .and_then(|r| r.id)
            .filter(|id| !id.is_empty());

        Ok(id.map(DeliveryId::new).unwrap_or_else(DeliveryId::unknown))
    }
}
