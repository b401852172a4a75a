use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::ContactSubmission;
use crate::email_client::EmailSender;
use crate::rate_limit::{ContactRateLimiter, Decision};
use crate::relay::ContactRelay;

pub const CONTACT_EMAIL_SENT: &str = "Email sent successfully! I will get back to you soon.";
pub const AVAILABILITY: &str =
    "I am currently available for new opportunities and consultations. Feel free to reach out!";

/// A function call requested by the model, with the local result once run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCall {
    pub name: String,
    #[serde(default)]
    pub arguments: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub result: Option<ToolResult>,
}

impl ToolCall {
    pub fn new(name: impl Into<String>, arguments: Map<String, Value>) -> Self {
        Self {
            name: name.into(),
            arguments,
            result: None,
        }
    }

    fn argument(&self, key: &str) -> Option<String> {
        match self.arguments.get(key)? {
            Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
            Value::Null | Value::String(_) => None,
            other => Some(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub success: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
}

impl ToolResult {
    fn succeeded(message: impl Into<String>) -> Self {
        Self {
            success: Some(true),
            message: Some(message.into()),
            error: None,
        }
    }

    fn failed(error: impl Into<String>) -> Self {
        Self {
            success: Some(false),
            message: None,
            error: Some(error.into()),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ToolParameter {
    pub name: &'static str,
    pub description: &'static str,
    pub required: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct ToolDeclaration {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: &'static [ToolParameter],
}

pub const TOOL_DECLARATIONS: &[ToolDeclaration] = &[
    ToolDeclaration {
        name: "send_contact_email",
        description: "Send a contact/inquiry email to the site owner on behalf of the user",
        parameters: &[
            ToolParameter {
                name: "subject",
                description: "Email subject line",
                required: true,
            },
            ToolParameter {
                name: "message",
                description: "Email message content",
                required: true,
            },
            ToolParameter {
                name: "senderName",
                description: "Name of the person sending the email",
                required: false,
            },
            ToolParameter {
                name: "senderEmail",
                description: "Email address of the sender for reply",
                required: false,
            },
        ],
    },
    ToolDeclaration {
        name: "get_project_details",
        description: "Get detailed information about a specific project by name or category",
        parameters: &[ToolParameter {
            name: "query",
            description: "Project name or category to search for",
            required: true,
        }],
    },
    ToolDeclaration {
        name: "get_availability",
        description: "Check the site owner's current availability for projects or consultations",
        parameters: &[],
    },
];

/// Runs tool calls locally. Results are never fed back to the model.
///
/// Emails sent through `send_contact_email` count against the same contact
/// limit as `POST /api/contact`.
pub struct ToolExecutor<E> {
    relay: Arc<ContactRelay<E>>,
    contact_limiter: Arc<ContactRateLimiter>,
}

impl<E> Clone for ToolExecutor<E> {
    fn clone(&self) -> Self {
        Self {
            relay: Arc::clone(&self.relay),
            contact_limiter: Arc::clone(&self.contact_limiter),
        }
    }
}

impl<E: EmailSender> ToolExecutor<E> {
    pub fn new(relay: Arc<ContactRelay<E>>, contact_limiter: Arc<ContactRateLimiter>) -> Self {
        Self {
            relay,
            contact_limiter,
        }
    }

    /// `client` is the key the caller is rate limited under.
    #[tracing::instrument(
        name = "Executing a tool call",
        skip(self, call),
        fields(tool = %call.name)
    )]
    pub async fn execute(&self, call: &ToolCall, client: &str) -> ToolResult {
        match call.name.as_str() {
            "send_contact_email" => self.send_contact_email(call, client).await,
            "get_project_details" => {
                let query = call.argument("query").unwrap_or_default();
                ToolResult::succeeded(format!(
                    "Project details for \"{query}\" would be shown here. This feature is coming soon!"
                ))
            }
            "get_availability" => ToolResult::succeeded(AVAILABILITY),
            other => {
                tracing::warn!("Model requested an unknown tool");
                ToolResult {
                    success: None,
                    message: None,
                    error: Some(format!("Tool {other} is not implemented")),
                }
            }
        }
    }

    async fn send_contact_email(&self, call: &ToolCall, client: &str) -> ToolResult {
        let (Some(subject), Some(message)) = (call.argument("subject"), call.argument("message"))
        else {
            return ToolResult::failed("Subject and message are required");
        };

        let limiter = &self.contact_limiter.0;
        if let Decision::Limited { .. } = limiter.check(client) {
            tracing::warn!("Contact limit reached through the chat tools");
            return ToolResult::failed(limiter.rejection_message());
        }

        let submission = ContactSubmission {
            subject: Some(subject),
            message: Some(message),
            sender_name: call.argument("senderName"),
            sender_email: call.argument("senderEmail"),
        };
        match self.relay.relay(submission).await {
            Ok(_) => ToolResult::succeeded(CONTACT_EMAIL_SENT),
            Err(e) => ToolResult::failed(e.to_string()),
        }
    }
}
