use serde::{Deserialize, Serialize};

use super::client::{ChatClientError, GenerationRequest, GenerativeChatClient};
use super::tools::{TOOL_DECLARATIONS, ToolCall, ToolExecutor};
use crate::email_client::EmailSender;

pub const NOT_CONFIGURED_MESSAGE: &str = "AI service is not configured. Please check your API key.";
pub const NOT_CONFIGURED_CODE: &str = "MISSING_API_KEY";
pub const EMPTY_REPLY_MESSAGE: &str = "I'm sorry, I couldn't process that request.";
pub const KEY_PROBLEM_MESSAGE: &str =
    "The AI service is temporarily unavailable. Please contact the administrator to renew the API key.";
pub const UNAVAILABLE_MESSAGE: &str =
    "I'm experiencing technical difficulties. Please try again in a moment.";
pub const GENERIC_APOLOGY_MESSAGE: &str =
    "I apologize, but I'm having trouble processing your request right now. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatReply {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ChatReply {
    fn text(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            tool_calls: None,
            error: None,
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ChatError {
    #[error("The conversation must contain at least one message")]
    EmptyConversation,
}

/// Answers chat turns through a generative model and runs the tools it
/// asks for.
pub struct ChatService<C, E> {
    client: Option<C>,
    tools: ToolExecutor<E>,
    system_instruction: String,
    enable_tools: bool,
}

impl<C, E> ChatService<C, E>
where
    C: GenerativeChatClient,
    E: EmailSender,
{
    pub fn new(
        client: Option<C>,
        tools: ToolExecutor<E>,
        system_instruction: String,
        enable_tools: bool,
    ) -> Self {
        Self {
            client,
            tools,
            system_instruction,
            enable_tools,
        }
    }

    /// Provider failures never surface as errors; they become a friendly
    /// reply instead.
    #[tracing::instrument(
        name = "Answering a chat turn",
        skip(self, messages),
        fields(turns = messages.len())
    )]
    pub async fn send_message(
        &self,
        messages: &[ChatMessage],
        enable_tools: Option<bool>,
        client: &str,
    ) -> Result<ChatReply, ChatError> {
        if messages.is_empty() {
            return Err(ChatError::EmptyConversation);
        }
        let Some(chat_client) = &self.client else {
            tracing::warn!("Chat requested but no API key is configured");
            return Ok(ChatReply {
                message: NOT_CONFIGURED_MESSAGE.into(),
                tool_calls: None,
                error: Some(NOT_CONFIGURED_CODE.into()),
            });
        };

        let use_tools = enable_tools.unwrap_or(true) && self.enable_tools;
        let reply = chat_client
            .generate(GenerationRequest {
                system_instruction: &self.system_instruction,
                messages,
                tools: use_tools.then_some(TOOL_DECLARATIONS),
            })
            .await;

        let reply = match reply {
            Ok(reply) => reply,
            Err(e) => {
                tracing::error!(error.message = %e, "Generative API call failed");
                return Ok(ChatReply::text(friendly_message(&e)));
            }
        };

        let mut tool_calls = reply.function_calls;
        for call in &mut tool_calls {
            call.result = Some(self.tools.execute(call, client).await);
        }

        Ok(ChatReply {
            message: reply.text.unwrap_or_else(|| EMPTY_REPLY_MESSAGE.into()),
            tool_calls: (!tool_calls.is_empty()).then_some(tool_calls),
            error: None,
        })
    }
}

fn friendly_message(error: &ChatClientError) -> &'static str {
    let detail = error.to_string();
    if ["API key expired", "API_KEY_INVALID", "INVALID_ARGUMENT"]
        .iter()
        .any(|marker| detail.contains(marker))
    {
        KEY_PROBLEM_MESSAGE
    } else if detail.contains("not found") || detail.contains("NOT_FOUND") {
        UNAVAILABLE_MESSAGE
    } else {
        GENERIC_APOLOGY_MESSAGE
    }
}
