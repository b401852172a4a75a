use actix_web::{HttpRequest, HttpResponse, web};

use super::ApiError;
use crate::chat::{ChatError, ChatMessage, ChatService, GeminiClient};
use crate::email_client::EmailClient;
use crate::rate_limit::client_key;

#[derive(serde::Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    messages: Vec<ChatMessage>,
    tools: Option<bool>,
}

#[tracing::instrument(name = "Handling a chat turn", skip(req, body, chat))]
pub async fn send_chat(
    req: HttpRequest,
    body: web::Json<ChatRequest>,
    chat: web::Data<ChatService<GeminiClient, EmailClient>>,
) -> Result<HttpResponse, ApiError> {
    let ChatRequest { messages, tools } = body.into_inner();
    let client = client_key(req.peer_addr());
    let reply = chat
        .send_message(&messages, tools, &client)
        .await
        .map_err(|e| match e {
            ChatError::EmptyConversation => ApiError::BadRequest(e.to_string()),
        })?;

    Ok(HttpResponse::Ok().json(reply))
}
