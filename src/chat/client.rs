use std::future::Future;
use std::time::Duration;

use reqwest::{Client, Url};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{ChatMessage, ChatRole, ToolCall, ToolDeclaration};

pub struct GenerationRequest<'a> {
    pub system_instruction: &'a str,
    pub messages: &'a [ChatMessage],
    pub tools: Option<&'a [ToolDeclaration]>,
}

/// Text the model answered with plus any function calls it asked for.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelReply {
    pub text: Option<String>,
    pub function_calls: Vec<ToolCall>,
}

#[derive(thiserror::Error, Debug)]
pub enum ChatClientError {
    #[error("{message}")]
    Api { status: u16, message: String },
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

pub trait GenerativeChatClient: Send + Sync + 'static {
    fn generate(
        &self,
        request: GenerationRequest<'_>,
    ) -> impl Future<Output = Result<ModelReply, ChatClientError>> + Send;
}

/// Client for the Gemini `generateContent` endpoint.
pub struct GeminiClient {
    http_client: Client,
    base_url: Url,
    model: String,
    api_key: SecretString,
}

impl GeminiClient {
    pub fn new(
        base_url: String,
        model: String,
        api_key: SecretString,
        timeout: Duration,
    ) -> Result<Self, anyhow::Error> {
        Ok(Self {
            http_client: Client::builder().timeout(timeout).build()?,
            base_url: Url::parse(&base_url)?,
            model,
            api_key,
        })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<ToolSet<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<TextPart<'a>>,
}

#[derive(Serialize)]
struct TextPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ToolSet<'a> {
    function_declarations: Vec<FunctionDeclaration<'a>>,
}

#[derive(Serialize)]
struct FunctionDeclaration<'a> {
    name: &'a str,
    description: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parameters: Option<Value>,
}

impl<'a> From<&'a ToolDeclaration> for FunctionDeclaration<'a> {
    fn from(tool: &'a ToolDeclaration) -> Self {
        let parameters = (!tool.parameters.is_empty()).then(|| {
            let properties: Map<String, Value> = tool
                .parameters
                .iter()
                .map(|p| {
                    (
                        p.name.to_owned(),
                        serde_json::json!({"type": "string", "description": p.description}),
                    )
                })
                .collect();
            let required: Vec<&str> = tool
                .parameters
                .iter()
                .filter(|p| p.required)
                .map(|p| p.name)
                .collect();
            serde_json::json!({
                "type": "object",
                "properties": properties,
                "required": required,
            })
        });

        Self {
            name: tool.name,
            description: tool.description,
            parameters,
        }
    }
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    text: Option<String>,
    function_call: Option<FunctionCall>,
}

#[derive(Deserialize)]
struct FunctionCall {
    name: String,
    #[serde(default)]
    args: Map<String, Value>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
    status: Option<String>,
}

impl GenerativeChatClient for GeminiClient {
    #[tracing::instrument(
        name = "Calling the generative language API",
        skip(self, request),
        fields(model = %self.model, turns = request.messages.len())
    )]
    async fn generate(&self, request: GenerationRequest<'_>) -> Result<ModelReply, ChatClientError> {
        let url = self
            .base_url
            .join(&format!("v1beta/models/{}:generateContent", self.model))
            .map_err(|e| ChatClientError::Api {
                status: 0,
                message: format!("Invalid model endpoint: {e}"),
            })?;

        let body = GenerateContentRequest {
            system_instruction: Content {
                role: None,
                parts: vec![TextPart {
                    text: request.system_instruction,
                }],
            },
            contents: request
                .messages
                .iter()
                .map(|m| Content {
                    role: Some(match m.role {
                        ChatRole::User => "user",
                        ChatRole::Assistant => "model",
                    }),
                    parts: vec![TextPart { text: &m.content }],
                })
                .collect(),
            tools: request
                .tools
                .map(|tools| {
                    vec![ToolSet {
                        function_declarations: tools.iter().map(Into::into).collect(),
                    }]
                })
                .unwrap_or_default(),
        };

        let response = self
            .http_client
            .post(url)
            .header("x-goog-api-key", self.api_key.expose_secret())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = match response.json::<ErrorEnvelope>().await {
                Ok(ErrorEnvelope { error }) => match (error.message, error.status) {
                    (Some(message), Some(code)) => format!("{message} ({code})"),
                    (Some(message), None) => message,
                    (None, Some(code)) => code,
                    (None, None) => status.to_string(),
                },
                Err(_) => status.to_string(),
            };
            return Err(ChatClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GenerateContentResponse = response.json().await?;
        let parts = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts)
            .unwrap_or_default();

        let mut reply = ModelReply::default();
        let mut text = String::new();
        for part in parts {
            if let Some(t) = part.text {
                text.push_str(&t);
            }
            if let Some(call) = part.function_call {
                reply.function_calls.push(ToolCall::new(call.name, call.args));
            }
        }
        reply.text = (!text.trim().is_empty()).then_some(text);

        Ok(reply)
    }
}
