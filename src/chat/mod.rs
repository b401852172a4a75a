//! Proxy to a generative-language API with local tool dispatch.

mod client;
mod service;
mod tools;

pub use client::{ChatClientError, GeminiClient, GenerationRequest, GenerativeChatClient, ModelReply};
pub use service::{ChatError, ChatMessage, ChatReply, ChatRole, ChatService};
pub use tools::{TOOL_DECLARATIONS, ToolCall, ToolDeclaration, ToolExecutor, ToolParameter, ToolResult};
