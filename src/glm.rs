/// GLM chat-completion HTTP client module.
///
/// This module provides a blocking HTTP client for an OpenAI-style
/// chat-completion endpoint, including the request/response DTOs, error
/// handling and timeout configuration.
mod client;

pub use client::{
    ChatMessage, ChatRequest, ContentPart, GlmChatApi, GlmClient, GlmClientBuilder, GlmError,
    ImageUrl, MessageContent, DEFAULT_ENDPOINT,
};
