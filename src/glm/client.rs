/// GLM chat-completion HTTP client.
///
/// This module provides `GlmClient` for making synchronous HTTP requests to an
/// OpenAI-style chat-completion endpoint, along with the request/response DTOs,
/// error types and a builder pattern for configuration.
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default chat-completion endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://open.bigmodel.cn/api/paas/v4/chat/completions";

/// Errors that can occur when interacting with the chat-completion API.
#[derive(Debug, Error)]
pub enum GlmError {
    /// No API key configured; the remote service cannot be used.
    #[error("API key not configured (set ZHIPU_API_KEY)")]
    MissingCredential,

    /// Network-related errors (connection failures, DNS resolution, timeouts)
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    /// HTTP errors with status code and the server's error message when present
    #[error("HTTP error: status {status}: {message}")]
    Http { status: u16, message: String },

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[source] serde_json::Error),

    /// Malformed or empty response envelope
    #[error("API error: {message}")]
    Api { message: String },

    /// Invalid URL configuration error
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// One chat message in a request.
///
/// Content is either a plain string (text prompts) or a list of typed parts
/// (vision prompts mixing text and image references).
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: MessageContent,
}

impl ChatMessage {
    /// Creates a `system` message with plain text content.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: MessageContent::Text(content.into()),
        }
    }

    /// Creates a `user` message with plain text content.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: MessageContent::Text(content.into()),
        }
    }

    /// Creates a `user` message composed of typed content parts.
    pub fn user_parts(parts: Vec<ContentPart>) -> Self {
        Self {
            role: "user".to_string(),
            content: MessageContent::Parts(parts),
        }
    }
}

/// Message content: plain text or a list of typed parts.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

/// A typed content part for vision requests.
#[derive(Debug, Clone, Serialize)]
pub struct ContentPart {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<ImageUrl>,
}

impl ContentPart {
    /// A `text` part.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: "text".to_string(),
            text: Some(text.into()),
            image_url: None,
        }
    }

    /// An `image_url` part referencing a URL or data URL.
    pub fn image_url(url: impl Into<String>) -> Self {
        Self {
            kind: "image_url".to_string(),
            text: None,
            image_url: Some(ImageUrl { url: url.into() }),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageUrl {
    pub url: String,
}

/// A chat-completion request body.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(rename = "top_p", skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    #[serde(rename = "max_tokens", skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

/// Response envelope: `{choices:[{message:{content}}]}`.
///
/// `content` is kept as a raw JSON value because some models answer with a
/// plain string and vision models answer with an array of typed parts.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    #[serde(default)]
    message: ResponseMessage,
}

#[derive(Debug, Default, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: serde_json::Value,
}

/// Trait for chat-completion API operations.
///
/// This trait enables mocking in unit tests and provides a clean interface
/// for issuing one completion request.
pub trait GlmChatApi: Send + Sync {
    /// Sends one chat-completion request and returns the first choice's
    /// message content, flattened to plain text and trimmed.
    fn chat(&self, request: &ChatRequest) -> Result<String, GlmError>;
}

/// Builder for constructing `GlmClient` instances.
///
/// # Examples
///
/// ```no_run
/// use spendlog::glm::GlmClientBuilder;
///
/// let client = GlmClientBuilder::new()
///     .api_key("sk-...")
///     .connect_timeout_secs(20)
///     .request_timeout_secs(40)
///     .build()
///     .expect("Failed to create client");
/// ```
#[derive(Debug, Default)]
pub struct GlmClientBuilder {
    endpoint: Option<String>,
    api_key: Option<String>,
    connect_timeout_secs: Option<u64>,
    request_timeout_secs: Option<u64>,
}

impl GlmClientBuilder {
    /// Creates a new `GlmClientBuilder` with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the chat-completion endpoint URL.
    pub fn endpoint(mut self, url: impl Into<String>) -> Self {
        self.endpoint = Some(url.into());
        self
    }

    /// Sets the bearer credential. Whitespace is trimmed; a blank value is
    /// treated as "not configured".
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the connection timeout in seconds (default 20).
    pub fn connect_timeout_secs(mut self, secs: u64) -> Self {
        self.connect_timeout_secs = Some(secs);
        self
    }

    /// Sets the overall request timeout in seconds (default 40), covering
    /// read and write.
    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout_secs = Some(secs);
        self
    }

    /// Builds the `GlmClient` with the configured settings.
    ///
    /// # Environment Variables
    ///
    /// If `endpoint()` was not called, the `GLM_ENDPOINT` environment variable
    /// is consulted before falling back to the default endpoint. If
    /// `api_key()` was not called, the `ZHIPU_API_KEY` environment variable is
    /// used (a client without a credential still builds, but `chat` fails with
    /// `GlmError::MissingCredential`).
    pub fn build(self) -> Result<GlmClient, GlmError> {
        let endpoint = if let Some(url) = self.endpoint {
            url
        } else {
            std::env::var("GLM_ENDPOINT").unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string())
        };

        let api_key = if let Some(key) = self.api_key {
            key
        } else {
            std::env::var("ZHIPU_API_KEY").unwrap_or_default()
        };
        let api_key = api_key.trim().to_string();

        reqwest::Url::parse(&endpoint)
            .map_err(|e| GlmError::InvalidUrl(format!("{}: {}", endpoint, e)))?;

        let client = reqwest::blocking::Client::builder()
            .connect_timeout(Duration::from_secs(self.connect_timeout_secs.unwrap_or(20)))
            .timeout(Duration::from_secs(self.request_timeout_secs.unwrap_or(40)))
            .build()
            .map_err(GlmError::Network)?;

        Ok(GlmClient {
            client,
            endpoint,
            api_key,
        })
    }
}

/// Synchronous HTTP client for an OpenAI-style chat-completion endpoint.
///
/// Issues exactly one request per call; retrying is left to the caller
/// (an explicit re-parse action), never done internally.
pub struct GlmClient {
    client: reqwest::blocking::Client,
    endpoint: String,
    api_key: String,
}

impl GlmClient {
    /// Returns the endpoint configured for this client.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Returns true when a non-blank credential is configured.
    pub fn has_credential(&self) -> bool {
        !self.api_key.is_empty()
    }

    fn chat_internal(&self, request: &ChatRequest) -> Result<String, GlmError> {
        if self.api_key.is_empty() {
            return Err(GlmError::MissingCredential);
        }

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .map_err(GlmError::Network)?;

        let status = response.status();
        let body = response.text().map_err(GlmError::Network)?;

        if !status.is_success() {
            return Err(GlmError::Http {
                status: status.as_u16(),
                message: failure_message(&body),
            });
        }

        if body.trim().is_empty() {
            return Err(GlmError::Api {
                message: "empty response body".to_string(),
            });
        }

        let envelope: ChatResponse =
            serde_json::from_str(&body).map_err(GlmError::Serialization)?;

        let content = envelope
            .choices
            .into_iter()
            .next()
            .map(|choice| flatten_content(&choice.message.content))
            .unwrap_or_default();

        Ok(content)
    }
}

impl GlmChatApi for GlmClient {
    fn chat(&self, request: &ChatRequest) -> Result<String, GlmError> {
        self.chat_internal(request)
    }
}

/// Flattens a response `content` value to plain text.
///
/// Handles the three envelope shapes the service emits: a plain string, an
/// array of `{type:"text", text}` parts (joined with newlines), or anything
/// else rendered through its JSON form.
fn flatten_content(content: &serde_json::Value) -> String {
    match content {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s.trim().to_string(),
        serde_json::Value::Array(items) => items
            .iter()
            .map(|item| match item {
                serde_json::Value::String(s) => s.clone(),
                serde_json::Value::Object(obj) => obj
                    .get("text")
                    .and_then(|t| t.as_str())
                    .unwrap_or_default()
                    .to_string(),
                _ => String::new(),
            })
            .collect::<Vec<_>>()
            .join("\n")
            .trim()
            .to_string(),
        other => other.to_string().trim().to_string(),
    }
}

/// Extracts a human-readable failure message from an error response body.
///
/// Tries the `{"error":{"message"}}` envelope first, then falls back to the
/// first 240 characters of the raw body.
fn failure_message(body: &str) -> String {
    if body.trim().is_empty() {
        return "empty response body".to_string();
    }

    let parsed = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|root| {
            root.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(|m| m.to_string())
        })
        .unwrap_or_default();

    if parsed.is_empty() {
        body.chars().take(240).collect()
    } else {
        parsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_credential_error_display() {
        let error = GlmError::MissingCredential;
        assert!(format!("{error}").contains("ZHIPU_API_KEY"));
    }

    #[test]
    fn http_error_includes_status_and_message() {
        let error = GlmError::Http {
            status: 429,
            message: "rate limited".to_string(),
        };
        let msg = format!("{error}");
        assert!(msg.contains("429"));
        assert!(msg.contains("rate limited"));
    }

    #[test]
    fn builder_defaults_to_known_endpoint() {
        let client = GlmClientBuilder::new()
            .api_key("test-key")
            .build()
            .unwrap();
        assert!(client.endpoint().starts_with("https://"));
    }

    #[test]
    fn builder_rejects_invalid_endpoint() {
        let result = GlmClientBuilder::new()
            .endpoint("not-a-valid-url")
            .api_key("k")
            .build();
        assert!(matches!(result, Err(GlmError::InvalidUrl(_))));
    }

    #[test]
    fn blank_api_key_means_no_credential() {
        let client = GlmClientBuilder::new()
            .endpoint("http://localhost:9999")
            .api_key("   ")
            .build()
            .unwrap();
        assert!(!client.has_credential());
    }

    #[test]
    fn chat_without_credential_fails_fast() {
        let client = GlmClientBuilder::new()
            .endpoint("http://localhost:9999")
            .api_key("")
            .build()
            .unwrap();

        let request = ChatRequest {
            model: "glm-5".to_string(),
            messages: vec![ChatMessage::user("hi")],
            temperature: None,
            top_p: None,
            max_tokens: None,
        };

        let result = client.chat(&request);
        assert!(matches!(result, Err(GlmError::MissingCredential)));
    }

    #[test]
    fn request_serializes_with_wire_field_names() {
        let request = ChatRequest {
            model: "glm-5".to_string(),
            messages: vec![
                ChatMessage::system("extract"),
                ChatMessage::user("dinner 38.5"),
            ],
            temperature: Some(0.1),
            top_p: Some(0.9),
            max_tokens: Some(512),
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "glm-5");
        assert_eq!(json["temperature"], 0.1);
        assert_eq!(json["top_p"], 0.9);
        assert_eq!(json["max_tokens"], 512);
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "dinner 38.5");
    }

    #[test]
    fn vision_parts_serialize_as_typed_array() {
        let message = ChatMessage::user_parts(vec![
            ContentPart::text("extract all text"),
            ContentPart::image_url("data:image/jpeg;base64,AAAA"),
        ]);

        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["content"][0]["type"], "text");
        assert_eq!(json["content"][0]["text"], "extract all text");
        assert_eq!(json["content"][1]["type"], "image_url");
        assert_eq!(
            json["content"][1]["image_url"]["url"],
            "data:image/jpeg;base64,AAAA"
        );
        // Untagged parts must not leak a null text field
        assert!(json["content"][1].get("text").is_none());
    }

    #[test]
    fn flatten_content_handles_plain_string() {
        let value = serde_json::json!("  dinner 38.5  ");
        assert_eq!(flatten_content(&value), "dinner 38.5");
    }

    #[test]
    fn flatten_content_joins_text_parts() {
        let value = serde_json::json!([
            {"type": "text", "text": "line one"},
            {"type": "text", "text": "line two"}
        ]);
        assert_eq!(flatten_content(&value), "line one\nline two");
    }

    #[test]
    fn flatten_content_handles_null_and_unknown_parts() {
        assert_eq!(flatten_content(&serde_json::Value::Null), "");

        let mixed = serde_json::json!(["plain", {"other": true}, {"text": "tail"}]);
        assert_eq!(flatten_content(&mixed), "plain\n\ntail");
    }

    #[test]
    fn failure_message_prefers_error_envelope() {
        let body = r#"{"error":{"message":"invalid api key"}}"#;
        assert_eq!(failure_message(body), "invalid api key");
    }

    #[test]
    fn failure_message_falls_back_to_raw_body() {
        assert_eq!(failure_message("plain text failure"), "plain text failure");
        assert_eq!(failure_message("  "), "empty response body");
    }

    #[test]
    fn response_envelope_parses_with_missing_choices() {
        let envelope: ChatResponse = serde_json::from_str("{}").unwrap();
        assert!(envelope.choices.is_empty());
    }

    #[test]
    fn trait_can_be_implemented_by_mock_struct() {
        struct MockClient {
            response: String,
        }

        impl GlmChatApi for MockClient {
            fn chat(&self, _request: &ChatRequest) -> Result<String, GlmError> {
                Ok(self.response.clone())
            }
        }

        let mock = MockClient {
            response: "test response".to_string(),
        };
        let request = ChatRequest {
            model: "m".to_string(),
            messages: vec![],
            temperature: None,
            top_p: None,
            max_tokens: None,
        };
        assert_eq!(mock.chat(&request).unwrap(), "test response");
    }
}
