//! Remote LLM-backed expense extraction.
//!
//! Issues one chat-completion request against the prompt contract and
//! defensively unwraps whatever the model answers. Every failure mode -
//! missing credential, HTTP error, empty content, prose-wrapped or malformed
//! JSON - collapses to `None`, which the orchestrator reads as "remote
//! unavailable for this attempt".

use std::sync::Arc;

use crate::glm::{ChatMessage, ChatRequest, GlmChatApi};
use crate::models::{ExtractedExpense, InputType};

use super::prompt::{SYSTEM_PROMPT, build_user_prompt};

/// Sampling parameters for the extraction request. Low temperature keeps the
/// model close to the schema.
const TEMPERATURE: f64 = 0.1;
const TOP_P: f64 = 0.9;
const MAX_TOKENS: u32 = 512;

/// Extracts a structured expense candidate via the remote chat-completion
/// service.
pub struct RemoteExtractor {
    client: Arc<dyn GlmChatApi>,
    model: String,
}

impl RemoteExtractor {
    /// Creates a new extractor using the given client and model identifier.
    pub fn new(client: Arc<dyn GlmChatApi>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    /// Attempts one remote extraction. Never raises: any failure returns
    /// `None` and the caller falls through to the local fallback.
    pub fn extract(
        &self,
        text: &str,
        input_type: InputType,
        source_uri: Option<&str>,
    ) -> Option<ExtractedExpense> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage::system(SYSTEM_PROMPT),
                ChatMessage::user(build_user_prompt(text, input_type, source_uri)),
            ],
            temperature: Some(TEMPERATURE),
            top_p: Some(TOP_P),
            max_tokens: Some(MAX_TOKENS),
        };

        let content = self.client.chat(&request).ok()?;
        let content = content.trim();
        if content.is_empty() {
            return None;
        }

        let json = extract_json_object(content)?;
        serde_json::from_str::<ExtractedExpense>(json).ok()
    }
}

/// Carves the JSON object out of a model answer.
///
/// The model may wrap its answer in a ```json fence or surround it with
/// prose. Strips a leading fence token (with optional `json` language tag)
/// and a trailing fence, then takes everything from the first `{` to the
/// last `}` inclusive. Returns `None` when no such span exists.
pub fn extract_json_object(s: &str) -> Option<&str> {
    let mut t = s.trim();

    if t.starts_with("```") {
        t = t
            .strip_prefix("```json")
            .or_else(|| t.strip_prefix("```"))
            .unwrap_or(t)
            .trim();
        if let Some(stripped) = t.strip_suffix("```") {
            t = stripped.trim();
        }
    }

    let start = t.find('{')?;
    let end = t.rfind('}')?;
    if end <= start {
        return None;
    }
    Some(&t[start..=end])
}
