//! Image-to-text recognition adapter.
//!
//! The pipeline consumes recognition as a single capability: bytes in, plain
//! text out. `GlmOcr` implements it over the same chat-completion endpoint
//! using a vision request; tests and alternative engines plug in through the
//! `TextRecognizer` trait.

use std::path::Path;
use std::sync::Arc;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use thiserror::Error;

use crate::glm::{ChatMessage, ChatRequest, ContentPart, GlmChatApi, GlmError};

/// Hard ceiling on recognizable image size.
pub const MAX_IMAGE_BYTES: usize = 8 * 1024 * 1024;

/// Errors from the recognition capability.
///
/// Recognition failures are fatal to the parse attempt: without text there is
/// nothing for the fallback extractor to work on, so these are surfaced
/// rather than absorbed.
#[derive(Debug, Error)]
pub enum OcrError {
    /// The referenced image could not be read.
    #[error("Cannot read image '{path}': {source}")]
    Unreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The image exceeds the size ceiling; it is rejected, never truncated.
    #[error("Image is {size} bytes, exceeding the {limit} byte limit")]
    TooLarge { size: usize, limit: usize },

    /// The recognition service itself failed.
    #[error("Recognition service failed: {0}")]
    Service(#[from] GlmError),
}

/// Capability consumed by the pipeline: turn an image locator into plain text.
pub trait TextRecognizer: Send + Sync {
    /// Recognizes the text content of the image behind `locator`.
    fn recognize(&self, locator: &str) -> Result<String, OcrError>;
}

/// Vision-model recognizer over the chat-completion endpoint.
///
/// Reads the image from the local filesystem, embeds it as a base64 data URL
/// and asks the model for the raw text, nothing else.
pub struct GlmOcr {
    client: Arc<dyn GlmChatApi>,
    model: String,
}

impl GlmOcr {
    /// Creates a recognizer using the given client and vision model.
    pub fn new(client: Arc<dyn GlmChatApi>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }
}

impl TextRecognizer for GlmOcr {
    fn recognize(&self, locator: &str) -> Result<String, OcrError> {
        let path = locator.strip_prefix("file://").unwrap_or(locator);

        let bytes = std::fs::read(path).map_err(|source| OcrError::Unreadable {
            path: path.to_string(),
            source,
        })?;

        if bytes.len() > MAX_IMAGE_BYTES {
            return Err(OcrError::TooLarge {
                size: bytes.len(),
                limit: MAX_IMAGE_BYTES,
            });
        }

        let data_url = format!("data:{};base64,{}", mime_for(path), STANDARD.encode(&bytes));

        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage::user_parts(vec![
                ContentPart::text("Extract all of the text in this image. Output plain text only."),
                ContentPart::image_url(data_url),
            ])],
            temperature: Some(0.1),
            top_p: None,
            max_tokens: Some(2048),
        };

        Ok(self.client.chat(&request)?)
    }
}

/// Guesses the image mime type from the file extension, defaulting to JPEG.
fn mime_for(path: &str) -> &'static str {
    match Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        _ => "image/jpeg",
    }
}
