//! Text normalization: resolve any input source into one plain-text string.
//!
//! Text and voice inputs already carry their text; image inputs are routed
//! through the recognition capability. Normalization failures are fatal to
//! the parse attempt and surface to the caller, because without text the
//! fallback extractor has nothing to work on.

use thiserror::Error;

use crate::models::ExtractionInput;
use crate::ocr::{OcrError, TextRecognizer};

/// Errors resolving an input to plain text.
#[derive(Debug, Error)]
pub enum NormalizeError {
    /// An image input arrived without a source locator.
    #[error("Image input requires a source URI")]
    MissingSource,

    /// An image input arrived but no recognizer is configured.
    #[error("No text recognizer configured for image input")]
    NoRecognizer,

    /// The recognition capability failed.
    #[error(transparent)]
    Recognition(#[from] OcrError),
}

/// Resolves the input to the final text the extractors run on.
///
/// Text and voice inputs return their text trimmed. Photo and camera inputs
/// require a non-blank source URI and return the recognizer's trimmed output.
pub fn normalize(
    input: &ExtractionInput,
    recognizer: Option<&dyn TextRecognizer>,
) -> Result<String, NormalizeError> {
    if !input.input_type().is_image() {
        return Ok(input.raw_text().trim().to_string());
    }

    let uri = input
        .source_uri()
        .filter(|u| !u.trim().is_empty())
        .ok_or(NormalizeError::MissingSource)?;

    let recognizer = recognizer.ok_or(NormalizeError::NoRecognizer)?;
    let recognized = recognizer.recognize(uri)?;
    Ok(recognized.trim().to_string())
}
