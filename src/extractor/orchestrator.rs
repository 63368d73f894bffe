//! Parse orchestration: normalize, try remote, fall back.
//!
//! One `parse` call is one attempt: normalize the input to text, try the
//! remote extractor once, and fall through to the local fallback on any
//! remote failure. A remote result that parses is final and authoritative -
//! it is never merged field-by-field with fallback output. The parser holds
//! no mutable state; calls are independent and reentrant, and retrying is an
//! explicit caller action.

use std::sync::Arc;

use crate::models::{ExtractedExpense, ExtractionInput};
use crate::ocr::TextRecognizer;

use super::fallback::fallback_extract;
use super::normalize::{NormalizeError, normalize};
use super::remote::RemoteExtractor;

/// Builder for constructing `ExpenseParser` instances.
///
/// A parser without a remote extractor (no credential configured) goes
/// straight to the local fallback; a parser without a recognizer can still
/// handle text and voice input.
#[derive(Default)]
pub struct ExpenseParserBuilder {
    remote: Option<RemoteExtractor>,
    recognizer: Option<Arc<dyn TextRecognizer>>,
}

impl ExpenseParserBuilder {
    /// Creates a new builder with neither remote extractor nor recognizer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the remote extractor to attempt before the fallback.
    pub fn remote(mut self, remote: RemoteExtractor) -> Self {
        self.remote = Some(remote);
        self
    }

    /// Sets the recognition capability for photo/camera input.
    pub fn recognizer(mut self, recognizer: Arc<dyn TextRecognizer>) -> Self {
        self.recognizer = Some(recognizer);
        self
    }

    /// Builds the parser.
    #[must_use]
    pub fn build(self) -> ExpenseParser {
        ExpenseParser {
            remote: self.remote,
            recognizer: self.recognizer,
        }
    }
}

/// Single entry point for a parse action.
pub struct ExpenseParser {
    remote: Option<RemoteExtractor>,
    recognizer: Option<Arc<dyn TextRecognizer>>,
}

impl ExpenseParser {
    /// Runs one parse attempt over the input.
    ///
    /// Normalization failures surface as errors (there is no text to fall
    /// back on). Blank normalized text yields the defined empty-input
    /// sentinel, not an error. Otherwise the remote extractor gets one
    /// attempt; its result, when parseable, is returned unmodified, and any
    /// remote failure is absorbed into the local fallback. This is pure
    /// compute: nothing durable is written until the caller commits.
    pub fn parse(&self, input: &ExtractionInput) -> Result<ExtractedExpense, NormalizeError> {
        let text = normalize(input, self.recognizer.as_deref())?;
        if text.is_empty() {
            return Ok(ExtractedExpense::empty_input());
        }

        let remote = self
            .remote
            .as_ref()
            .and_then(|r| r.extract(&text, input.input_type(), input.source_uri()));

        Ok(remote
            .unwrap_or_else(|| fallback_extract(&text, input.input_type(), input.source_uri())))
    }
}
