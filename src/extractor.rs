//! The expense-extraction pipeline.
//!
//! Turns heterogeneous raw input - typed text, a voice transcript, or text
//! recognized from an image - into a structured, reviewable expense
//! candidate. The remote LLM extractor is attempted first; a deterministic
//! lexical fallback guarantees the feature stays usable with no credential,
//! no network, or a misbehaving model.
//!
//! # Examples
//!
//! ```
//! use spendlog::extractor::ExpenseParserBuilder;
//! use spendlog::models::{ExtractionInput, InputType};
//!
//! // No remote extractor configured: the deterministic fallback answers.
//! let parser = ExpenseParserBuilder::new().build();
//! let input = ExtractionInput::text("dinner 38.5", InputType::Text);
//!
//! let candidate = parser.parse(&input).unwrap();
//! assert_eq!(candidate.amount, Some(38.5));
//! assert_eq!(candidate.confidence, Some(0.35));
//! ```

mod fallback;
mod normalize;
mod orchestrator;
mod prompt;
mod remote;

pub use fallback::{FALLBACK_CONFIDENCE, fallback_extract};
pub use normalize::{NormalizeError, normalize};
pub use orchestrator::{ExpenseParser, ExpenseParserBuilder};
pub use prompt::{PROMPT_VERSION, SYSTEM_PROMPT, build_user_prompt};
pub use remote::{RemoteExtractor, extract_json_object};
