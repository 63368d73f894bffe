//! Deterministic local fallback extraction.
//!
//! Last line of availability: when the remote extractor is unreachable,
//! unauthenticated or answers garbage, this lexical pass still turns the text
//! into a reviewable candidate. It is a total function with no error channel.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::{ExtractedExpense, InputType};

/// Trust assigned to every fallback result. Deliberately low: the candidate
/// always needs user review and must stay below any auto-accept threshold.
pub const FALLBACK_CONFIDENCE: f64 = 0.35;

/// Maximum title length, in characters.
const TITLE_MAX_CHARS: usize = 20;

/// Maximum evidence length, in characters.
const EVIDENCE_MAX_CHARS: usize = 120;

static AMOUNT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(\.\d+)?").expect("amount pattern is valid"));

/// Extracts an expense candidate from plain text using lexical rules.
///
/// The first decimal-number substring becomes the amount. The title is the
/// text with digit runs and the currency glyphs `￥`, `¥` and `元` removed,
/// trimmed and truncated to 20 characters. Currency is fixed to CNY, tags are
/// always empty, and no occurrence time is ever invented.
pub fn fallback_extract(
    text: &str,
    input_type: InputType,
    source_uri: Option<&str>,
) -> ExtractedExpense {
    let amount = AMOUNT_PATTERN
        .find(text)
        .and_then(|m| m.as_str().parse::<f64>().ok());

    let stripped = AMOUNT_PATTERN
        .replace_all(text, "")
        .replace(['￥', '¥'], "")
        .replace('元', "");
    let title: String = stripped.trim().chars().take(TITLE_MAX_CHARS).collect();
    let title = if title.is_empty() { None } else { Some(title) };

    ExtractedExpense {
        occurred_at: None,
        occurred_at_millis: None,
        title,
        amount,
        currency: Some("CNY".to_string()),
        tags: Vec::new(),
        input_type: Some(input_type.as_str().to_string()),
        raw_text: Some(text.to_string()),
        raw_uri: source_uri.map(|u| u.to_string()),
        confidence: Some(FALLBACK_CONFIDENCE),
        evidence: Some(text.chars().take(EVIDENCE_MAX_CHARS).collect()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_decimal_number_becomes_amount() {
        let result = fallback_extract("lunch 12.50 then coffee 4", InputType::Text, None);
        assert_eq!(result.amount, Some(12.5));
    }

    #[test]
    fn integer_amount_is_accepted() {
        let result = fallback_extract("taxi 30", InputType::Text, None);
        assert_eq!(result.amount, Some(30.0));
    }

    #[test]
    fn no_number_means_absent_amount() {
        let result = fallback_extract("forgot the price", InputType::Text, None);
        assert_eq!(result.amount, None);
        // Still a usable candidate
        assert_eq!(result.confidence, Some(FALLBACK_CONFIDENCE));
    }

    #[test]
    fn title_strips_digits_and_currency_glyphs() {
        let result = fallback_extract("晚餐 38.5 元", InputType::Text, None);
        assert_eq!(result.title.as_deref(), Some("晚餐"));

        let result = fallback_extract("¥12 coffee", InputType::Text, None);
        assert_eq!(result.title.as_deref(), Some("coffee"));

        let result = fallback_extract("￥9.9 milk tea", InputType::Text, None);
        assert_eq!(result.title.as_deref(), Some("milk tea"));
    }

    #[test]
    fn title_truncates_to_twenty_chars() {
        let long = "a very long description of an expense that keeps going";
        let result = fallback_extract(long, InputType::Text, None);
        assert_eq!(result.title.as_ref().unwrap().chars().count(), 20);
    }

    #[test]
    fn all_digit_text_yields_absent_title() {
        let result = fallback_extract("38.5", InputType::Text, None);
        assert_eq!(result.title, None);
        assert_eq!(result.amount, Some(38.5));
    }

    #[test]
    fn constants_are_fixed() {
        let result = fallback_extract("dinner 38.5", InputType::Voice, None);
        assert_eq!(result.currency.as_deref(), Some("CNY"));
        assert!(result.tags.is_empty());
        assert_eq!(result.confidence, Some(0.35));
        assert_eq!(result.occurred_at, None);
        assert_eq!(result.occurred_at_millis, None);
    }

    #[test]
    fn provenance_fields_carry_inputs() {
        let result = fallback_extract("receipt text 9.9", InputType::Photo, Some("/tmp/r.jpg"));
        assert_eq!(result.input_type.as_deref(), Some("photo"));
        assert_eq!(result.raw_text.as_deref(), Some("receipt text 9.9"));
        assert_eq!(result.raw_uri.as_deref(), Some("/tmp/r.jpg"));
    }

    #[test]
    fn evidence_is_first_120_chars() {
        let long: String = "好".repeat(200);
        let result = fallback_extract(&long, InputType::Text, None);
        assert_eq!(result.evidence.as_ref().unwrap().chars().count(), 120);

        let short = "dinner 38.5";
        let result = fallback_extract(short, InputType::Text, None);
        assert_eq!(result.evidence.as_deref(), Some(short));
    }
}
