//! Prompt contract for the remote expense extractor.
//!
//! The instruction template and the JSON schema it demands are kept as a
//! versioned constant artifact so the contract can be tested without touching
//! the network. The remote service must answer with exactly one JSON object
//! matching `ExtractedExpense`'s wire names.

use crate::models::InputType;

/// Bumped whenever the instruction wording or schema changes.
pub const PROMPT_VERSION: u32 = 1;

/// System instruction: forces a single bare JSON object, no prose, no
/// markdown fencing, with per-field rules mirroring the extraction contract.
pub const SYSTEM_PROMPT: &str = r#"You are an expense-entry extractor. You must output exactly ONE JSON object - no extra text, no markdown, no code fences.
Extract the following fields from the user input (every key must be present; values may be null or an empty array):
{
  "occurredAt": "yyyy-MM-dd HH:mm" or null,
  "occurredAtMillis": number (epoch milliseconds) or null,
  "title": string or null,
  "amount": number or null,
  "currency": "CNY" or null,
  "tags": string[] (may be empty),
  "inputType": "text"/"voice"/"photo"/"camera" or null,
  "rawText": string or null,
  "rawUri": string or null,
  "confidence": number (0-1) or null,
  "evidence": string or null
}
Rules:
1) occurredAt must strictly match "yyyy-MM-dd HH:mm"; if the user states no time, output null (never guess a date).
2) amount must be a number; output null when the amount cannot be determined.
3) title is the expense item (e.g. "dinner", "taxi", "coffee"); at most 20 characters; extract it when possible.
4) tags: when the text contains an obvious category word (dining / transport / shopping / entertainment / study / medical / housing / communication / travel etc.) give 1-3 tags; otherwise an empty array.
5) evidence: quote the most relevant short span of the original text (<=120 characters).
6) confidence: your own trust in the extraction (0-1).
7) Produce values ready for storage: currency defaults to CNY; inputType prefers the source the user supplied; rawText should preserve the user's original text.
8) occurredAt and occurredAtMillis are alternatives; when neither can be determined, output null for both."#;

/// Builds the user message: source label, optional image URI line, then the
/// normalized text.
pub fn build_user_prompt(text: &str, input_type: InputType, source_uri: Option<&str>) -> String {
    let mut prompt = String::new();
    prompt.push_str(&format!("Input source: {}\n", input_type.as_str()));
    if let Some(uri) = source_uri.filter(|u| !u.trim().is_empty()) {
        prompt.push_str(&format!("Image URI: {uri}\n"));
    }
    prompt.push_str(&format!("User input: {text}"));
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_prompt_demands_bare_json() {
        assert!(SYSTEM_PROMPT.contains("ONE JSON object"));
        assert!(SYSTEM_PROMPT.contains("no markdown"));
    }

    #[test]
    fn system_prompt_names_every_contract_field() {
        for field in [
            "occurredAt",
            "occurredAtMillis",
            "title",
            "amount",
            "currency",
            "tags",
            "inputType",
            "rawText",
            "rawUri",
            "confidence",
            "evidence",
        ] {
            assert!(
                SYSTEM_PROMPT.contains(field),
                "system prompt missing field {field}"
            );
        }
    }

    #[test]
    fn system_prompt_encodes_field_rules() {
        assert!(SYSTEM_PROMPT.contains("yyyy-MM-dd HH:mm"));
        assert!(SYSTEM_PROMPT.contains("never guess"));
        assert!(SYSTEM_PROMPT.contains("20 characters"));
        assert!(SYSTEM_PROMPT.contains("<=120 characters"));
        assert!(SYSTEM_PROMPT.contains("defaults to CNY"));
    }

    #[test]
    fn user_prompt_embeds_source_and_text() {
        let prompt = build_user_prompt("dinner 38.5", InputType::Voice, None);
        assert!(prompt.contains("Input source: voice"));
        assert!(prompt.contains("User input: dinner 38.5"));
        assert!(!prompt.contains("Image URI"));
    }

    #[test]
    fn user_prompt_includes_uri_when_present() {
        let prompt =
            build_user_prompt("receipt text", InputType::Photo, Some("/tmp/receipt.jpg"));
        assert!(prompt.contains("Image URI: /tmp/receipt.jpg"));
    }

    #[test]
    fn user_prompt_skips_blank_uri() {
        let prompt = build_user_prompt("text", InputType::Photo, Some("   "));
        assert!(!prompt.contains("Image URI"));
    }
}
