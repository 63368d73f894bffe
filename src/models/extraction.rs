use serde::{Deserialize, Serialize};
use time::PrimitiveDateTime;
use time::macros::format_description;

/// The structured extraction contract both extractors produce.
///
/// Every field is independently optional: the remote model is told to emit
/// `null` rather than guess, and the fallback only fills what its lexical
/// rules can justify. An explicit JSON `null` and a missing key are treated
/// identically (field absent). Unknown keys in a remote response are ignored.
///
/// `occurred_at` (`"yyyy-MM-dd HH:mm"`) and `occurred_at_millis` describe the
/// same fact; when both are present the epoch form wins at persistence time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedExpense {
    /// Occurrence time as `yyyy-MM-dd HH:mm`, never guessed.
    #[serde(default)]
    pub occurred_at: Option<String>,
    /// Occurrence time as epoch milliseconds, preferred for persistence.
    #[serde(default)]
    pub occurred_at_millis: Option<i64>,
    /// Short description of the expense (≤20 chars intended).
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
    /// 0-3 category labels recommended; any strings accepted.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Wire label of the originating source (`text`/`voice`/`photo`/`camera`).
    #[serde(default)]
    pub input_type: Option<String>,
    #[serde(default)]
    pub raw_text: Option<String>,
    #[serde(default)]
    pub raw_uri: Option<String>,
    /// Extractor's self-assessed trust in the result, 0.0-1.0.
    #[serde(default)]
    pub confidence: Option<f64>,
    /// Most relevant snippet of the original text (≤120 chars intended).
    #[serde(default)]
    pub evidence: Option<String>,
}

impl ExtractedExpense {
    /// Sentinel result for blank input: all fields absent except an empty
    /// evidence string. Not an error.
    pub fn empty_input() -> Self {
        Self {
            evidence: Some(String::new()),
            ..Self::default()
        }
    }

    /// Resolves the occurrence time to epoch milliseconds.
    ///
    /// Prefers `occurred_at_millis` when present; otherwise parses
    /// `occurred_at` as a UTC `yyyy-MM-dd HH:mm` timestamp. Returns `None`
    /// when neither field yields a usable time.
    pub fn occurred_at_epoch_millis(&self) -> Option<i64> {
        if let Some(millis) = self.occurred_at_millis {
            return Some(millis);
        }

        let text = self.occurred_at.as_deref()?;
        let format = format_description!("[year]-[month]-[day] [hour]:[minute]");
        let parsed = PrimitiveDateTime::parse(text, &format).ok()?;
        Some((parsed.assume_utc().unix_timestamp_nanos() / 1_000_000) as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_camel_case_wire_names() {
        let json = r#"{
            "occurredAt": "2025-02-10 19:00",
            "occurredAtMillis": 1739214000000,
            "title": "dinner",
            "amount": 38.5,
            "currency": "CNY",
            "tags": ["dining"],
            "inputType": "text",
            "rawText": "dinner 38.5",
            "confidence": 0.9,
            "evidence": "dinner 38.5"
        }"#;

        let result: ExtractedExpense = serde_json::from_str(json).unwrap();
        assert_eq!(result.occurred_at.as_deref(), Some("2025-02-10 19:00"));
        assert_eq!(result.occurred_at_millis, Some(1_739_214_000_000));
        assert_eq!(result.title.as_deref(), Some("dinner"));
        assert_eq!(result.amount, Some(38.5));
        assert_eq!(result.tags, vec!["dining".to_string()]);
    }

    #[test]
    fn missing_and_null_fields_both_deserialize_as_absent() {
        let missing: ExtractedExpense = serde_json::from_str(r#"{"amount": 5.0}"#).unwrap();
        let null: ExtractedExpense =
            serde_json::from_str(r#"{"amount": 5.0, "title": null, "occurredAt": null}"#).unwrap();

        assert_eq!(missing.title, None);
        assert_eq!(null.title, None);
        assert_eq!(missing, null);
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let json = r#"{"amount": 12.0, "model_notes": "ignore me", "extra": {"a": 1}}"#;
        let result: ExtractedExpense = serde_json::from_str(json).unwrap();
        assert_eq!(result.amount, Some(12.0));
    }

    #[test]
    fn empty_input_sentinel_has_only_empty_evidence() {
        let sentinel = ExtractedExpense::empty_input();
        assert_eq!(sentinel.evidence.as_deref(), Some(""));
        assert_eq!(sentinel.amount, None);
        assert_eq!(sentinel.title, None);
        assert!(sentinel.tags.is_empty());
        assert_eq!(sentinel.confidence, None);
    }

    #[test]
    fn epoch_millis_prefers_explicit_millis() {
        let result = ExtractedExpense {
            occurred_at: Some("2025-02-10 19:00".to_string()),
            occurred_at_millis: Some(1_000),
            ..Default::default()
        };
        assert_eq!(result.occurred_at_epoch_millis(), Some(1_000));
    }

    #[test]
    fn epoch_millis_parses_formatted_time() {
        let result = ExtractedExpense {
            occurred_at: Some("2025-02-10 19:00".to_string()),
            ..Default::default()
        };
        // 2025-02-10T19:00:00Z
        assert_eq!(result.occurred_at_epoch_millis(), Some(1_739_214_000_000));
    }

    #[test]
    fn epoch_millis_rejects_malformed_time() {
        let result = ExtractedExpense {
            occurred_at: Some("Feb 10th around 7pm".to_string()),
            ..Default::default()
        };
        assert_eq!(result.occurred_at_epoch_millis(), None);
    }
}
