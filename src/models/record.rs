use serde::{Deserialize, Serialize};

use super::{InputType, RecordId};

/// A committed expense record as stored.
///
/// All timestamps are epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseRecord {
    pub id: RecordId,
    pub occurred_at: i64,
    pub title: String,
    pub amount: f64,
    pub currency: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// A user-reviewed expense candidate ready to commit.
///
/// Produced by editing an extraction result (or entered by hand); the service
/// validates it, reconciles the tag names against the registry and writes the
/// record together with one provenance row.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseDraft {
    pub occurred_at: i64,
    pub title: String,
    pub amount: f64,
    pub currency: String,
    pub tags: Vec<String>,
    pub input_type: InputType,
    pub raw_text: Option<String>,
    pub raw_uri: Option<String>,
}

impl ExpenseDraft {
    /// Creates a draft with the given core fields, "CNY" currency, no tags
    /// and `Text` provenance.
    pub fn new(occurred_at: i64, title: impl Into<String>, amount: f64) -> Self {
        Self {
            occurred_at,
            title: title.into(),
            amount,
            currency: "CNY".to_string(),
            tags: Vec::new(),
            input_type: InputType::Text,
            raw_text: None,
            raw_uri: None,
        }
    }
}

/// One provenance row: the raw input a record was parsed from.
///
/// A record accumulates raw inputs over its lifetime (each re-parse appends a
/// row); the newest by `created_at` is the canonical one for display, and
/// editing a record never deletes any of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawInput {
    pub id: i64,
    pub record_id: RecordId,
    pub input_type: String,
    pub raw_text: Option<String>,
    pub raw_uri: Option<String>,
    pub created_at: i64,
}
