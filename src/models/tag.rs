use serde::{Deserialize, Serialize};

use super::TagId;

/// A canonical tag identity from the tag registry.
///
/// The `name` field is the natural key: exactly one row exists per name,
/// case-sensitive, enforced by a unique index at the storage level. Tags are
/// created lazily the first time a name is resolved and are never deleted by
/// the extraction pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    id: TagId,
    name: String,
    created_at: i64,
}

impl Tag {
    /// Creates a new tag with the given creation timestamp (epoch millis).
    pub fn new(id: TagId, name: impl Into<String>, created_at: i64) -> Self {
        Self {
            id,
            name: name.into(),
            created_at,
        }
    }

    /// Returns the tag's unique identifier.
    pub fn id(&self) -> TagId {
        self.id
    }

    /// Returns the canonical name for this tag.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns when this tag was first created, as epoch milliseconds.
    pub fn created_at(&self) -> i64 {
        self.created_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_creates_tag_with_fields() {
        let tag = Tag::new(TagId::new(1), "dining", 1_700_000_000_000);

        assert_eq!(tag.id(), TagId::new(1));
        assert_eq!(tag.name(), "dining");
        assert_eq!(tag.created_at(), 1_700_000_000_000);
    }

    #[test]
    fn tags_with_same_fields_are_equal() {
        let a = Tag::new(TagId::new(7), "transport", 42);
        let b = Tag::new(TagId::new(7), "transport", 42);
        assert_eq!(a, b);
    }
}
