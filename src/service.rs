use std::collections::HashSet;

use anyhow::{Result, anyhow, bail};
use rusqlite::{OptionalExtension, params};
use time::OffsetDateTime;

use crate::Database;
use crate::models::{ExpenseDraft, ExpenseRecord, InputType, RawInput, RecordId, Tag, TagId};

/// Current wall-clock time as epoch milliseconds.
fn now_millis() -> i64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}

/// Service layer providing expense storage operations.
///
/// ExpenseService owns a Database instance and provides the storage-facing
/// half of the pipeline: committing reviewed drafts, reconciling tag names
/// against the registry, accumulating raw-input provenance, and retention
/// cleanup. It is UI-independent and usable from CLI or future interfaces.
///
/// # Examples
///
/// ```
/// use spendlog::{Database, ExpenseService};
///
/// # fn main() -> anyhow::Result<()> {
/// let db = Database::in_memory()?;
/// let service = ExpenseService::new(db);
/// # Ok(())
/// # }
/// ```
pub struct ExpenseService {
    db: Database,
}

impl ExpenseService {
    /// Creates a new ExpenseService with the given database.
    ///
    /// Takes ownership of the database instance. The service becomes the sole
    /// owner and manages all storage operations through its methods.
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Returns a reference to the underlying database.
    ///
    /// Useful for testing or advanced operations that need direct access.
    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Resolves a free-form tag name to its canonical identity, creating the
    /// tag on first use.
    ///
    /// Safe under concurrent save operations without locking: the name is
    /// looked up, then inserted with `INSERT OR IGNORE`, and when the insert
    /// reports no new row (a concurrent creator won the race) the name is
    /// re-read. Only a read-committed storage level is assumed.
    ///
    /// # Errors
    ///
    /// Fails on a blank name, or when the tag still cannot be found after the
    /// insert attempt - the latter indicates storage inconsistency and means
    /// a save cannot proceed correctly.
    pub fn upsert_tag_by_name(&self, name: &str) -> Result<Tag> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            bail!("Tag name cannot be empty");
        }

        if let Some(tag) = self.find_tag_by_name(trimmed)? {
            return Ok(tag);
        }

        let conn = self.db.connection();
        let now = now_millis();
        let changed = conn.execute(
            "INSERT OR IGNORE INTO tags (name, created_at) VALUES (?1, ?2)",
            params![trimmed, now],
        )?;

        if changed > 0 {
            return Ok(Tag::new(TagId::new(conn.last_insert_rowid()), trimmed, now));
        }

        // IGNORE swallowed a uniqueness conflict: a concurrent insert won.
        self.find_tag_by_name(trimmed)?.ok_or_else(|| {
            anyhow!("Tag '{trimmed}' not found after insert attempt; storage is inconsistent")
        })
    }

    /// Looks up a tag by exact (case-sensitive) name.
    pub fn find_tag_by_name(&self, name: &str) -> Result<Option<Tag>> {
        let tag = self
            .db
            .connection()
            .query_row(
                "SELECT id, name, created_at FROM tags WHERE name = ?1 LIMIT 1",
                [name],
                |row| {
                    Ok(Tag::new(
                        TagId::new(row.get(0)?),
                        row.get::<_, String>(1)?,
                        row.get(2)?,
                    ))
                },
            )
            .optional()?;
        Ok(tag)
    }

    /// Returns all tags ordered by name.
    pub fn all_tags(&self) -> Result<Vec<Tag>> {
        let conn = self.db.connection();
        let mut stmt =
            conn.prepare("SELECT id, name, created_at FROM tags ORDER BY name COLLATE NOCASE ASC")?;
        let rows = stmt.query_map([], |row| {
            Ok(Tag::new(
                TagId::new(row.get(0)?),
                row.get::<_, String>(1)?,
                row.get(2)?,
            ))
        })?;

        let mut tags = Vec::new();
        for row in rows {
            tags.push(row?);
        }
        Ok(tags)
    }

    /// Commits a reviewed expense draft: validates it, reconciles its tag
    /// names, and writes the record, tag links and one provenance row.
    ///
    /// # Errors
    ///
    /// Fails with a validation message when the title is blank or the amount
    /// is not a positive finite number; these are surfaced for correction,
    /// not pipeline failures.
    pub fn commit_expense(&self, draft: &ExpenseDraft) -> Result<RecordId> {
        if draft.title.trim().is_empty() {
            bail!("Title cannot be empty");
        }
        if !draft.amount.is_finite() || draft.amount <= 0.0 {
            bail!("Amount must be a positive number");
        }

        // Reconcile tag names first; tag creation is its own race-safe
        // protocol and stays outside the record transaction.
        let mut seen = HashSet::new();
        let mut tag_ids = Vec::new();
        for name in &draft.tags {
            let trimmed = name.trim();
            if trimmed.is_empty() || !seen.insert(trimmed.to_string()) {
                continue;
            }
            tag_ids.push(self.upsert_tag_by_name(trimmed)?.id());
        }

        let conn = self.db.connection();
        let now = now_millis();

        conn.execute("BEGIN TRANSACTION", [])?;

        let result: Result<RecordId> = (|| {
            conn.execute(
                "INSERT INTO records (occurred_at, title, amount, currency, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    draft.occurred_at,
                    draft.title.trim(),
                    draft.amount,
                    draft.currency,
                    now,
                    now
                ],
            )?;
            let record_id = RecordId::new(conn.last_insert_rowid());

            for tag_id in &tag_ids {
                conn.execute(
                    "INSERT OR IGNORE INTO record_tags (record_id, tag_id) VALUES (?1, ?2)",
                    params![record_id.get(), tag_id.get()],
                )?;
            }

            if draft.raw_text.is_some() || draft.raw_uri.is_some() {
                conn.execute(
                    "INSERT INTO raw_inputs (record_id, input_type, raw_text, raw_uri, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    params![
                        record_id.get(),
                        draft.input_type.as_str(),
                        draft.raw_text,
                        draft.raw_uri,
                        now
                    ],
                )?;
            }

            Ok(record_id)
        })();

        match result {
            Ok(record_id) => {
                conn.execute("COMMIT", [])?;
                Ok(record_id)
            }
            Err(e) => {
                let _ = conn.execute("ROLLBACK", []);
                Err(e)
            }
        }
    }

    /// Appends a provenance row to an existing record (e.g. after a
    /// re-parse). Earlier rows are never replaced or deleted.
    pub fn append_raw_input(
        &self,
        record_id: RecordId,
        input_type: InputType,
        raw_text: Option<&str>,
        raw_uri: Option<&str>,
    ) -> Result<i64> {
        let conn = self.db.connection();
        conn.execute(
            "INSERT INTO raw_inputs (record_id, input_type, raw_text, raw_uri, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                record_id.get(),
                input_type.as_str(),
                raw_text,
                raw_uri,
                now_millis()
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Fetches a record by ID.
    pub fn record(&self, id: RecordId) -> Result<Option<ExpenseRecord>> {
        let record = self
            .db
            .connection()
            .query_row(
                "SELECT id, occurred_at, title, amount, currency, created_at, updated_at
                 FROM records WHERE id = ?1 LIMIT 1",
                [id.get()],
                |row| {
                    Ok(ExpenseRecord {
                        id: RecordId::new(row.get(0)?),
                        occurred_at: row.get(1)?,
                        title: row.get(2)?,
                        amount: row.get(3)?,
                        currency: row.get(4)?,
                        created_at: row.get(5)?,
                        updated_at: row.get(6)?,
                    })
                },
            )
            .optional()?;
        Ok(record)
    }

    /// Returns the tags linked to a record, ordered by name.
    pub fn tags_for_record(&self, id: RecordId) -> Result<Vec<Tag>> {
        let conn = self.db.connection();
        let mut stmt = conn.prepare(
            "SELECT t.id, t.name, t.created_at FROM tags t
             JOIN record_tags rt ON rt.tag_id = t.id
             WHERE rt.record_id = ?1
             ORDER BY t.name COLLATE NOCASE ASC",
        )?;
        let rows = stmt.query_map([id.get()], |row| {
            Ok(Tag::new(
                TagId::new(row.get(0)?),
                row.get::<_, String>(1)?,
                row.get(2)?,
            ))
        })?;

        let mut tags = Vec::new();
        for row in rows {
            tags.push(row?);
        }
        Ok(tags)
    }

    /// Returns all provenance rows for a record, newest first.
    pub fn raw_inputs_for_record(&self, id: RecordId) -> Result<Vec<RawInput>> {
        let conn = self.db.connection();
        let mut stmt = conn.prepare(
            "SELECT id, record_id, input_type, raw_text, raw_uri, created_at
             FROM raw_inputs WHERE record_id = ?1 ORDER BY created_at DESC, id DESC",
        )?;
        let rows = stmt.query_map([id.get()], |row| {
            Ok(RawInput {
                id: row.get(0)?,
                record_id: RecordId::new(row.get(1)?),
                input_type: row.get(2)?,
                raw_text: row.get(3)?,
                raw_uri: row.get(4)?,
                created_at: row.get(5)?,
            })
        })?;

        let mut inputs = Vec::new();
        for row in rows {
            inputs.push(row?);
        }
        Ok(inputs)
    }

    /// Returns the canonical (newest) provenance row for a record.
    pub fn latest_raw_input(&self, id: RecordId) -> Result<Option<RawInput>> {
        Ok(self.raw_inputs_for_record(id)?.into_iter().next())
    }

    /// Total number of provenance rows (settings display).
    pub fn count_raw_inputs(&self) -> Result<i64> {
        let count = self
            .db
            .connection()
            .query_row("SELECT COUNT(*) FROM raw_inputs", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Deletes provenance rows created before the threshold; returns the
    /// number of rows removed. Used by retention cleanup.
    pub fn cleanup_raw_inputs_before(&self, threshold_millis: i64) -> Result<usize> {
        let deleted = self.db.connection().execute(
            "DELETE FROM raw_inputs WHERE created_at < ?1",
            [threshold_millis],
        )?;
        Ok(deleted)
    }

    /// Sum of record amounts with `occurred_at` in the inclusive range
    /// (budget display).
    pub fn sum_in_range(&self, start_millis: i64, end_millis: i64) -> Result<f64> {
        let sum = self.db.connection().query_row(
            "SELECT COALESCE(SUM(amount), 0) FROM records
             WHERE occurred_at BETWEEN ?1 AND ?2",
            [start_millis, end_millis],
            |row| row.get(0),
        )?;
        Ok(sum)
    }
}
