/// Complete database schema for the expense tracker.
///
/// Uses CREATE TABLE/INDEX IF NOT EXISTS for idempotent execution.
/// All statements are designed to be run in a single transaction.
/// All timestamps are epoch milliseconds.
pub const INITIAL_SCHEMA: &str = r#"
-- Expense records
CREATE TABLE IF NOT EXISTS records (
    id INTEGER PRIMARY KEY,
    occurred_at INTEGER NOT NULL,
    title TEXT NOT NULL,
    amount REAL NOT NULL,
    currency TEXT NOT NULL DEFAULT 'CNY',
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);

-- Tag registry: one row per name, case-sensitive
CREATE TABLE IF NOT EXISTS tags (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    created_at INTEGER NOT NULL
);

-- Junction table: links records to tags (many-to-many)
CREATE TABLE IF NOT EXISTS record_tags (
    record_id INTEGER NOT NULL,
    tag_id INTEGER NOT NULL,
    PRIMARY KEY (record_id, tag_id),
    FOREIGN KEY (record_id) REFERENCES records(id) ON DELETE CASCADE,
    FOREIGN KEY (tag_id) REFERENCES tags(id) ON DELETE CASCADE
);

-- Raw-input provenance: one row per parse, accumulated over a record's life
CREATE TABLE IF NOT EXISTS raw_inputs (
    id INTEGER PRIMARY KEY,
    record_id INTEGER NOT NULL,
    input_type TEXT NOT NULL,
    raw_text TEXT,
    raw_uri TEXT,
    created_at INTEGER NOT NULL,
    FOREIGN KEY (record_id) REFERENCES records(id) ON DELETE CASCADE
);

-- Indexes for range queries over records
CREATE INDEX IF NOT EXISTS idx_records_occurred ON records(occurred_at);
CREATE INDEX IF NOT EXISTS idx_records_amount ON records(amount);

-- Indexes for provenance lookups and retention cleanup
CREATE INDEX IF NOT EXISTS idx_raw_inputs_record ON raw_inputs(record_id);
CREATE INDEX IF NOT EXISTS idx_raw_inputs_created ON raw_inputs(created_at);
"#;
