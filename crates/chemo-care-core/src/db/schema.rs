//! SQLite schema definition.

/// Key-value table holding one JSON document per key.
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS kv_store (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,                          -- self-contained JSON value
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;
