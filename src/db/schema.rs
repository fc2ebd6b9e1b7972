/// Complete database schema for the notes application.
///
/// Uses CREATE TABLE/INDEX IF NOT EXISTS for idempotent execution.
/// Link and tag structure is not stored; both live inside note content as
/// `[[Title]]` and `#tag` text and are derived on demand.
pub const INITIAL_SCHEMA: &str = r#"
-- Notes table: stores note title and content with timestamps
CREATE TABLE IF NOT EXISTS notes (
    id INTEGER PRIMARY KEY,
    title TEXT NOT NULL DEFAULT '',
    content TEXT NOT NULL DEFAULT '',
    created_at INTEGER,
    updated_at INTEGER
);

-- Index for listing notes by recency
CREATE INDEX IF NOT EXISTS idx_notes_updated ON notes(updated_at);
"#;
