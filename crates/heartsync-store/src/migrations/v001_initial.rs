//! v001 -- Initial schema: the persisted session and device preferences.

use rusqlite::Connection;

const UP_SQL: &str = r#"
-- ----------------------------------------------------------------
-- Session (at most one row)
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS session (
    id           INTEGER PRIMARY KEY CHECK (id = 1),
    user_id      TEXT NOT NULL,
    email        TEXT NOT NULL,
    token        TEXT NOT NULL,
    signed_in_at TEXT NOT NULL                -- RFC-3339
);

-- ----------------------------------------------------------------
-- Preferences (single JSON document)
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS preferences (
    id   INTEGER PRIMARY KEY CHECK (id = 1),
    json TEXT NOT NULL
);
"#;

pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}
