//! SQL schema for the reachlog SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- One row per distinct profile URL. Rows are upserted, never deleted.
CREATE TABLE IF NOT EXISTS prospects (
    id                     INTEGER PRIMARY KEY AUTOINCREMENT,
    profile_url            TEXT NOT NULL UNIQUE,
    first_name             TEXT,
    last_name              TEXT,
    company                TEXT,
    title                  TEXT,
    email                  TEXT,
    lead_id                TEXT,
    status                 TEXT NOT NULL DEFAULT 'qualified',
    connection_sent_at     TEXT,            -- RFC 3339 UTC or NULL
    connection_accepted_at TEXT,            -- RFC 3339 UTC or NULL
    blacklisted            INTEGER NOT NULL DEFAULT 0,
    created_at             TEXT NOT NULL,
    updated_at             TEXT NOT NULL
);

-- Events are strictly append-only.
-- No UPDATE or DELETE is ever issued against this table.
CREATE TABLE IF NOT EXISTS events (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    prospect_id INTEGER NOT NULL REFERENCES prospects(id),
    event_type  TEXT NOT NULL,
    lead_id     TEXT,
    raw_payload TEXT NOT NULL,   -- webhook body, verbatim
    received_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS prospects_status_idx   ON prospects(status);
CREATE INDEX IF NOT EXISTS prospects_lead_idx     ON prospects(lead_id);
CREATE INDEX IF NOT EXISTS prospects_created_idx  ON prospects(created_at);
CREATE INDEX IF NOT EXISTS events_type_idx        ON events(event_type);
CREATE INDEX IF NOT EXISTS events_prospect_idx    ON events(prospect_id);
CREATE INDEX IF NOT EXISTS events_received_idx    ON events(received_at);

PRAGMA user_version = 1;
";
