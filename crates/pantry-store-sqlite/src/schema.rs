//! SQL schema for the Pantry SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    id            TEXT PRIMARY KEY,
    email         TEXT NOT NULL UNIQUE COLLATE NOCASE,
    password_hash TEXT NOT NULL,          -- argon2 PHC string
    created_at    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS profiles (
    id         TEXT PRIMARY KEY REFERENCES users(id) ON DELETE CASCADE,
    full_name  TEXT NOT NULL,
    role       TEXT NOT NULL DEFAULT 'member',   -- 'admin' | 'member'
    avatar_url TEXT,
    created_at TEXT NOT NULL
);

-- Only SHA-256 digests of bearer tokens are stored.
CREATE TABLE IF NOT EXISTS sessions (
    token_digest TEXT PRIMARY KEY,
    user_id      TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    created_at   TEXT NOT NULL,
    expires_at   TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS magic_links (
    token_digest TEXT PRIMARY KEY,
    user_id      TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    expires_at   TEXT NOT NULL,
    used_at      TEXT
);

CREATE TABLE IF NOT EXISTS beneficiaries (
    id                 TEXT PRIMARY KEY,
    name               TEXT NOT NULL,
    kind               TEXT NOT NULL,     -- 'household' | 'organization'
    document           TEXT,
    address            TEXT,
    contact_info       TEXT,
    responsible_person TEXT,
    active             INTEGER NOT NULL DEFAULT 1,
    created_at         TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS inventory_items (
    id            TEXT PRIMARY KEY,
    created_at    TEXT NOT NULL,
    item_name     TEXT NOT NULL,
    category      TEXT NOT NULL,          -- 'food' | 'clothing' | 'furniture' | 'financial'
    quantity      INTEGER NOT NULL CHECK (quantity >= 0),
    donor_name    TEXT,
    received_date TEXT NOT NULL,          -- YYYY-MM-DD
    expiry_date   TEXT,                   -- YYYY-MM-DD or NULL
    photo_url     TEXT,
    created_by    TEXT NOT NULL REFERENCES profiles(id)
);

-- items_json is a snapshot taken at delivery time; it does not reference
-- inventory_items so deleting stock never rewrites history.
CREATE TABLE IF NOT EXISTS donation_movements (
    id                 TEXT PRIMARY KEY,
    beneficiary_id     TEXT NOT NULL REFERENCES beneficiaries(id),
    items_json         TEXT NOT NULL,
    delivered_at       TEXT NOT NULL,
    evidence_photo_url TEXT,
    delivered_by       TEXT NOT NULL REFERENCES profiles(id),
    created_at         TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS webhook_configs (
    id         TEXT PRIMARY KEY,
    event_type TEXT NOT NULL,             -- configured wire name
    url        TEXT NOT NULL,
    active     INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL,
    created_by TEXT NOT NULL REFERENCES profiles(id)
);

CREATE INDEX IF NOT EXISTS items_created_idx     ON inventory_items(created_at);
CREATE INDEX IF NOT EXISTS items_expiry_idx      ON inventory_items(expiry_date);
CREATE INDEX IF NOT EXISTS movements_benef_idx   ON donation_movements(beneficiary_id);
CREATE INDEX IF NOT EXISTS movements_deliver_idx ON donation_movements(delivered_at);
CREATE INDEX IF NOT EXISTS webhooks_event_idx    ON webhook_configs(event_type, active);
CREATE INDEX IF NOT EXISTS sessions_user_idx     ON sessions(user_id);

PRAGMA user_version = 1;
";
