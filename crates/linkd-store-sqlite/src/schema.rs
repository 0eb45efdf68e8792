//! SQL schema for the linkd SQLite store.
//!
//! Executed once at connection startup. `PRAGMA user_version` records the
//! schema revision for future migrations.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    id                            INTEGER PRIMARY KEY AUTOINCREMENT,
    email                         TEXT NOT NULL UNIQUE,
    password_hash                 TEXT NOT NULL,
    email_verified                INTEGER NOT NULL DEFAULT 0,
    email_verification_hash       TEXT,
    email_verification_expires_at TEXT,
    password_reset_hash           TEXT,
    password_reset_expires_at     TEXT,
    first_name                    TEXT,
    last_name                     TEXT,
    company                       TEXT,
    position                      TEXT,
    location                      TEXT,
    profile_picture               TEXT,
    profile_complete              INTEGER NOT NULL DEFAULT 0,
    created_at                    TEXT NOT NULL
);

-- Only the SHA-256 digest of a bearer token is stored.
CREATE TABLE IF NOT EXISTS sessions (
    token_hash TEXT PRIMARY KEY,
    user_id    INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS posts (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    author_id     INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    content       TEXT NOT NULL CHECK (content != ''),
    picture       TEXT,
    creation_date TEXT NOT NULL,   -- RFC 3339 UTC, fixed microsecond precision
    updated_date  TEXT
);

CREATE TABLE IF NOT EXISTS post_likes (
    post_id INTEGER NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    PRIMARY KEY (post_id, user_id)
);

CREATE TABLE IF NOT EXISTS comments (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    post_id       INTEGER NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
    author_id     INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    content       TEXT NOT NULL,
    creation_date TEXT NOT NULL,
    updated_date  TEXT
);

CREATE TABLE IF NOT EXISTS notifications (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    actor_id      INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    recipient_id  INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    type          TEXT NOT NULL CHECK (type IN ('LIKE', 'COMMENT')),
    read          INTEGER NOT NULL DEFAULT 0,
    resource_id   INTEGER NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
    creation_date TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS posts_author_idx         ON posts(author_id);
CREATE INDEX IF NOT EXISTS posts_created_idx        ON posts(creation_date);
CREATE INDEX IF NOT EXISTS comments_post_idx        ON comments(post_id);
CREATE INDEX IF NOT EXISTS notifications_recipient_idx ON notifications(recipient_id);

PRAGMA user_version = 1;
";
