//! SQL schema for the meetbot SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS principals (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    subject       TEXT NOT NULL UNIQUE,   -- identity-provider `sub`
    email         TEXT NOT NULL UNIQUE,
    access_token  TEXT,
    refresh_token TEXT,                   -- only replaced when a new one is issued
    expires_at    INTEGER                 -- epoch seconds
);

PRAGMA user_version = 1;
";
