//! SQL schema for the Numis SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- One row per issue, keyed by the COUNTRY-TYPE-YEAR-MINT[-SUFFIX] id.
-- Writes are insert-or-replace; the only DELETE is the first half of a
-- split operation.
CREATE TABLE IF NOT EXISTS issues (
    id                      TEXT PRIMARY KEY,
    series_id               TEXT NOT NULL,
    series_name             TEXT NOT NULL,
    country                 TEXT NOT NULL,
    denomination            TEXT NOT NULL,
    year                    TEXT NOT NULL,   -- four digits or 'XXXX'
    mint                    TEXT NOT NULL,
    business_strikes        INTEGER,         -- NULL = unknown
    proof_strikes           INTEGER,
    rarity                  TEXT,            -- 'key' | 'semi-key' | 'scarce' | 'common'
    composition             TEXT,            -- JSON object: material -> fraction
    weight_grams            REAL,
    diameter_mm             REAL,
    varieties               TEXT NOT NULL DEFAULT '[]',  -- JSON list
    obverse_description     TEXT NOT NULL,
    reverse_description     TEXT NOT NULL,
    distinguishing_features TEXT NOT NULL,   -- JSON list
    identification_keywords TEXT NOT NULL,   -- JSON list
    common_names            TEXT NOT NULL,   -- JSON list
    source_citation         TEXT,
    notes                   TEXT
);

CREATE TABLE IF NOT EXISTS series (
    series_id    TEXT PRIMARY KEY,
    series_name  TEXT NOT NULL,
    country      TEXT NOT NULL,
    denomination TEXT NOT NULL,
    start_year   INTEGER NOT NULL,
    end_year     INTEGER,            -- NULL = ongoing
    aliases      TEXT NOT NULL DEFAULT '[]',  -- JSON list
    series_code  TEXT                -- must equal member ids' TYPE segment
);

CREATE TABLE IF NOT EXISTS mint_facilities (
    code         TEXT PRIMARY KEY,
    name         TEXT NOT NULL,
    active_from  INTEGER NOT NULL,
    active_until INTEGER             -- NULL = still striking
);

CREATE TABLE IF NOT EXISTS type_codes (
    code       TEXT PRIMARY KEY,
    category   TEXT NOT NULL,
    face_value REAL NOT NULL
);

CREATE INDEX IF NOT EXISTS issues_series_idx       ON issues(series_id);
CREATE INDEX IF NOT EXISTS issues_denomination_idx ON issues(denomination);
CREATE INDEX IF NOT EXISTS issues_year_idx         ON issues(year);

PRAGMA user_version = 1;
";
