// Database schema — table creation and migrations.
//
// Simple version-based migration approach: a `schema_version` table tracks
// which migrations have run. Profiles are stored with their nested
// structures as JSON so the shape can evolve without column migrations;
// the columns that exist are the ones operator tooling filters and sorts
// on.

use anyhow::{Context, Result};
use rusqlite::Connection;

/// Create all tables if they don't exist yet.
///
/// Idempotent — safe to call on every startup.
pub fn create_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        -- Tracks schema version for future migrations
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- One profile per analyzed community, overwritten on re-analysis
        CREATE TABLE IF NOT EXISTS community_profiles (
            community_id TEXT PRIMARY KEY,
            isc_score REAL NOT NULL,           -- 1.0 to 10.0
            isc_tier TEXT NOT NULL,            -- SensitivityTier::as_str value
            sample_size INTEGER NOT NULL,
            profile_json TEXT NOT NULL,        -- full CommunityProfile as JSON
            analyzed_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- Forbidden-pattern blacklist, system-detected and user-added
        CREATE TABLE IF NOT EXISTS forbidden_patterns (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            community_id TEXT,                 -- NULL = global
            category TEXT NOT NULL,
            pattern_text TEXT NOT NULL,
            origin TEXT NOT NULL,              -- 'system' or 'user'
            detected_at TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE(community_id, category, pattern_text)
        );

        -- Index for the per-community blacklist view
        CREATE INDEX IF NOT EXISTS idx_patterns_community
            ON forbidden_patterns(community_id);

        -- Index for ranking communities by sensitivity
        CREATE INDEX IF NOT EXISTS idx_profiles_isc
            ON community_profiles(isc_score);
        ",
    )
    .context("Failed to create database tables")?;

    // Record initial schema version if not already set
    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [1],
    )?;

    Ok(())
}

/// Count the number of user-created tables (for `init` output and the
/// status view).
pub fn table_count(conn: &Connection) -> Result<i64> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%'",
        [],
        |row| row.get(0),
    )?;
    Ok(count)
}
