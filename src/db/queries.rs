// Database queries — CRUD operations for profiles and the blacklist.
//
// Every database interaction goes through this module. SQL stays contained
// here; the rest of the engine sees clean Rust interfaces.

use anyhow::{bail, Result};
use rusqlite::{params, Connection, OptionalExtension};

use super::models::{CommunityProfile, ForbiddenPatternEntry, PatternOrigin};
use crate::patterns::PatternCategory;

// --- Community profiles ---

/// Save or replace a community profile. The profile is written whole;
/// partial updates don't exist by design.
pub fn upsert_profile(conn: &Connection, profile: &CommunityProfile) -> Result<()> {
    let json = serde_json::to_string(profile)?;
    conn.execute(
        "INSERT INTO community_profiles
            (community_id, isc_score, isc_tier, sample_size, profile_json, analyzed_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT(community_id) DO UPDATE SET
            isc_score = ?2,
            isc_tier = ?3,
            sample_size = ?4,
            profile_json = ?5,
            analyzed_at = ?6",
        params![
            profile.community_id,
            profile.sensitivity.score,
            profile.sensitivity.tier.as_str(),
            profile.sample_size as i64,
            json,
            profile.analyzed_at,
        ],
    )?;
    Ok(())
}

/// Load one community's profile.
pub fn get_profile(conn: &Connection, community_id: &str) -> Result<Option<CommunityProfile>> {
    let mut stmt =
        conn.prepare("SELECT profile_json FROM community_profiles WHERE community_id = ?1")?;
    let json: Option<String> = stmt
        .query_row(params![community_id], |row| row.get(0))
        .optional()?;

    match json {
        Some(json) => Ok(Some(serde_json::from_str(&json)?)),
        None => Ok(None),
    }
}

/// All profiles, most sensitive communities first (the comparison view).
pub fn list_profiles(conn: &Connection) -> Result<Vec<CommunityProfile>> {
    let mut stmt =
        conn.prepare("SELECT profile_json FROM community_profiles ORDER BY isc_score DESC")?;
    let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

    let mut profiles = Vec::new();
    for json in rows {
        profiles.push(serde_json::from_str(&json?)?);
    }
    Ok(profiles)
}

// --- Forbidden-pattern blacklist ---

fn row_to_entry(row: &rusqlite::Row<'_>) -> rusqlite::Result<(i64, Option<String>, String, String, String, String)> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
    ))
}

fn entry_from_parts(
    parts: (i64, Option<String>, String, String, String, String),
) -> Result<ForbiddenPatternEntry> {
    let (id, community_id, category, pattern_text, origin, detected_at) = parts;
    let category = PatternCategory::ALL
        .iter()
        .find(|c| c.as_str() == category)
        .copied()
        .ok_or_else(|| anyhow::anyhow!("unknown pattern category in database: {category}"))?;
    let origin = PatternOrigin::parse(&origin)
        .ok_or_else(|| anyhow::anyhow!("unknown pattern origin in database: {origin}"))?;

    Ok(ForbiddenPatternEntry {
        id,
        community_id,
        category,
        pattern_text,
        origin,
        detected_at,
    })
}

/// Replace a community's system-detected entries with a fresh detection
/// run. User-added entries are untouched.
pub fn replace_system_patterns(
    conn: &Connection,
    community_id: &str,
    entries: &[(PatternCategory, String)],
) -> Result<()> {
    conn.execute(
        "DELETE FROM forbidden_patterns WHERE community_id = ?1 AND origin = 'system'",
        params![community_id],
    )?;

    let mut stmt = conn.prepare(
        "INSERT OR IGNORE INTO forbidden_patterns
            (community_id, category, pattern_text, origin, detected_at)
         VALUES (?1, ?2, ?3, 'system', datetime('now'))",
    )?;
    for (category, pattern_text) in entries {
        stmt.execute(params![community_id, category.as_str(), pattern_text])?;
    }
    Ok(())
}

/// Add a user-curated blacklist entry. `community_id = None` makes it
/// global.
pub fn add_user_pattern(
    conn: &Connection,
    community_id: Option<&str>,
    category: PatternCategory,
    pattern_text: &str,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO forbidden_patterns
            (community_id, category, pattern_text, origin, detected_at)
         VALUES (?1, ?2, ?3, 'user', datetime('now'))",
        params![community_id, category.as_str(), pattern_text],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Delete a blacklist entry. Only user-added entries may be removed;
/// system-detected entries are owned by the analysis pipeline.
pub fn delete_user_pattern(conn: &Connection, id: i64) -> Result<()> {
    let origin: Option<String> = conn
        .query_row(
            "SELECT origin FROM forbidden_patterns WHERE id = ?1",
            params![id],
            |row| row.get(0),
        )
        .optional()?;

    match origin.as_deref() {
        None => bail!("No blacklist entry with id {id}"),
        Some("user") => {
            conn.execute("DELETE FROM forbidden_patterns WHERE id = ?1", params![id])?;
            Ok(())
        }
        Some(_) => bail!("Entry {id} is system-detected and cannot be deleted"),
    }
}

/// List blacklist entries for a community (its own plus global entries),
/// or everything when no community is given.
pub fn list_patterns(
    conn: &Connection,
    community_id: Option<&str>,
) -> Result<Vec<ForbiddenPatternEntry>> {
    let mut entries = Vec::new();

    match community_id {
        Some(community) => {
            let mut stmt = conn.prepare(
                "SELECT id, community_id, category, pattern_text, origin, detected_at
                 FROM forbidden_patterns
                 WHERE community_id = ?1 OR community_id IS NULL
                 ORDER BY category, pattern_text",
            )?;
            let rows = stmt.query_map(params![community], row_to_entry)?;
            for row in rows {
                entries.push(entry_from_parts(row?)?);
            }
        }
        None => {
            let mut stmt = conn.prepare(
                "SELECT id, community_id, category, pattern_text, origin, detected_at
                 FROM forbidden_patterns
                 ORDER BY community_id, category, pattern_text",
            )?;
            let rows = stmt.query_map([], row_to_entry)?;
            for row in rows {
                entries.push(entry_from_parts(row?)?);
            }
        }
    }

    Ok(entries)
}
