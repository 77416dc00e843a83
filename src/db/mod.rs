// Persistence — community profiles and the forbidden-pattern blacklist.
//
// These are the engine's only durable artifacts. Post scores may be
// cached by callers but are always reproducible from raw posts plus the
// community's then-current averages.

pub mod models;
pub mod queries;
pub mod schema;
pub mod sqlite;
pub mod traits;

use anyhow::{Context, Result};
use rusqlite::Connection;

use sqlite::SqliteDatabase;

/// Open (or create) the SQLite database at `path` and ensure the schema
/// exists.
pub fn open(path: &str) -> Result<SqliteDatabase> {
    let conn =
        Connection::open(path).with_context(|| format!("Failed to open database at {path}"))?;
    schema::create_tables(&conn)?;
    Ok(SqliteDatabase::new(conn))
}

/// In-memory database for tests and dry runs.
pub fn open_in_memory() -> Result<SqliteDatabase> {
    let conn = Connection::open_in_memory()?;
    schema::create_tables(&conn)?;
    Ok(SqliteDatabase::new(conn))
}
