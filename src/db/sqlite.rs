// SqliteDatabase — rusqlite backend implementing the Database trait.
//
// The Connection is wrapped in tokio::sync::Mutex because Connection is
// !Send. Trait methods lock the mutex, do synchronous rusqlite work, and
// return; the lock is never held across .await points.

use anyhow::Result;
use async_trait::async_trait;
use rusqlite::Connection;
use tokio::sync::Mutex;

use super::models::{CommunityProfile, ForbiddenPatternEntry};
use super::traits::Database;
use crate::patterns::PatternCategory;

pub struct SqliteDatabase {
    conn: Mutex<Connection>,
}

impl SqliteDatabase {
    /// Wrap an already-opened rusqlite Connection.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }
}

#[async_trait]
impl Database for SqliteDatabase {
    async fn table_count(&self) -> Result<i64> {
        let conn = self.conn.lock().await;
        super::schema::table_count(&conn)
    }

    async fn upsert_profile(&self, profile: &CommunityProfile) -> Result<()> {
        let conn = self.conn.lock().await;
        super::queries::upsert_profile(&conn, profile)
    }

    async fn get_profile(&self, community_id: &str) -> Result<Option<CommunityProfile>> {
        let conn = self.conn.lock().await;
        super::queries::get_profile(&conn, community_id)
    }

    async fn list_profiles(&self) -> Result<Vec<CommunityProfile>> {
        let conn = self.conn.lock().await;
        super::queries::list_profiles(&conn)
    }

    async fn replace_system_patterns(
        &self,
        community_id: &str,
        entries: &[(PatternCategory, String)],
    ) -> Result<()> {
        let conn = self.conn.lock().await;
        super::queries::replace_system_patterns(&conn, community_id, entries)
    }

    async fn add_user_pattern(
        &self,
        community_id: Option<&str>,
        category: PatternCategory,
        pattern_text: &str,
    ) -> Result<i64> {
        let conn = self.conn.lock().await;
        super::queries::add_user_pattern(&conn, community_id, category, pattern_text)
    }

    async fn delete_user_pattern(&self, id: i64) -> Result<()> {
        let conn = self.conn.lock().await;
        super::queries::delete_user_pattern(&conn, id)
    }

    async fn list_patterns(
        &self,
        community_id: Option<&str>,
    ) -> Result<Vec<ForbiddenPatternEntry>> {
        let conn = self.conn.lock().await;
        super::queries::list_patterns(&conn, community_id)
    }
}
