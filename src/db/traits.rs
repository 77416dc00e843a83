// Database trait — backend-agnostic async interface for all DB operations.
//
// All methods are async so a sync backend (rusqlite via Mutex) and any
// future native-async backend fit behind a single interface. The trait
// mirrors the queries.rs function signatures, so callers hold an
// `Arc<dyn Database>` and never touch a Connection directly.

use anyhow::Result;
use async_trait::async_trait;

use super::models::{CommunityProfile, ForbiddenPatternEntry};
use crate::patterns::PatternCategory;

#[async_trait]
pub trait Database: Send + Sync {
    // --- Lifecycle ---

    /// Count the number of user-created tables in the database.
    async fn table_count(&self) -> Result<i64>;

    // --- Community profiles ---

    /// Save or replace a community profile (written whole).
    async fn upsert_profile(&self, profile: &CommunityProfile) -> Result<()>;

    /// Load one community's profile.
    async fn get_profile(&self, community_id: &str) -> Result<Option<CommunityProfile>>;

    /// All profiles, most sensitive first.
    async fn list_profiles(&self) -> Result<Vec<CommunityProfile>>;

    // --- Forbidden-pattern blacklist ---

    /// Replace a community's system-detected entries after a detection
    /// run, leaving user-added entries alone.
    async fn replace_system_patterns(
        &self,
        community_id: &str,
        entries: &[(PatternCategory, String)],
    ) -> Result<()>;

    /// Add a user-curated entry (global when community_id is None).
    async fn add_user_pattern(
        &self,
        community_id: Option<&str>,
        category: PatternCategory,
        pattern_text: &str,
    ) -> Result<i64>;

    /// Delete a user-added entry. Errors on system-detected entries.
    async fn delete_user_pattern(&self, id: i64) -> Result<()>;

    /// List entries visible to a community, or everything.
    async fn list_patterns(
        &self,
        community_id: Option<&str>,
    ) -> Result<Vec<ForbiddenPatternEntry>>;
}
