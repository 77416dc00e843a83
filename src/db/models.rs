// Data models — the types that flow through the engine and map to
// database rows. Kept separate from the queries so other modules can use
// them without depending on rusqlite directly.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::nlp::Tone;
use crate::patterns::{PatternCategory, PatternSummary};
use crate::scoring::SensitivityIndex;
use crate::style::StyleFingerprint;

/// A collected community post. Owned by the collection subsystem;
/// read-only to this engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawPost {
    pub id: String,
    pub community_id: String,
    #[serde(default)]
    pub title: String,
    pub text: String,
    #[serde(default)]
    pub upvotes: u32,
    #[serde(default)]
    pub comment_count: u32,
    /// Label from the external archetype classifier, consumed as opaque
    /// data.
    #[serde(default)]
    pub archetype: Option<String>,
    #[serde(default)]
    pub collected_at: Option<String>,
}

/// The durable per-community analysis artifact. Created whole by a full
/// pipeline run and overwritten on re-analysis — never partially mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommunityProfile {
    pub community_id: String,
    pub sensitivity: SensitivityIndex,
    pub dominant_tone: Tone,
    pub formality_level: Option<f64>,
    pub avg_sentence_length: Option<f64>,
    /// Opening segments of the top posts by score.
    pub top_success_hooks: Vec<String>,
    pub forbidden_patterns: PatternSummary,
    /// Count-by-label passthrough from the external classifier.
    pub archetype_distribution: BTreeMap<String, usize>,
    pub style: StyleFingerprint,
    pub sample_size: usize,
    pub analyzed_at: String,
}

/// Who created a blacklist entry. System-detected entries are immutable
/// from outside the engine; only user-added entries may be deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternOrigin {
    System,
    User,
}

impl PatternOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            PatternOrigin::System => "system",
            PatternOrigin::User => "user",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "system" => Some(PatternOrigin::System),
            "user" => Some(PatternOrigin::User),
            _ => None,
        }
    }
}

/// A persisted forbidden-pattern blacklist entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForbiddenPatternEntry {
    pub id: i64,
    /// None = global entry, applies to every community.
    pub community_id: Option<String>,
    pub category: PatternCategory,
    pub pattern_text: String,
    pub origin: PatternOrigin,
    pub detected_at: String,
}
