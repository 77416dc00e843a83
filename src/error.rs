// Engine error taxonomy.
//
// Three conditions are first-class errors; everything else flows through
// anyhow at the application layer:
// - InsufficientData: a community has fewer than the minimum posts needed
//   for a sensitivity index. Blocks profile creation for that community
//   only — the batch keeps going.
// - PatternCompilation: a forbidden-pattern rule failed to compile. Fatal
//   at process start, never deferred to first use.
// - Cancelled: the operator stopped a run via the cooperative flag.
//
// Degenerate post text is NOT an error: the extractor returns neutral
// metrics and processing continues. Retries are meaningless everywhere in
// this engine — identical input fails identically.

use thiserror::Error;

/// Minimum number of scored posts required to compute a sensitivity index.
pub const MIN_POSTS_FOR_ISC: usize = 10;

#[derive(Debug, Error)]
pub enum EngineError {
    /// Fewer posts than the sensitivity calculator's hard precondition.
    #[error("insufficient data for {community}: {got} posts (need {need}+)")]
    InsufficientData {
        community: String,
        got: usize,
        need: usize,
    },

    /// A forbidden-pattern rule failed to compile at startup.
    #[error("pattern rule failed to compile in category {category}: {rule}")]
    PatternCompilation {
        category: &'static str,
        rule: &'static str,
        #[source]
        source: regex_lite::Error,
    },

    /// The operator cancelled an analysis run. Checked between posts, so
    /// at most one post of work is discarded.
    #[error("analysis run cancelled after {processed} of {total} posts")]
    Cancelled { processed: usize, total: usize },
}

impl EngineError {
    pub fn insufficient_data(community: &str, got: usize) -> Self {
        EngineError::InsufficientData {
            community: community.to_string(),
            got,
            need: MIN_POSTS_FOR_ISC,
        }
    }
}
