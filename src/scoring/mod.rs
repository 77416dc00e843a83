// Scoring — per-post quality scores and the community sensitivity index.

pub mod post;
pub mod sensitivity;

pub use post::{formality_match, rhythm_adherence, score_post, CommunityAverages, PostScore, ScoreRules};
pub use sensitivity::{calculate_isc, SensitivityIndex, SensitivityInput, SensitivityTier};
