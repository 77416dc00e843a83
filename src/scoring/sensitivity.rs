// Community sensitivity index (ISC) — quartile-contrast calculation.
//
// Ranks a community's posts by total score, takes the top and bottom 25%
// as cohorts, and contrasts promotional-signal prevalence and authenticity
// between them. If jargon-heavy posts cluster in the bottom cohort the
// community punishes jargon (factor trends high); if jargon appears evenly
// the community tolerates it (factor trends low).
//
// Hard precondition: at least 10 scored posts. Below that the index is
// undefined and reported as insufficient data, never approximated.

use serde::{Deserialize, Serialize};

use super::post::{round2, PostScore};
use crate::error::{EngineError, MIN_POSTS_FOR_ISC};

/// Sensitivity tier, derived purely from the final score by fixed
/// thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SensitivityTier {
    Low,
    Moderate,
    High,
    VeryHigh,
}

impl SensitivityTier {
    /// Determine the tier from an ISC score (1.0-10.0).
    pub fn from_score(score: f64) -> Self {
        match score {
            s if s >= 7.0 => SensitivityTier::VeryHigh,
            s if s >= 5.0 => SensitivityTier::High,
            s if s >= 3.0 => SensitivityTier::Moderate,
            _ => SensitivityTier::Low,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SensitivityTier::Low => "Low Sensitivity",
            SensitivityTier::Moderate => "Moderate Sensitivity",
            SensitivityTier::High => "High Sensitivity",
            SensitivityTier::VeryHigh => "Very High Sensitivity",
        }
    }
}

impl std::fmt::Display for SensitivityTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One post's view into the sensitivity calculation.
pub struct SensitivityInput<'a> {
    pub score: &'a PostScore,
    pub comment_count: u32,
}

/// The community sensitivity index with its four sub-factor contributions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensitivityIndex {
    /// Final weighted score, 1.0-10.0, one decimal.
    pub score: f64,
    pub tier: SensitivityTier,
    pub jargon_sensitivity: f64,
    pub link_sensitivity: f64,
    pub vulnerability_preference: f64,
    pub engagement_depth: f64,
}

/// Fewer discussed posts than this and the depth factor falls back to
/// neutral.
const MIN_DISCUSSED_POSTS: usize = 5;

/// Calculate the ISC for one community from its scored posts.
pub fn calculate_isc(
    community: &str,
    posts: &[SensitivityInput],
) -> Result<SensitivityIndex, EngineError> {
    if posts.len() < MIN_POSTS_FOR_ISC {
        return Err(EngineError::insufficient_data(community, posts.len()));
    }

    // Rank by total score, best first
    let mut ranked: Vec<&SensitivityInput> = posts.iter().collect();
    ranked.sort_by(|a, b| {
        b.score
            .total_score
            .partial_cmp(&a.score.total_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let cohort = (ranked.len() / 4).max(1);
    let top = &ranked[..cohort];
    let bottom = &ranked[ranked.len() - cohort..];

    // Factor 1: jargon sensitivity. Promotional posts clustering in the
    // bottom cohort push this toward 10.
    let jargon_sensitivity = cohort_contrast(
        top.iter().filter(|p| p.score.jargon_penalty > 0.0).count(),
        bottom.iter().filter(|p| p.score.jargon_penalty > 0.0).count(),
    );

    // Factor 2: link sensitivity, same shape.
    let link_sensitivity = cohort_contrast(
        top.iter()
            .filter(|p| p.score.link_density_penalty > 0.0)
            .count(),
        bottom
            .iter()
            .filter(|p| p.score.link_density_penalty > 0.0)
            .count(),
    );

    // Factor 3: vulnerability preference — do authentic posts rise?
    let top_vuln = mean(top.iter().map(|p| p.score.vulnerability_weight));
    let bottom_vuln = mean(bottom.iter().map(|p| p.score.vulnerability_weight));
    let vulnerability_preference = (5.0 + (top_vuln - bottom_vuln)).clamp(0.0, 10.0);

    // Factor 4: engagement depth — do the most-discussed posts read as
    // authentic (formality fit + vulnerability)?
    let engagement_depth = engagement_depth_factor(posts);

    let isc = jargon_sensitivity * 0.3
        + link_sensitivity * 0.2
        + vulnerability_preference * 0.3
        + engagement_depth * 0.2;
    let isc = round1(isc.clamp(1.0, 10.0));

    Ok(SensitivityIndex {
        score: isc,
        tier: SensitivityTier::from_score(isc),
        jargon_sensitivity: round2(jargon_sensitivity),
        link_sensitivity: round2(link_sensitivity),
        vulnerability_preference: round2(vulnerability_preference),
        engagement_depth: round2(engagement_depth),
    })
}

/// Contrast a signal's presence between cohorts: 10 - (top/bottom)*5,
/// clamped 0-10. No signal in the bottom cohort gives no information,
/// so the factor defaults to a neutral 5.0.
fn cohort_contrast(top_count: usize, bottom_count: usize) -> f64 {
    if bottom_count == 0 {
        return 5.0;
    }
    let ratio = top_count as f64 / bottom_count as f64;
    (10.0 - ratio * 5.0).clamp(0.0, 10.0)
}

fn engagement_depth_factor(posts: &[SensitivityInput]) -> f64 {
    let mut discussed: Vec<&SensitivityInput> =
        posts.iter().filter(|p| p.comment_count > 0).collect();

    if discussed.len() < MIN_DISCUSSED_POSTS {
        return 5.0;
    }

    discussed.sort_by(|a, b| b.comment_count.cmp(&a.comment_count));
    let take = if discussed.len() >= 4 {
        discussed.len() / 4
    } else {
        2
    };
    let top_discussed = &discussed[..take.max(1)];

    let authenticity = mean(
        top_discussed
            .iter()
            .map(|p| (p.score.formality_match + p.score.vulnerability_weight) / 2.0),
    );
    authenticity.clamp(0.0, 10.0)
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let values: Vec<f64> = values.collect();
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
