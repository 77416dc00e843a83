// Post quality scoring — how well one post fits its community's norms.
//
// Weighted formula, fixed rather than learned:
//
//   total = vulnerability*0.25 + rhythm*0.25 + formality*0.20
//           - jargon_penalty*0.15 - link_penalty*0.15     (clamped 0-10)
//
// Positive factors reward authenticity and stylistic fit. Penalties are
// subtracted, not blended, so a promotional post cannot buy back a high
// score with good rhythm.

use regex_lite::Regex;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::nlp::PostMetrics;
use crate::patterns::{PatternCategory, PenaltyPhrase, Severity};

/// Regex sources for the vulnerability factor: personal pronouns,
/// questions, emotional markers, storytelling markers. Every match counts.
const VULNERABILITY_SOURCES: &[&str] = &[
    r"(?i)\b(I|my|me|we|our|us)\b",
    r"\?",
    r"(?i)\b(struggled|frustrated|confused|worried|concerned)\b",
    r"(?i)\b(story|journey|experience|learned|realized)\b",
];

/// Marketing-jargon phrases. Distinct phrases count, not occurrences.
const JARGON_SOURCES: &[&str] = &[
    r"(?i)\bsynerg\w*\b",
    r"(?i)\bleverage\b",
    r"(?i)\bparadigm\b",
    r"(?i)\bdisrupt\w*\b",
    r"(?i)\binnovat\w*\b",
    r"(?i)\bgame-changer\b",
    r"(?i)\bthought leader\b",
    r"(?i)\bbest-in-class\b",
    r"(?i)\breach out\b",
    r"(?i)\bcircle back\b",
    r"(?i)\btouch base\b",
    r"(?i)\brevolutionary\b",
    r"(?i)\bcutting-edge\b",
    r"(?i)\bscalable\b",
    r"\bROI\b",
    r"(?i)\bgrowth hack\w*\b",
];

const URL_SOURCE: &str = r"(?i)https?://\S+|www\.\S+";

/// Compiled scoring lexicons. Like the pattern RuleSet, compiled once at
/// process start and shared read-only across workers.
pub struct ScoreRules {
    vulnerability: Vec<Regex>,
    jargon: Vec<Regex>,
    url: Regex,
}

impl ScoreRules {
    pub fn compile() -> Result<Self, EngineError> {
        let compile = |category: &'static str, source: &'static str| {
            Regex::new(source).map_err(|e| EngineError::PatternCompilation {
                category,
                rule: source,
                source: e,
            })
        };

        Ok(Self {
            vulnerability: VULNERABILITY_SOURCES
                .iter()
                .map(|s| compile("scoring/vulnerability", s))
                .collect::<Result<_, _>>()?,
            jargon: JARGON_SOURCES
                .iter()
                .map(|s| compile("scoring/jargon", s))
                .collect::<Result<_, _>>()?,
            url: compile("scoring/url", URL_SOURCE)?,
        })
    }

    /// Vulnerability/authenticity factor (0-10). Tiered: 0 matches = 0,
    /// 1-3 = 3, 4-6 = 5, 7-10 = 7, beyond that +0.3 per match up to 10.
    pub fn vulnerability_weight(&self, text: &str) -> f64 {
        if text.is_empty() {
            return 0.0;
        }

        let matches: usize = self
            .vulnerability
            .iter()
            .map(|re| re.find_iter(text).count())
            .sum();

        let score = match matches {
            0 => 0.0,
            1..=3 => 3.0,
            4..=6 => 5.0,
            7..=10 => 7.0,
            n => (7.0 + (n - 10) as f64 * 0.3).min(10.0),
        };
        round2(score)
    }

    /// Marketing-jargon penalty (0-10, higher = worse) plus the phrases
    /// that triggered it. Tiered: 1 phrase = 3, 2 = 5, 3 = 8, then +0.5
    /// per extra phrase up to 10.
    pub fn jargon_penalty(&self, text: &str) -> (f64, Vec<PenaltyPhrase>) {
        if text.is_empty() {
            return (0.0, Vec::new());
        }

        let mut seen = std::collections::HashSet::new();
        let mut phrases: Vec<String> = Vec::new();
        for re in &self.jargon {
            for m in re.find_iter(text) {
                let phrase = m.as_str().to_string();
                if seen.insert(phrase.to_lowercase()) {
                    phrases.push(phrase);
                }
            }
        }

        let (penalty, severity) = match phrases.len() {
            0 => (0.0, None),
            1 => (3.0, Some(Severity::Low)),
            2 => (5.0, Some(Severity::Medium)),
            3 => (8.0, Some(Severity::High)),
            n => ((8.0 + (n - 3) as f64 * 0.5).min(10.0), Some(Severity::High)),
        };

        let penalty_phrases = severity
            .map(|severity| {
                phrases
                    .into_iter()
                    .map(|phrase| PenaltyPhrase {
                        phrase,
                        category: PatternCategory::Promotional,
                        severity,
                    })
                    .collect()
            })
            .unwrap_or_default();

        (round2(penalty), penalty_phrases)
    }

    /// Link-density penalty (0-10) plus the URLs that triggered it.
    /// 0 links = 0, 1 = 3, 2 = 6, 3+ = 9.
    pub fn link_density_penalty(&self, text: &str) -> (f64, Vec<PenaltyPhrase>) {
        if text.is_empty() {
            return (0.0, Vec::new());
        }

        let links: Vec<String> = self
            .url
            .find_iter(text)
            .map(|m| m.as_str().to_string())
            .collect();

        let (penalty, severity) = match links.len() {
            0 => (0.0, None),
            1 => (3.0, Some(Severity::Low)),
            2 => (6.0, Some(Severity::Medium)),
            _ => (9.0, Some(Severity::High)),
        };

        let penalty_phrases = severity
            .map(|severity| {
                links
                    .into_iter()
                    .map(|phrase| PenaltyPhrase {
                        phrase,
                        category: PatternCategory::LinkPatterns,
                        severity,
                    })
                    .collect()
            })
            .unwrap_or_default();

        (round2(penalty), penalty_phrases)
    }
}

/// Frozen community-level averages, computed over one community's full
/// metrics pass before any post is scored. Fields are None when no post
/// in the community produced the underlying metric.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommunityAverages {
    pub formality: Option<f64>,
    pub avg_sentence_length: Option<f64>,
    pub sentence_length_std: Option<f64>,
}

impl CommunityAverages {
    /// Mean of the per-post metrics that are present.
    pub fn from_metrics(metrics: &[PostMetrics]) -> Self {
        fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
            let values: Vec<f64> = values.collect();
            if values.is_empty() {
                None
            } else {
                Some(values.iter().sum::<f64>() / values.len() as f64)
            }
        }

        Self {
            formality: mean(metrics.iter().filter_map(|m| m.formality)),
            avg_sentence_length: mean(metrics.iter().filter_map(|m| m.avg_sentence_length)),
            sentence_length_std: mean(metrics.iter().filter_map(|m| m.sentence_length_std)),
        }
    }
}

/// Rhythm adherence (0-10): primarily how far the post's average sentence
/// length sits from the community's, with a small penalty for mismatched
/// burstiness. Missing data on either side scores a neutral 5.0.
pub fn rhythm_adherence(
    post_avg: Option<f64>,
    post_std: Option<f64>,
    community_avg: Option<f64>,
    community_std: Option<f64>,
) -> f64 {
    let (Some(post_avg), Some(community_avg)) = (post_avg, community_avg) else {
        return 5.0;
    };

    let mut score = (10.0 - (post_avg - community_avg).abs()).max(0.0);

    if let (Some(post_std), Some(community_std)) = (post_std, community_std) {
        let std_penalty = ((post_std - community_std).abs() * 0.5).min(2.0);
        score -= std_penalty;
    }

    round2(score.clamp(0.0, 10.0))
}

/// Formality match (0-10): 10 minus twice the grade-level gap. Missing
/// data scores a neutral 5.0.
pub fn formality_match(post_formality: Option<f64>, community_formality: Option<f64>) -> f64 {
    let (Some(post), Some(community)) = (post_formality, community_formality) else {
        return 5.0;
    };

    round2((10.0 - (post - community).abs() * 2.0).max(0.0))
}

/// The full factor breakdown for one scored post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostScore {
    pub vulnerability_weight: f64,
    pub rhythm_adherence: f64,
    pub formality_match: f64,
    pub jargon_penalty: f64,
    pub link_density_penalty: f64,
    /// Weighted combination, clamped to [0, 10].
    pub total_score: f64,
    /// Every phrase that contributed to a penalty, for inline highlighting.
    pub penalty_phrases: Vec<PenaltyPhrase>,
}

/// Score one post against its community's frozen averages.
pub fn score_post(
    rules: &ScoreRules,
    text: &str,
    metrics: &PostMetrics,
    community: &CommunityAverages,
) -> PostScore {
    let vulnerability = rules.vulnerability_weight(text);
    let rhythm = rhythm_adherence(
        metrics.avg_sentence_length,
        metrics.sentence_length_std,
        community.avg_sentence_length,
        community.sentence_length_std,
    );
    let formality = formality_match(metrics.formality, community.formality);

    let (jargon, jargon_phrases) = rules.jargon_penalty(text);
    let (link, link_phrases) = rules.link_density_penalty(text);

    let mut penalty_phrases = jargon_phrases;
    penalty_phrases.extend(link_phrases);

    let total = vulnerability * 0.25 + rhythm * 0.25 + formality * 0.20
        - jargon * 0.15
        - link * 0.15;

    PostScore {
        vulnerability_weight: vulnerability,
        rhythm_adherence: rhythm,
        formality_match: formality,
        jargon_penalty: jargon,
        link_density_penalty: link,
        total_score: round2(total.clamp(0.0, 10.0)),
        penalty_phrases,
    }
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nlp::extract_metrics;

    fn rules() -> ScoreRules {
        ScoreRules::compile().expect("scoring rules compile")
    }

    #[test]
    fn vulnerability_tiers() {
        let r = rules();
        assert_eq!(r.vulnerability_weight(""), 0.0);
        assert_eq!(r.vulnerability_weight("The server restarted."), 0.0);
        // "I" + "my" = 2 matches -> tier 3.0
        assert_eq!(r.vulnerability_weight("I rebooted my server."), 3.0);
        // I, my, ?, struggled, journey, learned = 6 -> 5.0
        assert_eq!(
            r.vulnerability_weight("I struggled on my journey and learned a lot, you know?"),
            5.0
        );
    }

    #[test]
    fn jargon_tiers_and_phrases() {
        let r = rules();
        let (p0, ph0) = r.jargon_penalty("Nothing promotional here.");
        assert_eq!((p0, ph0.len()), (0.0, 0));

        let (p1, ph1) = r.jargon_penalty("We leverage the cloud.");
        assert_eq!(p1, 3.0);
        assert_eq!(ph1[0].severity, Severity::Low);

        let (p3, ph3) = r.jargon_penalty("Leverage synergy to disrupt the market.");
        assert_eq!(p3, 8.0);
        assert!(ph3.iter().all(|p| p.severity == Severity::High));

        let (p5, _) = r.jargon_penalty(
            "Leverage synergy to disrupt the paradigm with scalable tools.",
        );
        assert_eq!(p5, 9.0); // five phrases: 8.0 + 2 * 0.5
    }

    #[test]
    fn jargon_distinct_phrases_only() {
        let r = rules();
        let (p, phrases) = r.jargon_penalty("leverage this, then leverage that, then Leverage more");
        assert_eq!(p, 3.0);
        assert_eq!(phrases.len(), 1);
    }

    #[test]
    fn link_tiers() {
        let r = rules();
        assert_eq!(r.link_density_penalty("no links").0, 0.0);
        assert_eq!(r.link_density_penalty("see https://a.io").0, 3.0);
        assert_eq!(r.link_density_penalty("https://a.io and https://b.io").0, 6.0);
        assert_eq!(
            r.link_density_penalty("https://a.io https://b.io https://c.io https://d.io").0,
            9.0
        );
    }

    #[test]
    fn rhythm_neutral_on_missing_data() {
        assert_eq!(rhythm_adherence(None, None, Some(12.0), None), 5.0);
        assert_eq!(rhythm_adherence(Some(12.0), None, None, None), 5.0);
    }

    #[test]
    fn rhythm_perfect_match() {
        assert_eq!(rhythm_adherence(Some(14.0), Some(3.0), Some(14.0), Some(3.0)), 10.0);
    }

    #[test]
    fn rhythm_std_penalty_is_capped() {
        // avg matches exactly; std differs by 10 -> penalty capped at 2.0
        assert_eq!(rhythm_adherence(Some(14.0), Some(12.0), Some(14.0), Some(2.0)), 8.0);
    }

    #[test]
    fn formality_match_scale() {
        assert_eq!(formality_match(Some(8.0), Some(8.0)), 10.0);
        assert_eq!(formality_match(Some(9.5), Some(8.0)), 7.0);
        assert_eq!(formality_match(None, Some(8.0)), 5.0);
        // Huge gap floors at zero
        assert_eq!(formality_match(Some(20.0), Some(2.0)), 0.0);
    }

    #[test]
    fn total_score_clamped_under_extreme_penalties() {
        let r = rules();
        let text = "Leverage synergy paradigm disruptive innovative game-changer ROI \
                    https://a.io https://b.io https://c.io";
        let metrics = extract_metrics(text);
        let score = score_post(&r, text, &metrics, &CommunityAverages::default());
        assert!(score.total_score >= 0.0 && score.total_score <= 10.0);
        assert_eq!(score.total_score, 0.0);
    }

    #[test]
    fn more_jargon_never_raises_score() {
        let r = rules();
        let community = CommunityAverages::default();
        let base = "I have been thinking about this problem for a while now.";
        let mut previous = f64::INFINITY;
        // Additions are pronoun-free so the vulnerability factor stays fixed
        for jargon in [
            "",
            " Teams should leverage it.",
            " Teams should leverage it with synergy.",
            " Teams should leverage it with synergy and disrupt things.",
        ] {
            let text = format!("{base}{jargon}");
            let metrics = extract_metrics(&text);
            let score = score_post(&r, &text, &metrics, &community);
            assert!(
                score.total_score <= previous,
                "jargon increased the score: {} > {previous}",
                score.total_score
            );
            previous = score.total_score;
        }
    }

    #[test]
    fn penalty_phrases_cover_both_factor_families() {
        let r = rules();
        let text = "You can leverage my approach, details at https://example.com/tool";
        let metrics = extract_metrics(text);
        let score = score_post(&r, text, &metrics, &CommunityAverages::default());
        assert!(score
            .penalty_phrases
            .iter()
            .any(|p| p.category == PatternCategory::Promotional));
        assert!(score
            .penalty_phrases
            .iter()
            .any(|p| p.category == PatternCategory::LinkPatterns));
    }
}
