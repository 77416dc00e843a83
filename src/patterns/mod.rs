// Forbidden pattern detection and categorization.
//
// Scans post text against six fixed rule categories and reports matches.
// Detection is categorical: severity only exists after aggregating across
// a community's corpus (a pattern on 25% of posts is high severity; on 5%
// it is low). The single-post check is idempotent and side-effect-free so
// it can run at generation-review time without touching stored aggregates.
//
// The compiled RuleSet is immutable after `compile()` and safe for
// unsynchronized concurrent reads from any number of scoring workers.

mod rules;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::EngineError;
use rules::Rule;

/// The closed set of forbidden-pattern categories.
///
/// A fixed enum rather than an open category->count map: "unknown category"
/// is a compile error here, not a runtime surprise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PatternCategory {
    Promotional,
    SelfReferential,
    LinkPatterns,
    LowEffort,
    SpamIndicators,
    OffTopic,
}

impl PatternCategory {
    pub const ALL: [PatternCategory; 6] = [
        PatternCategory::Promotional,
        PatternCategory::SelfReferential,
        PatternCategory::LinkPatterns,
        PatternCategory::LowEffort,
        PatternCategory::SpamIndicators,
        PatternCategory::OffTopic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PatternCategory::Promotional => "Promotional",
            PatternCategory::SelfReferential => "Self-referential",
            PatternCategory::LinkPatterns => "Link patterns",
            PatternCategory::LowEffort => "Low-effort",
            PatternCategory::SpamIndicators => "Spam indicators",
            PatternCategory::OffTopic => "Off-topic",
        }
    }

    /// Baseline severity for single-post highlighting, where no corpus
    /// prevalence exists yet.
    pub fn base_severity(&self) -> Severity {
        match self {
            PatternCategory::Promotional | PatternCategory::SpamIndicators => Severity::High,
            PatternCategory::SelfReferential | PatternCategory::LinkPatterns => Severity::Medium,
            PatternCategory::LowEffort | PatternCategory::OffTopic => Severity::Low,
        }
    }
}

impl std::fmt::Display for PatternCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    /// Derive severity from how many of a community's posts matched.
    /// More than 20% is high, 10-20% medium, below that low.
    pub fn from_prevalence(matched_posts: usize, total_posts: usize) -> Self {
        if total_posts == 0 {
            return Severity::Low;
        }
        let pct = matched_posts as f64 / total_posts as f64 * 100.0;
        if pct > 20.0 {
            Severity::High
        } else if pct >= 10.0 {
            Severity::Medium
        } else {
            Severity::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A flagged substring in one post, for inline highlighting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PenaltyPhrase {
    pub phrase: String,
    pub category: PatternCategory,
    pub severity: Severity,
}

/// One rule's aggregate footprint across a community corpus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectedPattern {
    pub category: PatternCategory,
    pub description: String,
    /// Number of posts (not occurrences) that matched this rule.
    pub match_count: usize,
    pub severity: Severity,
}

/// Distinct posts matched per category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryCount {
    pub category: PatternCategory,
    pub posts_matched: usize,
}

/// Category-tagged pattern aggregate for one community corpus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternSummary {
    /// One entry per category, in `PatternCategory::ALL` order.
    pub categories: Vec<CategoryCount>,
    /// Per-rule details, sorted by match_count descending.
    pub detected: Vec<DetectedPattern>,
    pub total_posts: usize,
}

impl PatternSummary {
    pub fn empty() -> Self {
        Self {
            categories: PatternCategory::ALL
                .iter()
                .map(|&category| CategoryCount {
                    category,
                    posts_matched: 0,
                })
                .collect(),
            detected: Vec::new(),
            total_posts: 0,
        }
    }

    pub fn posts_matched(&self, category: PatternCategory) -> usize {
        self.categories
            .iter()
            .find(|c| c.category == category)
            .map(|c| c.posts_matched)
            .unwrap_or(0)
    }
}

/// The compiled forbidden-pattern rule set.
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    /// Compile the full rule tables. Called once at process start; a
    /// malformed rule fails here, not on first use.
    pub fn compile() -> Result<Self, EngineError> {
        let rules = rules::compile_rules()?;
        debug!(rules = rules.len(), "Compiled forbidden-pattern rule set");
        Ok(Self { rules })
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Scan a community corpus and aggregate category counts and per-rule
    /// severities from prevalence.
    pub fn extract(&self, texts: &[String]) -> PatternSummary {
        if texts.is_empty() {
            return PatternSummary::empty();
        }

        let total_posts = texts.len();
        let mut detected = Vec::new();
        let mut categories = Vec::with_capacity(PatternCategory::ALL.len());

        for &category in &PatternCategory::ALL {
            let mut matched_posts = vec![false; total_posts];

            for rule in self.rules.iter().filter(|r| r.category == category) {
                let mut match_count = 0;
                for (i, text) in texts.iter().enumerate() {
                    if rule.is_match(text) {
                        match_count += 1;
                        matched_posts[i] = true;
                    }
                }
                if match_count > 0 {
                    detected.push(DetectedPattern {
                        category,
                        description: rule.description.to_string(),
                        match_count,
                        severity: Severity::from_prevalence(match_count, total_posts),
                    });
                }
            }

            categories.push(CategoryCount {
                category,
                posts_matched: matched_posts.iter().filter(|&&m| m).count(),
            });
        }

        detected.sort_by(|a, b| b.match_count.cmp(&a.match_count));

        PatternSummary {
            categories,
            detected,
            total_posts,
        }
    }

    /// Check a single post and return the matched substrings for inline
    /// highlighting. Duplicates (case-insensitive) are collapsed; severity
    /// comes from the category baseline since there is no corpus here.
    pub fn check_text(&self, text: &str) -> Vec<PenaltyPhrase> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        let mut seen = std::collections::HashSet::new();
        let mut phrases = Vec::new();

        for rule in &self.rules {
            for phrase in rule.matched_phrases(text) {
                if seen.insert(phrase.to_lowercase()) {
                    phrases.push(PenaltyPhrase {
                        phrase,
                        category: rule.category,
                        severity: rule.category.base_severity(),
                    });
                }
            }
        }

        phrases
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ruleset() -> RuleSet {
        RuleSet::compile().expect("rules compile")
    }

    #[test]
    fn check_text_finds_promotional_phrase() {
        let rs = ruleset();
        let phrases = rs.check_text("You should check out my new discount code for the launch");
        assert!(phrases
            .iter()
            .any(|p| p.category == PatternCategory::Promotional && p.severity == Severity::High));
    }

    #[test]
    fn check_text_dedupes_case_insensitively() {
        let rs = ruleset();
        let text = "Use this coupon today. Seriously, that COUPON is the best coupon around, \
                    and this sentence pads the text past the short-post limit.";
        let coupons: Vec<_> = phrases_for(&rs, text, "coupon");
        assert_eq!(coupons.len(), 1);
    }

    fn phrases_for(rs: &RuleSet, text: &str, needle: &str) -> Vec<PenaltyPhrase> {
        rs.check_text(text)
            .into_iter()
            .filter(|p| p.phrase.to_lowercase() == needle)
            .collect()
    }

    #[test]
    fn check_text_is_idempotent() {
        let rs = ruleset();
        let text = "I built my startup around this. Check out my page!!! https://a.io https://b.io";
        assert_eq!(rs.check_text(text), rs.check_text(text));
    }

    #[test]
    fn empty_text_has_no_phrases() {
        assert!(ruleset().check_text("   ").is_empty());
    }

    #[test]
    fn extract_counts_posts_not_occurrences() {
        let rs = ruleset();
        let texts = vec![
            "Grab this coupon and that other coupon before the window closes on it.".to_string(),
            "A perfectly ordinary post about gardening habits and watering schedules.".to_string(),
        ];
        let summary = rs.extract(&texts);
        let coupon_rule = summary
            .detected
            .iter()
            .find(|d| d.description == "coupon")
            .expect("coupon rule should fire");
        assert_eq!(coupon_rule.match_count, 1);
        assert_eq!(summary.posts_matched(PatternCategory::Promotional), 1);
    }

    #[test]
    fn extract_severity_tracks_prevalence() {
        let rs = ruleset();
        // 3 of 10 posts carry a coupon: 30% -> high severity
        let mut texts: Vec<String> = (0..7)
            .map(|i| format!("Ordinary post number {i} with nothing remarkable inside it at all."))
            .collect();
        for _ in 0..3 {
            texts.push("This coupon is the thing everybody keeps asking questions about.".into());
        }
        let summary = rs.extract(&texts);
        let coupon_rule = summary
            .detected
            .iter()
            .find(|d| d.description == "coupon")
            .unwrap();
        assert_eq!(coupon_rule.severity, Severity::High);
    }

    #[test]
    fn severity_prevalence_boundaries() {
        assert_eq!(Severity::from_prevalence(21, 100), Severity::High);
        assert_eq!(Severity::from_prevalence(20, 100), Severity::Medium);
        assert_eq!(Severity::from_prevalence(10, 100), Severity::Medium);
        assert_eq!(Severity::from_prevalence(9, 100), Severity::Low);
    }

    #[test]
    fn empty_corpus_yields_empty_summary() {
        let summary = ruleset().extract(&[]);
        assert_eq!(summary.total_posts, 0);
        assert!(summary.detected.is_empty());
        assert_eq!(summary.categories.len(), 6);
    }
}
