// Curated rule tables for the six forbidden-pattern categories, and the
// compiled RuleSet built from them at process start.
//
// Rules come in two shapes: regex rules (the common case) and structural
// checks for things regular expressions cannot express (repeated phrases
// need backreferences; wall-of-text needs lookahead). Both shapes are
// pure and side-effect-free.

use regex_lite::Regex;

use super::PatternCategory;
use crate::error::EngineError;

/// A structural check: returns the offending snippet if the text trips it.
type Check = fn(&str) -> Option<String>;

pub(super) enum Matcher {
    Pattern(Regex),
    Structural(Check),
}

pub(super) struct Rule {
    pub category: PatternCategory,
    /// Human-readable description, surfaced in the per-community summary.
    pub description: &'static str,
    pub matcher: Matcher,
}

impl Rule {
    /// Whether the text matches this rule at all.
    pub fn is_match(&self, text: &str) -> bool {
        match &self.matcher {
            Matcher::Pattern(re) => re.is_match(text),
            Matcher::Structural(check) => check(text).is_some(),
        }
    }

    /// All distinct matched substrings, for inline highlighting.
    pub fn matched_phrases(&self, text: &str) -> Vec<String> {
        match &self.matcher {
            Matcher::Pattern(re) => re.find_iter(text).map(|m| m.as_str().to_string()).collect(),
            Matcher::Structural(check) => check(text).into_iter().collect(),
        }
    }
}

/// Regex sources per category. Compiled once by `compile_rules`; a
/// malformed entry here is a startup failure, never a first-use surprise.
const REGEX_RULES: &[(PatternCategory, &str, &str)] = &[
    // Promotional — discount/affiliate language
    (PatternCategory::Promotional, "affiliate link", r"(?i)\baffiliate\s+link\b"),
    (PatternCategory::Promotional, "discount code", r"(?i)\bdiscount\s+code\b"),
    (PatternCategory::Promotional, "coupon", r"(?i)\bcoupon\b"),
    (PatternCategory::Promotional, "promo code", r"(?i)\bpromo\s+code\b"),
    (PatternCategory::Promotional, "check out my ...", r"(?i)\bcheck\s+out\s+my\b"),
    (PatternCategory::Promotional, "I made a ...", r"(?i)\bI\s+made\s+a\b"),
    (PatternCategory::Promotional, "special offer", r"(?i)\bspecial\s+offer\b"),
    (PatternCategory::Promotional, "limited time", r"(?i)\blimited\s+time\b"),
    (PatternCategory::Promotional, "free trial", r"(?i)\bfree\s+trial\b"),
    (PatternCategory::Promotional, "sign up now/today", r"(?i)\bsign\s+up\s+(now|today)\b"),
    // Self-referential — first-person product mentions
    (PatternCategory::SelfReferential, "my product", r"(?i)\bmy\s+product\b"),
    (PatternCategory::SelfReferential, "my tool", r"(?i)\bmy\s+tool\b"),
    (PatternCategory::SelfReferential, "I built ...", r"(?i)\bI\s+built\b"),
    (PatternCategory::SelfReferential, "my startup", r"(?i)\bmy\s+startup\b"),
    (PatternCategory::SelfReferential, "my company", r"(?i)\bmy\s+company\b"),
    (PatternCategory::SelfReferential, "my app", r"(?i)\bmy\s+app\b"),
    (PatternCategory::SelfReferential, "my service", r"(?i)\bmy\s+service\b"),
    (PatternCategory::SelfReferential, "our platform", r"(?i)\bour\s+platform\b"),
    (PatternCategory::SelfReferential, "my business", r"(?i)\bmy\s+business\b"),
    // Link patterns — shorteners, tracking parameters, link stacking
    (PatternCategory::LinkPatterns, "bit.ly shortener", r"(?i)bit\.ly/"),
    (PatternCategory::LinkPatterns, "tinyurl shortener", r"(?i)tinyurl\.com/"),
    (PatternCategory::LinkPatterns, "goo.gl shortener", r"(?i)goo\.gl/"),
    (PatternCategory::LinkPatterns, "UTM tracking parameter", r"(?i)\?utm_"),
    (PatternCategory::LinkPatterns, "referral parameter", r"(?i)\?ref="),
    (PatternCategory::LinkPatterns, "amazon affiliate link", r"(?i)amazon\.com/\S*/ref="),
    (PatternCategory::LinkPatterns, "multiple URLs", r"(?i)https?://\S+\s+https?://\S+"),
    // Low-effort — generic openers and throwaway closers
    (PatternCategory::LowEffort, "bare 'thoughts?' closer", r"(?i)\bthoughts\?\s*$"),
    (PatternCategory::LowEffort, "bare 'any feedback?' closer", r"(?i)\bany\s+feedback\?\s*$"),
    (
        PatternCategory::LowEffort,
        "bare 'what do you think?' closer",
        r"(?i)\bwhat\s+do\s+you\s+think\?\s*$",
    ),
    (PatternCategory::LowEffort, "generic 'here is/this is' opener", r"(?i)^(here|this|it)\s+(is|are)\s+"),
    // Spam indicators — formatting abuse
    (PatternCategory::SpamIndicators, "excessive exclamation", r"!{3,}"),
    (PatternCategory::SpamIndicators, "all-caps run", r"[A-Z\s]{20,}"),
    // Off-topic — clickbait framing
    (PatternCategory::OffTopic, "click here / clickbait", r"(?i)\b(click\s+here|clickbait)\b"),
    (PatternCategory::OffTopic, "you won't believe ...", r"(?i)\byou\s+won't\s+believe\b"),
    (PatternCategory::OffTopic, "shocking", r"(?i)\bshocking\b"),
];

/// Posts shorter than this (trimmed) count as low-effort.
const SHORT_POST_LIMIT: usize = 50;

/// A single line this long with no paragraph break reads as a wall of text.
const WALL_OF_TEXT_CHARS: usize = 500;

/// How many consecutive emoji make an emoji run.
const EMOJI_RUN_LEN: usize = 5;

/// N-gram size and repetition count for repeated-phrase detection.
const REPEAT_NGRAM: usize = 3;
const REPEAT_COUNT: usize = 3;

fn short_post(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if !trimmed.is_empty() && trimmed.len() < SHORT_POST_LIMIT {
        Some(trimmed.to_string())
    } else {
        None
    }
}

fn wall_of_text(text: &str) -> Option<String> {
    text.lines()
        .find(|line| line.trim().len() >= WALL_OF_TEXT_CHARS)
        .map(|line| {
            let snippet: String = line.chars().take(80).collect();
            format!("{snippet}...")
        })
}

fn emoji_run(text: &str) -> Option<String> {
    let is_emoji = |c: char| matches!(c as u32, 0x1F300..=0x1F9FF | 0x2600..=0x27BF);
    let mut run = String::new();
    for c in text.chars() {
        if is_emoji(c) {
            run.push(c);
            if run.chars().count() >= EMOJI_RUN_LEN {
                return Some(run);
            }
        } else if !c.is_whitespace() {
            run.clear();
        }
    }
    None
}

/// Detect a token trigram appearing three or more times. Backreference-free
/// replacement for the classic `(.{10,})\1{2,}` repeated-phrase rule.
fn repeated_phrase(text: &str) -> Option<String> {
    use std::collections::HashMap;

    let tokens: Vec<String> = crate::nlp::text::tokenize(text)
        .iter()
        .map(|t| t.to_lowercase())
        .collect();
    if tokens.len() < REPEAT_NGRAM * REPEAT_COUNT {
        return None;
    }

    let mut counts: HashMap<&[String], usize> = HashMap::new();
    for window in tokens.windows(REPEAT_NGRAM) {
        let count = counts.entry(window).or_insert(0);
        *count += 1;
        if *count >= REPEAT_COUNT {
            return Some(window.join(" "));
        }
    }
    None
}

const STRUCTURAL_RULES: &[(PatternCategory, &str, Check)] = &[
    (PatternCategory::LowEffort, "very short post", short_post),
    (PatternCategory::SpamIndicators, "repeated phrase", repeated_phrase),
    (PatternCategory::SpamIndicators, "wall of text", wall_of_text),
    (PatternCategory::SpamIndicators, "emoji run", emoji_run),
];

/// Compile every rule table entry. Any compilation failure is fatal —
/// the detector's correctness depends on the complete rule set.
pub(super) fn compile_rules() -> Result<Vec<Rule>, EngineError> {
    let mut rules = Vec::with_capacity(REGEX_RULES.len() + STRUCTURAL_RULES.len());

    for &(category, description, source) in REGEX_RULES {
        let re = Regex::new(source).map_err(|e| EngineError::PatternCompilation {
            category: category.as_str(),
            rule: source,
            source: e,
        })?;
        rules.push(Rule {
            category,
            description,
            matcher: Matcher::Pattern(re),
        });
    }

    for &(category, description, check) in STRUCTURAL_RULES {
        rules.push(Rule {
            category,
            description,
            matcher: Matcher::Structural(check),
        });
    }

    Ok(rules)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_rules_compile() {
        let rules = compile_rules().expect("rule tables must compile");
        assert_eq!(rules.len(), REGEX_RULES.len() + STRUCTURAL_RULES.len());
    }

    #[test]
    fn short_post_check() {
        assert!(short_post("nice").is_some());
        assert!(short_post(&"x".repeat(60)).is_none());
        assert!(short_post("   ").is_none());
    }

    #[test]
    fn repeated_phrase_check() {
        let text = "buy it now buy it now buy it now";
        assert_eq!(repeated_phrase(text), Some("buy it now".to_string()));
        assert!(repeated_phrase("no repetition to see here at all today").is_none());
    }

    #[test]
    fn emoji_run_check() {
        assert!(emoji_run("look \u{1F600}\u{1F600}\u{1F600}\u{1F600}\u{1F600}").is_some());
        assert!(emoji_run("one \u{1F600} is fine").is_none());
    }

    #[test]
    fn wall_of_text_check() {
        let wall = "a".repeat(600);
        assert!(wall_of_text(&wall).is_some());
        let broken = format!("{}\n\n{}", "a".repeat(300), "b".repeat(300));
        assert!(wall_of_text(&broken).is_none());
    }
}
