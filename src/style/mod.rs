// Community style fingerprint — structural writing habits.
//
// Complements the numeric metrics with interpretable style data: what
// vocabulary the community uses (TF-IDF over the corpus), how it
// punctuates, which formatting conventions appear (tl;dr, EDIT:, code
// blocks), and how top-performing posts open. Stored on the community
// profile and consumed by the generation layer as grounding data.

use keyword_extraction::tf_idf::{TfIdf, TfIdfParams};
use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use stop_words::{get, LANGUAGE};

use crate::error::EngineError;
use crate::nlp::text::split_sentences;

/// How many TF-IDF terms the fingerprint keeps.
const TOP_TERMS: usize = 30;

/// How many grouped opening patterns the fingerprint keeps.
const TOP_OPENINGS: usize = 10;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PunctuationHabits {
    pub exclamation_per_post: f64,
    pub question_mark_per_post: f64,
    pub ellipsis_per_post: f64,
    pub emoji_per_post: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FormattingHabits {
    pub tldr_ratio: f64,
    pub edit_ratio: f64,
    pub links_ratio: f64,
    pub code_blocks_ratio: f64,
    pub avg_line_breaks: f64,
}

/// A grouped opening pattern from top-performing posts, e.g. "I built ...".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpeningPattern {
    pub pattern: String,
    pub count: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StyleFingerprint {
    /// Distinctive vocabulary, ranked by TF-IDF score.
    pub top_terms: Vec<String>,
    pub punctuation: PunctuationHabits,
    pub formatting: FormattingHabits,
    /// Opening patterns of top posts, grouped by their first two words.
    pub opening_patterns: Vec<OpeningPattern>,
}

/// Compiled style-extraction patterns. Same startup-compilation policy as
/// the forbidden-pattern rule set.
pub struct StyleExtractor {
    tldr: Regex,
    edit: Regex,
    link: Regex,
    code: Regex,
}

impl StyleExtractor {
    pub fn compile() -> Result<Self, EngineError> {
        let compile = |rule: &'static str| {
            Regex::new(rule).map_err(|e| EngineError::PatternCompilation {
                category: "style",
                rule,
                source: e,
            })
        };

        Ok(Self {
            tldr: compile(r"(?i)tl;?dr")?,
            edit: compile(r"(?m)^(EDIT|UPDATE|ETA)\s*:")?,
            link: compile(r"https?://\S+")?,
            code: compile("```")?,
        })
    }

    /// Extract a style fingerprint from a community corpus.
    ///
    /// `texts` is the full corpus; `top_texts` the best-scoring posts,
    /// whose openings carry the most signal about what works.
    pub fn extract(&self, texts: &[String], top_texts: &[String]) -> StyleFingerprint {
        if texts.is_empty() {
            return StyleFingerprint::default();
        }

        StyleFingerprint {
            top_terms: top_terms(texts),
            punctuation: self.punctuation(texts),
            formatting: self.formatting(texts),
            opening_patterns: opening_patterns(top_texts),
        }
    }

    fn punctuation(&self, texts: &[String]) -> PunctuationHabits {
        let n = texts.len() as f64;
        let per_post = |count: usize| count as f64 / n;

        let is_emoji = |c: char| matches!(c as u32, 0x1F300..=0x1F9FF | 0x2600..=0x27BF);

        PunctuationHabits {
            exclamation_per_post: per_post(texts.iter().map(|t| t.matches('!').count()).sum()),
            question_mark_per_post: per_post(texts.iter().map(|t| t.matches('?').count()).sum()),
            ellipsis_per_post: per_post(
                texts
                    .iter()
                    .map(|t| t.matches("...").count() + t.matches('\u{2026}').count())
                    .sum(),
            ),
            emoji_per_post: per_post(
                texts
                    .iter()
                    .map(|t| t.chars().filter(|&c| is_emoji(c)).count())
                    .sum(),
            ),
        }
    }

    fn formatting(&self, texts: &[String]) -> FormattingHabits {
        let n = texts.len() as f64;
        let ratio = |count: usize| count as f64 / n;

        FormattingHabits {
            tldr_ratio: ratio(texts.iter().filter(|t| self.tldr.is_match(t)).count()),
            edit_ratio: ratio(texts.iter().filter(|t| self.edit.is_match(t)).count()),
            links_ratio: ratio(texts.iter().filter(|t| self.link.is_match(t)).count()),
            code_blocks_ratio: ratio(texts.iter().filter(|t| self.code.is_match(t)).count()),
            avg_line_breaks: texts.iter().map(|t| t.matches('\n').count()).sum::<usize>() as f64
                / n,
        }
    }
}

/// Distinctive corpus vocabulary via TF-IDF, each post a separate document
/// so community-wide filler gets downweighted.
fn top_terms(texts: &[String]) -> Vec<String> {
    let stop_words: Vec<String> = get(LANGUAGE::English);
    let params = TfIdfParams::UnprocessedDocuments(texts, &stop_words, None);
    let tfidf = TfIdf::new(params);
    tfidf
        .get_ranked_word_scores(TOP_TERMS)
        .into_iter()
        .map(|(word, _)| word)
        .collect()
}

/// Group the first few words of each top post into opening patterns.
/// "I built a parser" and "I built this thing" both become "I built ...".
fn opening_patterns(top_texts: &[String]) -> Vec<OpeningPattern> {
    use std::collections::HashMap;

    let mut grouped: HashMap<String, usize> = HashMap::new();
    for text in top_texts {
        let words: Vec<&str> = text.split_whitespace().take(4).collect();
        if words.len() < 2 {
            continue;
        }
        let prefix = format!("{} {} ...", words[0], words[1]);
        *grouped.entry(prefix).or_insert(0) += 1;
    }

    let mut patterns: Vec<OpeningPattern> = grouped
        .into_iter()
        .map(|(pattern, count)| OpeningPattern { pattern, count })
        .collect();
    patterns.sort_by(|a, b| b.count.cmp(&a.count).then(a.pattern.cmp(&b.pattern)));
    patterns.truncate(TOP_OPENINGS);
    patterns
}

/// The opening segment of a post, for the profile's representative hooks:
/// first sentence, only when longer than 10 chars, capped at 200.
pub fn success_hook(text: &str) -> Option<String> {
    let first = split_sentences(text.trim()).into_iter().next()?;
    let cleaned = first.trim_end_matches(['.', '?', '!']).trim();
    if cleaned.len() <= 10 {
        return None;
    }
    Some(cleaned.chars().take(200).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> StyleExtractor {
        StyleExtractor::compile().expect("style patterns compile")
    }

    #[test]
    fn empty_corpus_gives_default_fingerprint() {
        let fp = extractor().extract(&[], &[]);
        assert!(fp.top_terms.is_empty());
        assert!(fp.opening_patterns.is_empty());
    }

    #[test]
    fn formatting_ratios() {
        let texts = vec![
            "TL;DR: it works now.\n\nLong story below.".to_string(),
            "EDIT: fixed the numbers. See https://example.com for data".to_string(),
            "Plain post with nothing special in it at all.".to_string(),
        ];
        let f = extractor().formatting(&texts);
        assert!((f.tldr_ratio - 1.0 / 3.0).abs() < 1e-9);
        assert!((f.edit_ratio - 1.0 / 3.0).abs() < 1e-9);
        assert!((f.links_ratio - 1.0 / 3.0).abs() < 1e-9);
        assert_eq!(f.code_blocks_ratio, 0.0);
    }

    #[test]
    fn opening_patterns_group_by_two_word_prefix() {
        let texts = vec![
            "I built a parser for logs".to_string(),
            "I built this over a weekend".to_string(),
            "Has anyone tried the new API".to_string(),
        ];
        let patterns = opening_patterns(&texts);
        assert_eq!(patterns[0].pattern, "I built ...");
        assert_eq!(patterns[0].count, 2);
    }

    #[test]
    fn success_hook_rules() {
        assert_eq!(
            success_hook("I spent six months on this. Then everything changed."),
            Some("I spent six months on this".to_string())
        );
        // Too short
        assert_eq!(success_hook("Thanks all. More detail follows here."), None);
        assert_eq!(success_hook(""), None);
        // Cap at 200 chars
        let long = format!("{} end. Next sentence.", "word ".repeat(60));
        assert_eq!(success_hook(&long).unwrap().chars().count(), 200);
    }

    #[test]
    fn punctuation_per_post_averages() {
        let texts = vec!["What? Really?!".to_string(), "Calm text.".to_string()];
        let p = extractor().punctuation(&texts);
        assert_eq!(p.question_mark_per_post, 1.0);
        assert_eq!(p.exclamation_per_post, 0.5);
    }
}
