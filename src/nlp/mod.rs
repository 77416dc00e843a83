// Linguistic feature extraction — per-post numeric fingerprints.
//
// Turns raw post text into a fixed set of metrics: formality (dual
// readability estimators, averaged), tone (lexicon sentiment), sentence
// rhythm (average length + standard deviation in tokens), and vocabulary
// complexity (type-token ratio over stemmed alphabetic tokens).
//
// Everything is a pure function of the input text. Degenerate input never
// fails — it yields neutral defaults and processing continues.

pub mod readability;
pub mod sentiment;
pub mod text;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use text::{alphabetic_tokens, split_sentences, stem, tokenize};

/// Sentiment classification with fixed thresholds (±0.05 on the compound
/// score). Not tunable — stability keeps historical comparisons valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Positive,
    Negative,
    Neutral,
}

impl Tone {
    pub fn from_compound(compound: f64) -> Self {
        if compound >= 0.05 {
            Tone::Positive
        } else if compound <= -0.05 {
            Tone::Negative
        } else {
            Tone::Neutral
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Positive => "positive",
            Tone::Negative => "negative",
            Tone::Neutral => "neutral",
        }
    }
}

impl std::fmt::Display for Tone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-post linguistic metrics. Computed once per post, immutable,
/// recomputed only on a full re-analysis.
///
/// Optional fields are None when the text was too short or degenerate to
/// measure — downstream scorers treat None as "neutral", never as an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostMetrics {
    /// Mean of Flesch-Kincaid grade and Gunning FOG index.
    pub formality: Option<f64>,
    pub tone: Tone,
    /// Raw sentiment compound score in [-1, 1].
    pub tone_compound: f64,
    /// Mean tokens per sentence.
    pub avg_sentence_length: Option<f64>,
    /// Sample standard deviation of sentence lengths (0.0 for one sentence).
    pub sentence_length_std: Option<f64>,
    /// Unique stemmed alphabetic tokens / total alphabetic tokens.
    pub vocabulary_complexity: Option<f64>,
    pub sentence_count: usize,
}

impl PostMetrics {
    /// Neutral defaults for empty or near-empty text.
    pub fn neutral() -> Self {
        Self {
            formality: None,
            tone: Tone::Neutral,
            tone_compound: 0.0,
            avg_sentence_length: None,
            sentence_length_std: None,
            vocabulary_complexity: None,
            sentence_count: 0,
        }
    }
}

/// Explicitly scoped NLP context.
///
/// All the extraction functions are stateless, but batch callers go through
/// a context object so toolkit state (if any accrues in a future backend)
/// is owned per analysis run rather than living in a process-wide
/// singleton. The orchestrator can `reset()` it on a schedule.
#[derive(Debug, Default)]
pub struct NlpContext {
    texts_processed: usize,
}

impl NlpContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop any accumulated state and return the context to its freshly
    /// initialized form.
    pub fn reset(&mut self) {
        debug!(
            texts_processed = self.texts_processed,
            "Resetting NLP context"
        );
        self.texts_processed = 0;
    }

    /// Number of texts this context has analyzed since creation/reset.
    pub fn texts_processed(&self) -> usize {
        self.texts_processed
    }

    /// Extract metrics for a single post text.
    pub fn analyze(&mut self, text: &str) -> PostMetrics {
        self.texts_processed += 1;
        extract_metrics(text)
    }

    /// Extract metrics for a batch of texts. Output order matches input
    /// order; batching is a throughput convenience, not a semantic one.
    pub fn analyze_batch(&mut self, texts: &[String]) -> Vec<PostMetrics> {
        texts.iter().map(|t| self.analyze(t)).collect()
    }
}

/// The pure extraction function behind `NlpContext::analyze`.
pub fn extract_metrics(text: &str) -> PostMetrics {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return PostMetrics::neutral();
    }

    let sentences = split_sentences(trimmed);
    let sentence_count = sentences.len();

    let compound = sentiment::compound_score(trimmed);
    let tone = Tone::from_compound(compound);
    let formality = readability::formality_score(trimmed);

    let (avg_sentence_length, sentence_length_std) = if sentences.is_empty() {
        (None, None)
    } else {
        let lengths: Vec<f64> = sentences.iter().map(|s| tokenize(s).len() as f64).collect();
        let mean = lengths.iter().sum::<f64>() / lengths.len() as f64;
        let std = if lengths.len() > 1 {
            let var = lengths.iter().map(|l| (l - mean).powi(2)).sum::<f64>()
                / (lengths.len() - 1) as f64;
            var.sqrt()
        } else {
            0.0
        };
        (Some(mean), Some(std))
    };

    let alpha = alphabetic_tokens(trimmed);
    let vocabulary_complexity = if alpha.is_empty() {
        None
    } else {
        let unique: HashSet<String> = alpha.iter().map(|t| stem(t)).collect();
        Some(unique.len() as f64 / alpha.len() as f64)
    };

    PostMetrics {
        formality,
        tone,
        tone_compound: compound,
        avg_sentence_length,
        sentence_length_std,
        vocabulary_complexity,
        sentence_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_is_neutral() {
        assert_eq!(extract_metrics(""), PostMetrics::neutral());
        assert_eq!(extract_metrics("   \n  "), PostMetrics::neutral());
    }

    #[test]
    fn short_text_never_errors() {
        let m = extract_metrics("ok");
        assert!(m.formality.is_none());
        assert_eq!(m.sentence_count, 1);
        assert_eq!(m.avg_sentence_length, Some(1.0));
    }

    #[test]
    fn single_sentence_has_zero_std() {
        let m = extract_metrics("Five words are in here today.");
        assert_eq!(m.sentence_count, 1);
        assert_eq!(m.sentence_length_std, Some(0.0));
    }

    #[test]
    fn vocabulary_complexity_ratio() {
        // "the cat saw the cat" -> stems {the, cat, saw} over 5 tokens
        let m = extract_metrics("the cat saw the cat");
        let vc = m.vocabulary_complexity.unwrap();
        assert!((vc - 0.6).abs() < 1e-9, "expected 0.6, got {vc}");
    }

    #[test]
    fn tone_thresholds() {
        assert_eq!(Tone::from_compound(0.05), Tone::Positive);
        assert_eq!(Tone::from_compound(-0.05), Tone::Negative);
        assert_eq!(Tone::from_compound(0.0499), Tone::Neutral);
        assert_eq!(Tone::from_compound(-0.0499), Tone::Neutral);
    }

    #[test]
    fn extraction_is_deterministic() {
        let text = "I struggled for weeks. Then it clicked! Has anyone else hit this wall?";
        assert_eq!(extract_metrics(text), extract_metrics(text));
    }

    #[test]
    fn context_counts_and_resets() {
        let mut ctx = NlpContext::new();
        ctx.analyze_batch(&["one".into(), "two".into()]);
        assert_eq!(ctx.texts_processed(), 2);
        ctx.reset();
        assert_eq!(ctx.texts_processed(), 0);
    }
}
