// Grade-level readability estimators.
//
// Formality is the arithmetic mean of two independent estimators —
// Flesch-Kincaid grade and the Gunning FOG index. Averaging two formulas
// smooths outlier behavior from either one alone; both are pure functions
// of sentence/word/syllable counts.

use super::text::{count_syllables, split_sentences, tokenize};

/// Texts shorter than this (after trimming) get no formality score —
/// grade-level formulas are meaningless on a handful of characters.
pub const MIN_TEXT_LEN: usize = 20;

/// Flesch-Kincaid grade level.
///
/// `0.39 * (words / sentences) + 11.8 * (syllables / words) - 15.59`
pub fn flesch_kincaid_grade(sentences: usize, words: usize, syllables: usize) -> f64 {
    0.39 * (words as f64 / sentences as f64) + 11.8 * (syllables as f64 / words as f64) - 15.59
}

/// Gunning FOG index.
///
/// `0.4 * ((words / sentences) + 100 * (complex_words / words))` where a
/// complex word has three or more syllables.
pub fn gunning_fog(sentences: usize, words: usize, complex_words: usize) -> f64 {
    0.4 * ((words as f64 / sentences as f64) + 100.0 * (complex_words as f64 / words as f64))
}

/// Mean of the two grade-level estimators, or None for texts too short or
/// degenerate to measure (no sentences, no words).
pub fn formality_score(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.len() < MIN_TEXT_LEN {
        return None;
    }

    let sentences = split_sentences(trimmed);
    if sentences.is_empty() {
        return None;
    }

    let words: Vec<&str> = sentences.iter().flat_map(|s| tokenize(s)).collect();
    if words.is_empty() {
        return None;
    }

    let syllables: usize = words.iter().map(|w| count_syllables(w)).sum();
    let complex = words.iter().filter(|w| count_syllables(w) >= 3).count();

    let fk = flesch_kincaid_grade(sentences.len(), words.len(), syllables);
    let fog = gunning_fog(sentences.len(), words.len(), complex);

    Some((fk + fog) / 2.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_has_no_score() {
        assert!(formality_score("too short").is_none());
        assert!(formality_score("").is_none());
    }

    #[test]
    fn simple_text_scores_low() {
        let simple = "I like cats. Cats are fun. We play all day. It is good.";
        let score = formality_score(simple).unwrap();
        assert!(score < 5.0, "expected low grade for simple text, got {score}");
    }

    #[test]
    fn academic_text_scores_higher() {
        let simple = "I like cats. Cats are fun. We play all day. It is good.";
        let dense = "Organizational restructuring necessitates comprehensive stakeholder \
                     communication strategies throughout implementation periods.";
        let low = formality_score(simple).unwrap();
        let high = formality_score(dense).unwrap();
        assert!(high > low, "dense text {high} should outscore simple text {low}");
    }

    #[test]
    fn deterministic() {
        let text = "This sentence exists purely so the estimators have something to chew on.";
        assert_eq!(formality_score(text), formality_score(text));
    }
}
