// Text segmentation primitives shared by the extractor and style modules.
//
// Everything here is a pure function of the input string. No locale
// handling — the heuristics are English-only by design.

/// Split text into sentences at `.`, `!` and `?` boundaries.
///
/// Consecutive terminators ("?!", "...") end a single sentence. Whitespace-only
/// fragments are dropped, so degenerate input yields an empty Vec rather than
/// a list of empty strings.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let bytes = text.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        if matches!(bytes[i], b'.' | b'!' | b'?') {
            // Swallow runs of terminators
            let mut end = i + 1;
            while end < bytes.len() && matches!(bytes[end], b'.' | b'!' | b'?') {
                end += 1;
            }
            let sentence = text[start..end].trim();
            if !sentence.is_empty() {
                sentences.push(sentence);
            }
            start = end;
            i = end;
        } else {
            i += 1;
        }
    }

    let tail = text[start..].trim();
    if !tail.is_empty() {
        sentences.push(tail);
    }

    sentences
}

/// Split a sentence (or any text) into word tokens.
///
/// A token is a maximal run of alphanumeric characters, apostrophes and
/// hyphens. URLs survive as several tokens; that is fine for counting
/// purposes — link handling happens in the pattern detector, not here.
pub fn tokenize(text: &str) -> Vec<&str> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '\'' || c == '-'))
        .filter(|t| !t.is_empty())
        .collect()
}

/// Word tokens that are purely alphabetic (no digits, no hyphens).
/// These feed the vocabulary-complexity ratio.
pub fn alphabetic_tokens(text: &str) -> Vec<&str> {
    tokenize(text)
        .into_iter()
        .filter(|t| t.chars().all(|c| c.is_alphabetic()))
        .collect()
}

/// Reduce a lowercase word to a rough root form by stripping common
/// inflectional suffixes.
///
/// This is deliberately cruder than a dictionary lemmatizer: it only needs
/// to merge surface variants ("learned"/"learning"/"learns") well enough
/// for a type-token ratio, and it must stay deterministic with zero data
/// dependencies.
pub fn stem(word: &str) -> String {
    let w = word.to_lowercase();

    if let Some(base) = w.strip_suffix("ies") {
        if base.len() >= 2 {
            return format!("{base}y");
        }
    }
    if let Some(base) = w.strip_suffix("sses") {
        return format!("{base}ss");
    }
    for suffix in ["ing", "ed"] {
        if let Some(base) = w.strip_suffix(suffix) {
            // Keep enough of the word that we don't map "ring" -> "r"
            if base.len() >= 3 {
                // Undouble final consonant: "running" -> "run"
                let chars: Vec<char> = base.chars().collect();
                if chars.len() >= 2
                    && chars[chars.len() - 1] == chars[chars.len() - 2]
                    && !"aeiou".contains(chars[chars.len() - 1])
                {
                    return chars[..chars.len() - 1].iter().collect();
                }
                return base.to_string();
            }
        }
    }
    if let Some(base) = w.strip_suffix('s') {
        if base.len() >= 3 && !base.ends_with('s') && !base.ends_with('u') {
            return base.to_string();
        }
    }

    w
}

/// Count syllables in a word by counting vowel groups.
///
/// Standard heuristic: each maximal run of vowels is one syllable, a
/// trailing silent "e" is discounted, and every word has at least one
/// syllable. Good enough for grade-level formulas, which only consume
/// aggregate counts.
pub fn count_syllables(word: &str) -> usize {
    let w = word.to_lowercase();
    let chars: Vec<char> = w.chars().collect();
    if chars.is_empty() {
        return 0;
    }

    let is_vowel = |c: char| "aeiouy".contains(c);
    let mut syllables = 0;
    let mut prev_vowel = false;

    for &c in &chars {
        let vowel = is_vowel(c);
        if vowel && !prev_vowel {
            syllables += 1;
        }
        prev_vowel = vowel;
    }

    // Silent trailing "e" ("make", "time") — but not "the", "be"
    if syllables > 1 && chars.ends_with(&['e']) && !chars.ends_with(&['l', 'e']) {
        syllables -= 1;
    }

    syllables.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentences_basic() {
        let s = split_sentences("First one. Second one? Third!");
        assert_eq!(s, vec!["First one.", "Second one?", "Third!"]);
    }

    #[test]
    fn sentences_ellipsis_is_one_boundary() {
        let s = split_sentences("Wait... what happened");
        assert_eq!(s, vec!["Wait...", "what happened"]);
    }

    #[test]
    fn sentences_empty() {
        assert!(split_sentences("   ").is_empty());
        assert!(split_sentences("").is_empty());
    }

    #[test]
    fn tokenize_keeps_contractions() {
        assert_eq!(tokenize("I can't stop"), vec!["I", "can't", "stop"]);
    }

    #[test]
    fn stem_merges_variants() {
        assert_eq!(stem("learned"), stem("learning"));
        assert_eq!(stem("stories"), "story");
        assert_eq!(stem("running"), "run");
    }

    #[test]
    fn stem_leaves_short_words() {
        assert_eq!(stem("ring"), "ring");
        assert_eq!(stem("red"), "red");
    }

    #[test]
    fn syllables_common_words() {
        assert_eq!(count_syllables("cat"), 1);
        assert_eq!(count_syllables("table"), 2);
        assert_eq!(count_syllables("beautiful"), 3);
        assert_eq!(count_syllables("make"), 1);
    }

    #[test]
    fn syllables_never_zero_for_nonempty() {
        assert_eq!(count_syllables("hmm"), 1);
    }
}
