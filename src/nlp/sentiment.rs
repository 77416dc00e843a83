// Lexicon/rule-based sentiment scoring.
//
// Produces a compound score in [-1, 1] from a fixed valence lexicon with
// negation and intensity handling. The classification thresholds live in
// the extractor (±0.05) and are intentionally not tunable — stable
// thresholds keep historical tone comparisons comparable across runs.
//
// The lexicon is embedded in the binary: no model files, no randomness,
// same text in, same score out.

use crate::nlp::text::tokenize;

/// Word valences on a roughly -4..4 scale, VADER-style. Sorted for binary
/// search. Curated for the registers this engine sees: community posts
/// about products, problems, and feedback.
const LEXICON: &[(&str, f64)] = &[
    ("amazing", 2.8),
    ("angry", -2.3),
    ("annoying", -1.8),
    ("appreciate", 1.9),
    ("awesome", 3.1),
    ("awful", -2.5),
    ("bad", -2.5),
    ("beautiful", 2.2),
    ("best", 3.2),
    ("better", 1.9),
    ("brilliant", 2.8),
    ("broken", -1.9),
    ("bug", -1.3),
    ("concerned", -1.0),
    ("confused", -1.3),
    ("crash", -1.6),
    ("delighted", 2.6),
    ("disappointed", -2.1),
    ("disappointing", -2.2),
    ("easy", 1.5),
    ("excellent", 2.7),
    ("excited", 2.2),
    ("fail", -2.3),
    ("failed", -2.3),
    ("failure", -2.4),
    ("fantastic", 2.6),
    ("frustrated", -2.1),
    ("frustrating", -2.2),
    ("fun", 2.3),
    ("glad", 2.0),
    ("good", 1.9),
    ("grateful", 2.3),
    ("great", 3.1),
    ("happy", 2.7),
    ("hate", -2.7),
    ("help", 1.7),
    ("helpful", 2.1),
    ("hope", 1.9),
    ("horrible", -2.5),
    ("hurt", -2.1),
    ("impossible", -1.7),
    ("impressive", 2.3),
    ("interesting", 1.7),
    ("lost", -1.3),
    ("love", 3.2),
    ("loved", 2.9),
    ("mess", -1.6),
    ("miserable", -2.6),
    ("mistake", -1.6),
    ("nice", 1.8),
    ("pain", -2.0),
    ("painful", -2.1),
    ("perfect", 2.7),
    ("pleased", 2.1),
    ("poor", -1.9),
    ("problem", -1.4),
    ("problems", -1.4),
    ("proud", 2.2),
    ("recommend", 1.6),
    ("sad", -2.1),
    ("scared", -1.9),
    ("solved", 1.8),
    ("struggle", -1.8),
    ("struggled", -1.8),
    ("struggling", -1.9),
    ("stuck", -1.4),
    ("succeeded", 2.1),
    ("success", 2.4),
    ("terrible", -2.6),
    ("thank", 1.9),
    ("thanks", 1.9),
    ("ugly", -2.0),
    ("unfortunately", -1.2),
    ("useful", 1.9),
    ("useless", -1.9),
    ("valuable", 2.1),
    ("waste", -1.9),
    ("win", 2.8),
    ("wonderful", 2.7),
    ("works", 1.4),
    ("worried", -1.7),
    ("worse", -2.1),
    ("worst", -3.1),
    ("worth", 0.9),
    ("wrong", -1.6),
];

/// Words that flip the valence of the next sentiment-bearing word.
const NEGATORS: &[&str] = &[
    "not", "no", "never", "neither", "nobody", "nothing", "cannot", "can't", "won't", "don't",
    "doesn't", "didn't", "isn't", "wasn't", "aren't", "couldn't", "wouldn't", "shouldn't",
];

/// Intensity boosters and dampeners applied to the following word.
const BOOSTERS: &[(&str, f64)] = &[
    ("absolutely", 0.3),
    ("completely", 0.3),
    ("extremely", 0.3),
    ("incredibly", 0.3),
    ("really", 0.25),
    ("so", 0.2),
    ("totally", 0.25),
    ("very", 0.25),
    ("barely", -0.3),
    ("hardly", -0.3),
    ("slightly", -0.25),
    ("somewhat", -0.2),
];

fn valence(word: &str) -> Option<f64> {
    LEXICON
        .binary_search_by(|(w, _)| w.cmp(&word))
        .ok()
        .map(|i| LEXICON[i].1)
}

/// Compute the sentiment compound score for a text.
///
/// Per-word valences are adjusted for negation (within the three preceding
/// tokens) and intensity boosters, summed, then squashed into [-1, 1] with
/// the usual alpha-normalization `sum / sqrt(sum^2 + 15)`.
pub fn compound_score(text: &str) -> f64 {
    let tokens: Vec<String> = tokenize(text).iter().map(|t| t.to_lowercase()).collect();
    if tokens.is_empty() {
        return 0.0;
    }

    let mut sum = 0.0;
    for (i, token) in tokens.iter().enumerate() {
        let Some(mut v) = valence(token) else {
            continue;
        };

        // Look back up to three tokens for negators and boosters
        let window_start = i.saturating_sub(3);
        for prior in &tokens[window_start..i] {
            if NEGATORS.contains(&prior.as_str()) {
                v = -v * 0.74;
            } else if let Some(&(_, boost)) = BOOSTERS.iter().find(|(w, _)| w == prior) {
                v += boost * v.signum();
            }
        }

        sum += v;
    }

    // Exclamation emphasis: up to three marks amplify the signal slightly
    let bangs = text.matches('!').count().min(3) as f64;
    if sum != 0.0 {
        sum += bangs * 0.292 * sum.signum();
    }

    let compound = sum / (sum * sum + 15.0).sqrt();
    compound.clamp(-1.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lexicon_is_sorted_for_binary_search() {
        for pair in LEXICON.windows(2) {
            assert!(pair[0].0 < pair[1].0, "lexicon out of order at {:?}", pair[1].0);
        }
    }

    #[test]
    fn positive_text() {
        assert!(compound_score("This is a great tool, I love it") >= 0.05);
    }

    #[test]
    fn negative_text() {
        assert!(compound_score("I struggled with this terrible broken mess") <= -0.05);
    }

    #[test]
    fn neutral_text() {
        let c = compound_score("The meeting is on Tuesday at three");
        assert!(c.abs() < 0.05, "expected neutral, got {c}");
    }

    #[test]
    fn negation_flips() {
        let plain = compound_score("this is good");
        let negated = compound_score("this is not good");
        assert!(plain > 0.0);
        assert!(negated < 0.0);
    }

    #[test]
    fn booster_amplifies() {
        assert!(compound_score("really great work") > compound_score("great work"));
    }

    #[test]
    fn empty_is_zero() {
        assert_eq!(compound_score(""), 0.0);
    }
}
