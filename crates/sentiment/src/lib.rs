//! Sentiment scoring for review text.
//!
//! This crate provides:
//! - The `SentimentScorer` trait: `score(text) -> Sentiment`, a pure function
//!   of the text with no side effects
//! - `LexiconScorer`, a deterministic word-lexicon implementation
//!
//! ## Scoring model
//! Each opinion word carries a (polarity, subjectivity) pair. Words before it
//! can modify it:
//! - intensifiers ("very", "really", ...) multiply both values
//! - a negation ("not", "never", "didn't", ...) flips polarity and halves it
//!
//! The text's polarity and subjectivity are the means over all opinion words
//! found, clamped to [-1, 1] and [0, 1]. Text without opinion words scores
//! (0.0, 0.0).

use serde::Serialize;
use std::collections::HashMap;
use tracing::trace;

/// Polarity/subjectivity pair for one piece of text
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Sentiment {
    /// Emotional valence in [-1.0, 1.0]
    pub polarity: f64,
    /// Opinion vs. fact content in [0.0, 1.0]
    pub subjectivity: f64,
}

/// Anything that can turn review text into a `Sentiment`.
///
/// `Send + Sync` so one scorer can be shared behind an `Arc` by concurrent
/// engine calls.
pub trait SentimentScorer: Send + Sync {
    fn score(&self, text: &str) -> Sentiment;
}

/// Opinion words: (word, polarity, subjectivity)
const OPINION_WORDS: &[(&str, f64, f64)] = &[
    ("amazing", 0.6, 0.9),
    ("awesome", 1.0, 1.0),
    ("best", 1.0, 0.3),
    ("delicious", 1.0, 1.0),
    ("easy", 0.43, 0.83),
    ("enjoy", 0.4, 0.5),
    ("enjoyed", 0.4, 0.5),
    ("excellent", 1.0, 1.0),
    ("fantastic", 0.4, 0.9),
    ("favorite", 0.5, 1.0),
    ("fine", 0.42, 0.5),
    ("flavorful", 0.6, 0.8),
    ("fresh", 0.3, 0.5),
    ("good", 0.7, 0.6),
    ("great", 0.8, 0.75),
    ("happy", 0.8, 1.0),
    ("love", 0.5, 0.6),
    ("loved", 0.7, 0.8),
    ("moist", 0.2, 0.4),
    ("nice", 0.6, 1.0),
    ("ok", 0.5, 0.5),
    ("okay", 0.5, 0.5),
    ("perfect", 1.0, 1.0),
    ("quick", 0.33, 0.5),
    ("tasty", 0.5, 0.7),
    ("tender", 0.3, 0.5),
    ("wonderful", 1.0, 1.0),
    ("yummy", 0.8, 0.9),
    ("awful", -1.0, 1.0),
    ("bad", -0.7, 0.67),
    ("bitter", -0.1, 0.55),
    ("bland", -0.5, 0.7),
    ("boring", -1.0, 1.0),
    ("burnt", -0.4, 0.5),
    ("disappointed", -0.75, 0.75),
    ("disappointing", -0.6, 0.7),
    ("disgusting", -1.0, 1.0),
    ("dry", -0.2, 0.4),
    ("greasy", -0.4, 0.6),
    ("gross", -0.8, 0.9),
    ("hard", -0.29, 0.54),
    ("horrible", -1.0, 1.0),
    ("mushy", -0.4, 0.6),
    ("overcooked", -0.4, 0.6),
    ("poor", -0.4, 0.6),
    ("salty", -0.3, 0.6),
    ("soggy", -0.5, 0.6),
    ("terrible", -1.0, 1.0),
    ("worst", -1.0, 1.0),
    ("wrong", -0.5, 0.9),
];

/// Intensifiers and their multipliers
const INTENSIFIERS: &[(&str, f64)] = &[
    ("extremely", 1.5),
    ("incredibly", 1.4),
    ("quite", 1.1),
    ("really", 1.3),
    ("so", 1.3),
    ("super", 1.3),
    ("too", 1.2),
    ("very", 1.3),
];

const NEGATIONS: &[&str] = &["never", "no", "not", "nothing", "nor", "hardly"];

/// Filler words that don't break a modifier's reach ("not at all good")
const FILLERS: &[&str] = &["a", "all", "as", "at", "be", "been", "that", "the", "this"];

/// Polarity multiplier applied by a negation
const NEGATION_FACTOR: f64 = -0.5;

/// Lexicon-based sentiment scorer
#[derive(Debug, Clone)]
pub struct LexiconScorer {
    lexicon: HashMap<String, (f64, f64)>,
    intensifiers: HashMap<String, f64>,
}

impl LexiconScorer {
    /// Create a scorer with the built-in food-review lexicon
    pub fn new() -> Self {
        Self {
            lexicon: OPINION_WORDS
                .iter()
                .map(|&(w, p, s)| (w.to_string(), (p, s)))
                .collect(),
            intensifiers: INTENSIFIERS
                .iter()
                .map(|&(w, m)| (w.to_string(), m))
                .collect(),
        }
    }

    /// Add or override an opinion word (builder pattern)
    pub fn with_word(mut self, word: &str, polarity: f64, subjectivity: f64) -> Self {
        self.lexicon.insert(
            word.to_lowercase(),
            (polarity.clamp(-1.0, 1.0), subjectivity.clamp(0.0, 1.0)),
        );
        self
    }

    /// Number of opinion words known to this scorer
    pub fn vocabulary_size(&self) -> usize {
        self.lexicon.len()
    }
}

impl Default for LexiconScorer {
    fn default() -> Self {
        Self::new()
    }
}

fn is_negation(word: &str) -> bool {
    NEGATIONS.contains(&word) || word.ends_with("n't")
}

/// Lowercase words, keeping apostrophes so "didn't" survives
fn words(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .filter(|w| !w.is_empty())
        .map(|w| w.trim_matches('\'').to_lowercase())
        .filter(|w| !w.is_empty())
}

impl SentimentScorer for LexiconScorer {
    fn score(&self, text: &str) -> Sentiment {
        let mut scored: Vec<(f64, f64)> = Vec::new();

        // Pending modifiers for the next opinion word
        let mut intensity = 1.0;
        let mut negated = false;

        for word in words(text) {
            if let Some(&(polarity, subjectivity)) = self.lexicon.get(&word) {
                let mut p = (polarity * intensity).clamp(-1.0, 1.0);
                if negated {
                    p *= NEGATION_FACTOR;
                }
                let s = (subjectivity * intensity).clamp(0.0, 1.0);
                scored.push((p, s));
                intensity = 1.0;
                negated = false;
            } else if let Some(&multiplier) = self.intensifiers.get(&word) {
                intensity *= multiplier;
            } else if is_negation(&word) {
                negated = !negated;
            } else if !FILLERS.contains(&word.as_str()) {
                intensity = 1.0;
                negated = false;
            }
        }

        if scored.is_empty() {
            return Sentiment::default();
        }

        let n = scored.len() as f64;
        let sentiment = Sentiment {
            polarity: (scored.iter().map(|(p, _)| p).sum::<f64>() / n).clamp(-1.0, 1.0),
            subjectivity: (scored.iter().map(|(_, s)| s).sum::<f64>() / n).clamp(0.0, 1.0),
        };
        trace!(opinion_words = scored.len(), ?sentiment, "scored text");
        sentiment
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score(text: &str) -> Sentiment {
        LexiconScorer::new().score(text)
    }

    #[test]
    fn test_positive_review() {
        let s = score("This was delicious, my family loved it!");
        assert!(s.polarity > 0.5);
        assert!(s.subjectivity > 0.5);
    }

    #[test]
    fn test_negative_review() {
        let s = score("Bland and dry. Terrible.");
        assert!(s.polarity < 0.0);
    }

    #[test]
    fn test_no_opinion_words_is_neutral() {
        let s = score("I used two cups of flour instead of one.");
        assert_eq!(s, Sentiment::default());
    }

    #[test]
    fn test_negation_flips_polarity() {
        let plain = score("good");
        let negated = score("not good");
        assert!(plain.polarity > 0.0);
        assert!(negated.polarity < 0.0);
        assert!((negated.polarity - plain.polarity * NEGATION_FACTOR).abs() < 1e-9);

        assert!(score("it wasn't good").polarity < 0.0);
    }

    #[test]
    fn test_intensifier_strengthens() {
        assert!(score("very good").polarity > score("good").polarity);
    }

    #[test]
    fn test_modifier_resets_after_unrelated_word() {
        // "not" applies to "spicy", which isn't an opinion word, so "good" stays positive
        assert!(score("not spicy but good").polarity > 0.0);
    }

    #[test]
    fn test_scores_stay_in_range() {
        let s = score("extremely incredibly really super perfect");
        assert!(s.polarity <= 1.0);
        assert!(s.subjectivity <= 1.0);
        let s = score("extremely incredibly awful");
        assert!(s.polarity >= -1.0);
    }

    #[test]
    fn test_custom_word() {
        let scorer = LexiconScorer::new().with_word("scrumptious", 0.9, 0.9);
        assert!(scorer.score("scrumptious").polarity > 0.8);
        assert_eq!(scorer.vocabulary_size(), OPINION_WORDS.len() + 1);
    }
}
