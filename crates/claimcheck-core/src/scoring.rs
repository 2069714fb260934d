//! Claim scoring strategies.
//!
//! The only implemented strategy is n-gram run matching with a
//! consecutive-run bonus:
//!
//! 1. Case-fold the claim and split it into `\w+` tokens.
//! 2. Scan left to right, at each position taking the longest n-gram that
//!    appears verbatim in the case-folded document. N-grams shorter than
//!    `min_match_length` are skipped unless they span the whole claim.
//! 3. Each hit is a *run*; unmatched tokens are gaps.
//! 4. `confidence = (Σr + b·Σ r(r-1)/2) / (n + b·n(n-1)/2)`, clamped to [0, 1].
//!
//! The triangular bonus makes one run of `k` tokens worth more than the same
//! `k` tokens split across several shorter runs.

use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::strictness::EffectiveParams;
use crate::types::MatchResult;

lazy_static! {
    /// Unicode word tokens; punctuation and whitespace are separators.
    static ref TOKEN_PATTERN: Regex = Regex::new(r"\w+").unwrap();
}

/// Split text into case-folded word tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    let folded = text.to_lowercase();
    TOKEN_PATTERN
        .find_iter(&folded)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// A way of scoring one claim against a document.
///
/// `document_lower` is the case-folded document text. Callers fold it once
/// per document rather than once per claim.
pub trait ScoringStrategy: Send + Sync {
    /// Identifier used in configuration.
    fn name(&self) -> &'static str;

    fn score(&self, claim: &str, document_lower: &str, params: &EffectiveParams) -> MatchResult;
}

/// Greedy longest-n-gram matching with a triangular run bonus.
#[derive(Debug, Clone, Copy, Default)]
pub struct NgramRunStrategy;

impl NgramRunStrategy {
    /// Find matched runs as `(run lengths, matched phrases)`.
    fn find_runs(tokens: &[String], document_lower: &str, min_match_length: usize) -> (Vec<usize>, Vec<String>) {
        let n = tokens.len();
        let mut runs = Vec::new();
        let mut phrases = Vec::new();
        let mut i = 0;

        while i < n {
            let hit = (1..=n - i)
                .rev()
                .filter(|&len| len >= min_match_length || len >= n)
                .map(|len| (len, tokens[i..i + len].join(" ")))
                .find(|(_, phrase)| document_lower.contains(phrase.as_str()));

            match hit {
                Some((len, phrase)) => {
                    runs.push(len);
                    phrases.push(phrase);
                    i += len;
                }
                None => i += 1,
            }
        }

        (runs, phrases)
    }
}

impl ScoringStrategy for NgramRunStrategy {
    fn name(&self) -> &'static str {
        Algorithm::NgramBonus.as_str()
    }

    fn score(&self, claim: &str, document_lower: &str, params: &EffectiveParams) -> MatchResult {
        let tokens = tokenize(claim);
        if tokens.is_empty() {
            return MatchResult::unmatched();
        }

        let (runs, matched_phrases) = Self::find_runs(&tokens, document_lower, params.min_match_length);

        let n = tokens.len() as f64;
        let base_matches: f64 = runs.iter().map(|&r| r as f64).sum();
        let bonus: f64 = runs
            .iter()
            .map(|&r| triangular(r as f64) * params.bonus_factor)
            .sum();
        let raw_score = base_matches + bonus;
        let max_score = n + triangular(n) * params.bonus_factor;

        let confidence = if max_score > 0.0 {
            (raw_score / max_score).clamp(0.0, 1.0)
        } else {
            0.0
        };

        MatchResult {
            confidence,
            matched_phrases,
        }
    }
}

/// `k(k-1)/2`: the number of adjacent-token pairs a run of `k` covers.
fn triangular(k: f64) -> f64 {
    k * (k - 1.0) / 2.0
}

/// Scoring algorithm selected in configuration.
///
/// `FuzzyMatch` and `SemanticSimilarity` are reserved names. Neither is
/// implemented; both score with the n-gram run strategy, and an unknown
/// name resolves to `NgramBonus`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Algorithm {
    #[default]
    NgramBonus,
    FuzzyMatch,
    SemanticSimilarity,
}

static NGRAM_RUN: NgramRunStrategy = NgramRunStrategy;

impl Algorithm {
    pub fn as_str(self) -> &'static str {
        match self {
            Algorithm::NgramBonus => "ngram_bonus",
            Algorithm::FuzzyMatch => "fuzzy_match",
            Algorithm::SemanticSimilarity => "semantic_similarity",
        }
    }

    /// Resolve a configured name. Unknown names map to `NgramBonus`.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "ngram_bonus" => Algorithm::NgramBonus,
            "fuzzy_match" => Algorithm::FuzzyMatch,
            "semantic_similarity" => Algorithm::SemanticSimilarity,
            other => {
                tracing::debug!(algorithm = %other, "Unknown algorithm, using ngram_bonus");
                Algorithm::NgramBonus
            }
        }
    }

    /// Whether this name has its own scoring implementation.
    pub fn is_implemented(self) -> bool {
        matches!(self, Algorithm::NgramBonus)
    }

    /// The strategy that actually scores claims for this algorithm.
    pub fn strategy(self) -> &'static dyn ScoringStrategy {
        if !self.is_implemented() {
            tracing::debug!(
                algorithm = self.as_str(),
                "Algorithm not implemented, falling back to ngram_bonus"
            );
        }
        &NGRAM_RUN
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Algorithm {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Algorithm {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Algorithm::from_name(&name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "the quick brown fox jumps over the lazy dog";

    fn params(bonus_factor: f64, min_match_length: usize) -> EffectiveParams {
        EffectiveParams {
            threshold: 0.5,
            bonus_factor,
            min_match_length,
        }
    }

    fn score(claim: &str, p: EffectiveParams) -> MatchResult {
        NgramRunStrategy.score(claim, DOC, &p)
    }

    #[test]
    fn test_tokenize_case_folds_and_drops_punctuation() {
        assert_eq!(tokenize("Quick, BROWN fox!"), vec!["quick", "brown", "fox"]);
        assert_eq!(tokenize("Zürich — Straße"), vec!["zürich", "straße"]);
        assert!(tokenize("  ... !!! ").is_empty());
    }

    #[test]
    fn test_tokenize_keeps_digits_and_underscores() {
        assert_eq!(tokenize("2024-01-01 snake_case"), vec!["2024", "01", "01", "snake_case"]);
    }

    #[test]
    fn test_empty_claim_scores_zero() {
        assert_eq!(score("", params(0.5, 3)), MatchResult::unmatched());
        assert_eq!(score("?!", params(0.5, 3)), MatchResult::unmatched());
    }

    #[test]
    fn test_full_containment_is_one() {
        let result = score("Quick brown fox", params(0.5, 3));
        assert_eq!(result.confidence, 1.0);
        assert_eq!(result.matched_phrases, vec!["quick brown fox"]);
    }

    #[test]
    fn test_no_match_is_zero() {
        let result = score("purple elephant", params(0.5, 2));
        assert_eq!(result, MatchResult::unmatched());
    }

    #[test]
    fn test_single_token_claim_matches_under_strict() {
        let result = score("fox", params(0.4, 4));
        assert_eq!(result.confidence, 1.0);
        assert_eq!(result.matched_phrases, vec!["fox"]);
    }

    #[test]
    fn test_scattered_tokens_below_min_length_are_gaps() {
        // No contiguous pair exists and single tokens are shorter than the minimum
        let moderate = score("quick elephant fox", params(0.5, 3));
        assert_eq!(moderate, MatchResult::unmatched());

        let lenient = score("quick elephant fox", params(0.65, 2));
        assert_eq!(lenient, MatchResult::unmatched());
    }

    #[test]
    fn test_partial_run_credit() {
        // "lazy dog" matches as a run of 2, "barks" is a gap
        let result = score("lazy dog barks", params(0.65, 2));
        let expected = (2.0 + 0.65) / (3.0 + 0.65 * 3.0);
        assert!((result.confidence - expected).abs() < 1e-12);
        assert_eq!(result.matched_phrases, vec!["lazy dog"]);
    }

    #[test]
    fn test_longer_runs_beat_split_runs() {
        // Same four matched tokens: one run of 4 vs two runs of 2
        let doc = "alpha beta gamma delta. gamma delta zeta alpha beta";
        let p = params(0.5, 2);
        let joined = NgramRunStrategy.score("alpha beta gamma delta x", doc, &p);
        let split = NgramRunStrategy.score("gamma delta alpha beta x", doc, &p);

        assert_eq!(joined.matched_phrases, vec!["alpha beta gamma delta"]);
        assert_eq!(split.matched_phrases, vec!["gamma delta", "alpha beta"]);
        assert!(joined.confidence > split.confidence);
    }

    #[test]
    fn test_zero_bonus_is_token_fraction() {
        let result = score("lazy dog barks", params(0.0, 2));
        assert!((result.confidence - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_substring_containment_is_not_word_bounded() {
        // Containment is plain substring search on the folded text
        let result = NgramRunStrategy.score("row", "brown", &params(0.5, 3));
        assert_eq!(result.confidence, 1.0);
    }

    #[test]
    fn test_algorithm_names() {
        assert_eq!(Algorithm::from_name("ngram_bonus"), Algorithm::NgramBonus);
        assert_eq!(Algorithm::from_name("fuzzy_match"), Algorithm::FuzzyMatch);
        assert_eq!(Algorithm::from_name("semantic_similarity"), Algorithm::SemanticSimilarity);
        assert_eq!(Algorithm::from_name("bm25"), Algorithm::NgramBonus);
    }

    #[test]
    fn test_reserved_algorithms_use_ngram_strategy() {
        for algorithm in [Algorithm::FuzzyMatch, Algorithm::SemanticSimilarity] {
            assert!(!algorithm.is_implemented());
            assert_eq!(algorithm.strategy().name(), "ngram_bonus");
        }
    }
}
