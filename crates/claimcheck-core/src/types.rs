//! Result types produced by the grounding validator.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Score for a single claim.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchResult {
    /// How well the claim is supported by the document (0.0 - 1.0)
    pub confidence: f64,

    /// Case-folded phrases from the claim found verbatim in the document
    pub matched_phrases: Vec<String>,
}

impl MatchResult {
    /// A result with no grounding at all.
    pub fn unmatched() -> Self {
        Self {
            confidence: 0.0,
            matched_phrases: Vec::new(),
        }
    }

    /// Whether at least one phrase was found in the document.
    pub fn has_matches(&self) -> bool {
        !self.matched_phrases.is_empty()
    }
}

/// Verdict for a claim after comparing its score to the active threshold.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Verified,
    Unverified,
}

impl Verdict {
    /// Classify a match result.
    ///
    /// A claim is verified only when it reaches the threshold AND at least
    /// one phrase matched.
    pub fn classify(result: &MatchResult, threshold: f64) -> Self {
        if result.confidence >= threshold && result.has_matches() {
            Verdict::Verified
        } else {
            Verdict::Unverified
        }
    }

    pub fn is_verified(self) -> bool {
        matches!(self, Verdict::Verified)
    }
}

/// Scored claims for one category, split by verdict.
///
/// Keyed by claim text: a claim repeated within a category keeps only the
/// last score (last write wins).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CategoryResults {
    pub verified: IndexMap<String, MatchResult>,
    pub unverified: IndexMap<String, MatchResult>,
}

impl CategoryResults {
    /// Record a scored claim under its verdict.
    pub fn insert(&mut self, claim: String, verdict: Verdict, result: MatchResult) {
        match verdict {
            Verdict::Verified => self.verified.insert(claim, result),
            Verdict::Unverified => self.unverified.insert(claim, result),
        };
    }

    /// Look up a claim in either bucket.
    pub fn get(&self, claim: &str) -> Option<(Verdict, &MatchResult)> {
        self.verified
            .get(claim)
            .map(|r| (Verdict::Verified, r))
            .or_else(|| self.unverified.get(claim).map(|r| (Verdict::Unverified, r)))
    }
}

/// Verified/unverified counters for one category.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatchCounts {
    pub verified: usize,
    pub unverified: usize,
}

impl MatchCounts {
    pub fn record(&mut self, verdict: Verdict) {
        match verdict {
            Verdict::Verified => self.verified += 1,
            Verdict::Unverified => self.unverified += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.verified + self.unverified
    }
}

/// Full output of one `validate` call.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ValidationOutcome {
    /// Category -> scored claims
    pub results: IndexMap<String, CategoryResults>,

    /// Category -> verdict counts (one increment per input claim)
    pub match_counts: IndexMap<String, MatchCounts>,
}

impl ValidationOutcome {
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}
