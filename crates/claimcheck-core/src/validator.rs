//! The grounding validator.
//!
//! Scores every claim of every category against one document and sorts the
//! claims into verified / unverified buckets. The validator holds only its
//! configuration: repeated calls with the same inputs produce identical
//! outcomes.

use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::claims::ClaimSet;
use crate::config::ValidatorConfig;
use crate::scoring::{Algorithm, ScoringStrategy};
use crate::strictness::{EffectiveParams, Strictness};
use crate::types::{CategoryResults, MatchCounts, MatchResult, ValidationOutcome, Verdict};

/// Snapshot of the active validator configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValidatorSettings {
    pub threshold: f64,
    pub algorithm: Algorithm,
    pub bonus_factor: f64,
    pub strictness: Strictness,
    pub min_match_length: usize,
}

/// Validates model-extracted claims against document text.
#[derive(Debug, Clone)]
pub struct GroundingValidator {
    /// Base values as configured; never modified after construction
    base: ValidatorConfig,

    /// Active strictness profile
    strictness: Strictness,

    /// Parameters derived from `base` and `strictness`
    effective: EffectiveParams,
}

impl GroundingValidator {
    /// Create a validator from configuration.
    pub fn new(config: ValidatorConfig) -> Self {
        let strictness = config.strictness;
        let effective = EffectiveParams::derive(config.base_params(), strictness);
        Self {
            base: config,
            strictness,
            effective,
        }
    }

    /// Validate all claims against the document text.
    ///
    /// Each category gets a `CategoryResults` entry and a `MatchCounts`
    /// entry, in the claim set's category order. A claim that appears twice
    /// in a category is counted twice, but only its last score is kept.
    pub fn validate(&self, document_text: &str, claims: &ClaimSet) -> ValidationOutcome {
        let started = Instant::now();
        let document_lower = document_text.to_lowercase();
        let strategy = self.base.algorithm.strategy();

        let mut outcome = ValidationOutcome::default();

        for (category, items) in claims.iter() {
            let mut results = CategoryResults::default();
            let mut counts = MatchCounts::default();

            for claim in items {
                let result = strategy.score(claim, &document_lower, &self.effective);
                let verdict = Verdict::classify(&result, self.effective.threshold);
                counts.record(verdict);
                results.insert(claim.clone(), verdict, result);
            }

            outcome.results.insert(category.to_string(), results);
            outcome.match_counts.insert(category.to_string(), counts);
        }

        tracing::debug!(
            categories = claims.len(),
            claims = claims.claim_count(),
            algorithm = %self.base.algorithm,
            strictness = %self.strictness,
            elapsed_us = started.elapsed().as_micros() as u64,
            "Validated claims"
        );

        outcome
    }

    /// Validate a raw JSON claims payload.
    ///
    /// Categories that are not arrays are skipped (see [`ClaimSet::from_json`]).
    pub fn validate_json(&self, document_text: &str, claims: &serde_json::Value) -> ValidationOutcome {
        self.validate(document_text, &ClaimSet::from_json(claims))
    }

    /// Score a single claim without classifying it.
    pub fn score_claim(&self, document_text: &str, claim: &str) -> MatchResult {
        let document_lower = document_text.to_lowercase();
        self.base
            .algorithm
            .strategy()
            .score(claim, &document_lower, &self.effective)
    }

    /// Score and classify a single claim.
    pub fn classify_claim(&self, document_text: &str, claim: &str) -> (Verdict, MatchResult) {
        let result = self.score_claim(document_text, claim);
        (Verdict::classify(&result, self.effective.threshold), result)
    }

    /// Replace the effective threshold directly, clamped to [0, 1].
    ///
    /// The base threshold is left alone, so a later `set_strictness`
    /// discards this override.
    pub fn set_threshold(&mut self, threshold: f64) {
        self.effective.threshold = threshold.clamp(0.0, 1.0);
    }

    /// Switch strictness profile, re-deriving from the base values.
    pub fn set_strictness(&mut self, strictness: Strictness) {
        self.strictness = strictness;
        self.effective = EffectiveParams::derive(self.base.base_params(), strictness);
    }

    pub fn strictness(&self) -> Strictness {
        self.strictness
    }

    pub fn algorithm(&self) -> Algorithm {
        self.base.algorithm
    }

    /// Base configuration as constructed.
    pub fn base_config(&self) -> &ValidatorConfig {
        &self.base
    }

    pub fn effective_params(&self) -> EffectiveParams {
        self.effective
    }

    /// Current effective configuration.
    pub fn settings(&self) -> ValidatorSettings {
        ValidatorSettings {
            threshold: self.effective.threshold,
            algorithm: self.base.algorithm,
            bonus_factor: self.effective.bonus_factor,
            strictness: self.strictness,
            min_match_length: self.effective.min_match_length,
        }
    }
}

impl Default for GroundingValidator {
    fn default() -> Self {
        Self::new(ValidatorConfig::default())
    }
}
