//! # claimcheck-core
//!
//! Deterministic grounding validation for model-extracted claims.
//!
//! A language model reads a document and proposes claims grouped by
//! category (`entities`, `dates`, ...). This crate decides which of those
//! claims are actually supported by the document text:
//! - Which phrases of a claim appear verbatim in the document?
//! - How much of the claim do they cover, and how contiguously?
//! - Does that clear the configured threshold?
//!
//! ## Key Guarantees
//!
//! 1. **Deterministic**: Same input always produces same output
//! 2. **No model calls, no I/O**: Scoring is pure string matching
//! 3. **Transparent**: Unverified claims keep their score and matched phrases
//! 4. **Parallel-safe**: A validator is immutable while validating and can be shared across threads
//!
//! ## Example
//!
//! ```rust
//! use claimcheck_core::{validate, ClaimSet, ValidationSummary, ValidatorConfig};
//!
//! let document = "The quick brown fox jumps over the lazy dog";
//! let claims = ClaimSet::new().with_category("animals", ["quick brown fox", "purple cat"]);
//!
//! let outcome = validate(&ValidatorConfig::default(), document, &claims);
//! let summary = ValidationSummary::from_counts(&outcome.match_counts);
//!
//! assert_eq!(summary.overall.verified, 1);
//! assert_eq!(summary.overall.unverified, 1);
//! ```

pub mod claims;
pub mod config;
pub mod scoring;
pub mod strictness;
pub mod summary;
pub mod types;
pub mod validator;

// Re-export main types at crate root
pub use claims::ClaimSet;
pub use config::{
    templates, ConfigError, ConfigFile, ConfigFormat, PreprocessingConfig, ProfileConfig,
    ValidatorConfig,
};
pub use scoring::{tokenize, Algorithm, NgramRunStrategy, ScoringStrategy};
pub use strictness::{BaseParams, EffectiveParams, Strictness, StrictnessProfile};
pub use summary::{CategorySummary, ValidationSummary};
pub use types::{CategoryResults, MatchCounts, MatchResult, ValidationOutcome, Verdict};
pub use validator::{GroundingValidator, ValidatorSettings};

/// Validate claims against a document with the given configuration.
///
/// Shorthand for `GroundingValidator::new(config.clone()).validate(..)`.
pub fn validate(config: &ValidatorConfig, document_text: &str, claims: &ClaimSet) -> ValidationOutcome {
    GroundingValidator::new(config.clone()).validate(document_text, claims)
}
