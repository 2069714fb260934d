//! Validator shared between concurrent jobs.
//!
//! Validation reads the configuration; reconfiguration writes it. A batch
//! run takes one snapshot under the read lock so a reconfiguration never
//! changes the parameters halfway through the run.

use std::sync::Arc;

use parking_lot::RwLock;

use claimcheck_core::{GroundingValidator, Strictness, ValidatorConfig, ValidatorSettings};

/// Single-writer / many-reader handle to a `GroundingValidator`.
#[derive(Debug, Clone, Default)]
pub struct SharedValidator {
    inner: Arc<RwLock<GroundingValidator>>,
}

impl SharedValidator {
    pub fn new(validator: GroundingValidator) -> Self {
        Self {
            inner: Arc::new(RwLock::new(validator)),
        }
    }

    pub fn from_config(config: ValidatorConfig) -> Self {
        Self::new(GroundingValidator::new(config))
    }

    /// Copy of the current validator for one run.
    pub fn snapshot(&self) -> GroundingValidator {
        self.inner.read().clone()
    }

    pub fn settings(&self) -> ValidatorSettings {
        self.inner.read().settings()
    }

    pub fn set_threshold(&self, threshold: f64) {
        self.inner.write().set_threshold(threshold);
        tracing::info!(threshold, "Validator threshold updated");
    }

    pub fn set_strictness(&self, strictness: Strictness) {
        self.inner.write().set_strictness(strictness);
        tracing::info!(strictness = %strictness, "Validator strictness updated");
    }
}
