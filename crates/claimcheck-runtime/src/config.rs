//! Runtime configuration.

use claimcheck_core::{PreprocessingConfig, ProfileConfig};

use crate::document::LoadOptions;

/// Configuration for batch validation.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Maximum documents validated at the same time
    pub max_concurrency: usize,

    /// Model identifier recorded in reports
    pub model_id: Option<String>,

    /// How documents are read from disk
    pub load: LoadOptions,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 4,
            model_id: None,
            load: LoadOptions::default(),
        }
    }
}

impl RuntimeConfig {
    /// Take model and preprocessing settings from a profile.
    pub fn from_profile(profile: &ProfileConfig) -> Self {
        Self {
            model_id: profile.model_id.clone(),
            load: LoadOptions::from(&profile.preprocessing),
            ..Default::default()
        }
    }

    pub fn with_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    pub fn with_preprocessing(mut self, preprocessing: &PreprocessingConfig) -> Self {
        self.load = LoadOptions::from(preprocessing);
        self
    }
}
