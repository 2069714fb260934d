//! Verification summaries derived from match counts.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::types::MatchCounts;

/// Counts and verification rate for one category (or overall).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct CategorySummary {
    pub verified: usize,
    pub unverified: usize,
    pub total: usize,
    pub verification_rate: f64,
}

impl CategorySummary {
    pub fn from_counts(counts: &MatchCounts) -> Self {
        let mut summary = Self::default();
        summary.add(counts);
        summary
    }

    fn add(&mut self, counts: &MatchCounts) {
        self.verified += counts.verified;
        self.unverified += counts.unverified;
        self.total = self.verified + self.unverified;
        self.verification_rate = rate(self.verified, self.total);
    }
}

fn rate(verified: usize, total: usize) -> f64 {
    if total > 0 {
        verified as f64 / total as f64
    } else {
        0.0
    }
}

/// Per-category and overall verification summary.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ValidationSummary {
    pub total_categories: usize,
    pub categories: IndexMap<String, CategorySummary>,
    pub overall: CategorySummary,
}

impl ValidationSummary {
    /// Summarize match counts. An empty map yields zero totals.
    pub fn from_counts(match_counts: &IndexMap<String, MatchCounts>) -> Self {
        let mut summary = Self {
            total_categories: match_counts.len(),
            ..Default::default()
        };

        for (category, counts) in match_counts {
            summary
                .categories
                .insert(category.clone(), CategorySummary::from_counts(counts));
            summary.overall.add(counts);
        }

        summary
    }

    /// Fold several per-document summaries into one (categories merged by name).
    pub fn merge<'a>(summaries: impl IntoIterator<Item = &'a ValidationSummary>) -> Self {
        let mut counts: IndexMap<String, MatchCounts> = IndexMap::new();
        for summary in summaries {
            for (category, s) in &summary.categories {
                let entry = counts.entry(category.clone()).or_default();
                entry.verified += s.verified;
                entry.unverified += s.unverified;
            }
        }
        Self::from_counts(&counts)
    }
}
