//! Validation reports and the JSON report writer.
//!
//! Output layout for a batch written to `output_dir`:
//!
//! ```text
//! output_dir/
//!   <stem>_analysis.json     one per document
//!   analysis_summary.json    batch overview
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use claimcheck_core::{
    CategoryResults, CategorySummary, ClaimSet, MatchCounts, ValidationOutcome, ValidationSummary,
    ValidatorSettings,
};

/// Errors from writing or reading reports.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Failed to write report {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Provenance recorded with each document report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportMetadata {
    pub timestamp: DateTime<Utc>,

    /// Model that produced the claims, if known
    pub model_id: Option<String>,

    /// Length of the validated text in bytes
    pub text_length: usize,
}

/// Validation result for one document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentReport {
    /// Source file name
    pub file: String,

    /// Claims as received from the claim source
    pub claims: ClaimSet,

    /// Scored claims per category
    pub validation: IndexMap<String, CategoryResults>,

    pub match_counts: IndexMap<String, MatchCounts>,

    pub summary: ValidationSummary,

    pub metadata: ReportMetadata,
}

impl DocumentReport {
    /// Build a report from a validation outcome.
    pub fn new(
        file: impl Into<String>,
        claims: ClaimSet,
        outcome: ValidationOutcome,
        text_length: usize,
        model_id: Option<String>,
    ) -> Self {
        let summary = ValidationSummary::from_counts(&outcome.match_counts);
        Self {
            file: file.into(),
            claims,
            validation: outcome.results,
            match_counts: outcome.match_counts,
            summary,
            metadata: ReportMetadata {
                timestamp: Utc::now(),
                model_id,
                text_length,
            },
        }
    }

    /// File name for this report (`<stem>_analysis.json`).
    pub fn file_name(&self) -> String {
        let stem = Path::new(&self.file)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.file.clone());
        format!("{}_analysis.json", stem)
    }

    /// Load a report written by `ReportWriter`.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// A document that could not be validated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentFailure {
    pub file: String,
    pub error: String,
}

/// Result of validating a batch of documents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    /// Successful reports, in input order
    pub reports: Vec<DocumentReport>,

    pub failures: Vec<DocumentFailure>,

    /// Validator configuration used for the batch
    pub settings: ValidatorSettings,
}

impl BatchReport {
    /// Summary across all successful documents.
    pub fn overall_summary(&self) -> ValidationSummary {
        ValidationSummary::merge(self.reports.iter().map(|r| &r.summary))
    }
}

/// Per-file entry in `analysis_summary.json`.
#[derive(Debug, Clone, Serialize)]
struct FileEntry<'a> {
    file: &'a str,
    categories: Vec<&'a str>,
    match_counts: &'a IndexMap<String, MatchCounts>,
}

/// Contents of `analysis_summary.json`.
#[derive(Debug, Clone, Serialize)]
struct RunSummary<'a> {
    total_files: usize,
    timestamp: DateTime<Utc>,
    configuration: &'a ValidatorSettings,
    results_summary: Vec<FileEntry<'a>>,
    failures: &'a [DocumentFailure],

    /// Per-category totals across all documents
    categories: IndexMap<String, CategorySummary>,

    overall: CategorySummary,
}

/// Name of the batch overview file.
pub const SUMMARY_FILE: &str = "analysis_summary.json";

/// Writes batch reports as pretty-printed JSON.
#[derive(Debug, Clone)]
pub struct ReportWriter {
    output_dir: PathBuf,
}

impl ReportWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Write one file per document plus the batch summary.
    ///
    /// Returns the paths written. An empty batch writes nothing.
    pub fn write(&self, batch: &BatchReport) -> Result<Vec<PathBuf>, ReportError> {
        if batch.reports.is_empty() && batch.failures.is_empty() {
            return Ok(Vec::new());
        }

        fs::create_dir_all(&self.output_dir).map_err(|source| ReportError::Io {
            path: self.output_dir.clone(),
            source,
        })?;

        let mut written = Vec::with_capacity(batch.reports.len() + 1);
        for report in &batch.reports {
            written.push(self.write_document(report)?);
        }

        let rollup = batch.overall_summary();
        let summary = RunSummary {
            total_files: batch.reports.len(),
            timestamp: Utc::now(),
            configuration: &batch.settings,
            results_summary: batch
                .reports
                .iter()
                .map(|r| FileEntry {
                    file: &r.file,
                    categories: r.claims.iter().map(|(c, _)| c).collect(),
                    match_counts: &r.match_counts,
                })
                .collect(),
            failures: &batch.failures,
            categories: rollup.categories,
            overall: rollup.overall,
        };
        let summary_path = self.output_dir.join(SUMMARY_FILE);
        self.write_json(&summary_path, &summary)?;
        written.push(summary_path);

        tracing::info!(
            dir = %self.output_dir.display(),
            files = written.len(),
            "Reports written"
        );
        Ok(written)
    }

    /// Write a single document report.
    pub fn write_document(&self, report: &DocumentReport) -> Result<PathBuf, ReportError> {
        let path = self.output_dir.join(report.file_name());
        self.write_json(&path, report)?;
        Ok(path)
    }

    fn write_json<T: Serialize>(&self, path: &Path, value: &T) -> Result<(), ReportError> {
        let json = serde_json::to_string_pretty(value)?;
        fs::write(path, json).map_err(|source| ReportError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use claimcheck_core::GroundingValidator;

    fn sample_report(file: &str) -> DocumentReport {
        let text = "Acme Corp signed the lease on 1 May 2024";
        let claims = ClaimSet::new()
            .with_category("parties", ["Acme Corp", "Globex"])
            .with_category("dates", ["1 May 2024"]);
        let outcome = GroundingValidator::default().validate(text, &claims);
        DocumentReport::new(file, claims, outcome, text.len(), Some("test-model".into()))
    }

    fn batch(reports: Vec<DocumentReport>) -> BatchReport {
        BatchReport {
            reports,
            failures: vec![DocumentFailure {
                file: "broken.txt".into(),
                error: "No claims".into(),
            }],
            settings: GroundingValidator::default().settings(),
        }
    }

    #[test]
    fn test_report_summary_matches_counts() {
        let report = sample_report("lease.txt");
        assert_eq!(report.summary.overall.verified, 2);
        assert_eq!(report.summary.overall.unverified, 1);
        assert_eq!(report.metadata.model_id.as_deref(), Some("test-model"));
        assert_eq!(report.file_name(), "lease_analysis.json");
    }

    #[test]
    fn test_write_batch() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ReportWriter::new(dir.path().join("analysis"));

        let written = writer
            .write(&batch(vec![sample_report("lease.txt"), sample_report("memo.md")]))
            .unwrap();

        assert_eq!(written.len(), 3);
        assert!(writer.output_dir().join("lease_analysis.json").exists());
        assert!(writer.output_dir().join("memo_analysis.json").exists());

        let summary: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(writer.output_dir().join(SUMMARY_FILE)).unwrap())
                .unwrap();
        assert_eq!(summary["total_files"], 2);
        assert_eq!(summary["overall"]["total"], 6);
        assert_eq!(summary["overall"]["verified"], 4);
        assert!(summary["overall"].get("overall").is_none());
        assert_eq!(summary["categories"]["parties"]["total"], 4);
        assert_eq!(summary["categories"]["dates"]["verified"], 2);
        assert_eq!(summary["results_summary"][0]["categories"][0], "parties");
        assert_eq!(summary["failures"][0]["file"], "broken.txt");
        assert_eq!(summary["configuration"]["strictness"], "moderate");
    }

    #[test]
    fn test_report_roundtrip_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ReportWriter::new(dir.path());
        let report = sample_report("lease.txt");

        let path = writer.write_document(&report).unwrap();
        let loaded = DocumentReport::from_json_str(&fs::read_to_string(path).unwrap()).unwrap();

        assert_eq!(loaded, report);
    }

    #[test]
    fn test_empty_batch_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ReportWriter::new(dir.path().join("out"));
        let empty = BatchReport {
            reports: vec![],
            failures: vec![],
            settings: GroundingValidator::default().settings(),
        };

        assert!(writer.write(&empty).unwrap().is_empty());
        assert!(!writer.output_dir().exists());
    }
}
