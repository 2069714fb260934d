//! Batch validation.
//!
//! ## Flow
//!
//! ```text
//! snapshot validator once per run
//! documents ──► ClaimSource ──► blocking task ──► DocumentReport
//!     (at most `max_concurrency` documents in flight, results in input order)
//! ```
//!
//! A document that fails at any step is recorded in `BatchReport::failures`;
//! the rest of the batch continues.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use futures::stream::{self, StreamExt};

use claimcheck_core::{GroundingValidator, ValidatorSettings};

use crate::config::RuntimeConfig;
use crate::document::{discover, load_document, Document};
use crate::report::{BatchReport, DocumentFailure, DocumentReport};
use crate::shared::SharedValidator;
use crate::source::ClaimSource;
use crate::RuntimeError;

/// Validates many documents against their claims.
pub struct BatchValidator {
    validator: SharedValidator,
    source: Arc<dyn ClaimSource>,
    config: RuntimeConfig,
}

impl BatchValidator {
    pub fn new(validator: SharedValidator, source: Arc<dyn ClaimSource>, config: RuntimeConfig) -> Self {
        Self {
            validator,
            source,
            config,
        }
    }

    /// Handle to the shared validator, for reconfiguration between runs.
    pub fn validator(&self) -> &SharedValidator {
        &self.validator
    }

    /// Validate in-memory documents.
    ///
    /// The validator is snapshotted once when the run starts: every document
    /// is scored with it and its settings are the ones recorded, even if the
    /// shared validator is reconfigured mid-run.
    pub async fn run(&self, documents: Vec<Document>) -> BatchReport {
        let started = Instant::now();
        let snapshot = self.validator.snapshot();
        let settings = snapshot.settings();
        let total = documents.len();
        tracing::info!(
            documents = total,
            source = self.source.name(),
            max_concurrency = self.config.max_concurrency,
            "Batch validation started"
        );

        let results: Vec<(String, Result<DocumentReport, RuntimeError>)> = stream::iter(documents)
            .map(|document| {
                let validator = snapshot.clone();
                async move {
                    let name = document.name.clone();
                    (name, self.validate_document(document, validator).await)
                }
            })
            .buffered(self.config.max_concurrency.max(1))
            .collect()
            .await;

        let batch = collect(results, settings);
        tracing::info!(
            documents = total,
            failed = batch.failures.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Batch validation finished"
        );
        batch
    }

    /// Discover, load and validate the documents at `path`.
    ///
    /// Documents that fail to load are recorded as failures alongside
    /// validation failures. A missing `path` is an error.
    pub async fn run_path(&self, path: impl AsRef<Path>) -> Result<BatchReport, RuntimeError> {
        let paths = discover(path.as_ref(), &self.config.load)?;
        if paths.is_empty() {
            tracing::warn!(path = %path.as_ref().display(), "No supported documents found");
        }

        let mut documents = Vec::with_capacity(paths.len());
        let mut load_failures = Vec::new();
        for p in paths {
            match load_document(&p, &self.config.load) {
                Ok(document) => documents.push(document),
                Err(e) => {
                    tracing::warn!(path = %p.display(), error = %e, "Failed to load document");
                    load_failures.push(DocumentFailure {
                        file: file_name(&p),
                        error: e.to_string(),
                    });
                }
            }
        }

        let mut batch = self.run(documents).await;
        load_failures.append(&mut batch.failures);
        batch.failures = load_failures;
        Ok(batch)
    }

    async fn validate_document(
        &self,
        document: Document,
        validator: GroundingValidator,
    ) -> Result<DocumentReport, RuntimeError> {
        let claims = self.source.claims_for(&document).await?;
        let model_id = self.config.model_id.clone();

        let report = tokio::task::spawn_blocking(move || {
            let outcome = validator.validate(&document.text, &claims);
            DocumentReport::new(document.name, claims, outcome, document.text.len(), model_id)
        })
        .await?;

        tracing::debug!(
            file = %report.file,
            verified = report.summary.overall.verified,
            total = report.summary.overall.total,
            "Document validated"
        );
        Ok(report)
    }
}

fn collect(
    results: Vec<(String, Result<DocumentReport, RuntimeError>)>,
    settings: ValidatorSettings,
) -> BatchReport {
    let mut reports = Vec::with_capacity(results.len());
    let mut failures = Vec::new();
    for (file, result) in results {
        match result {
            Ok(report) => reports.push(report),
            Err(e) => {
                tracing::warn!(file = %file, error = %e, "Document validation failed");
                failures.push(DocumentFailure {
                    file,
                    error: e.to_string(),
                });
            }
        }
    }

    BatchReport {
        reports,
        failures,
        settings,
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    use async_trait::async_trait;
    use claimcheck_core::{ClaimSet, Strictness};

    use crate::source::{SidecarClaimSource, SourceError, StaticClaimSource};

    /// Fails for documents whose name starts with "bad".
    struct PickySource;

    #[async_trait]
    impl ClaimSource for PickySource {
        fn name(&self) -> &str {
            "picky"
        }

        async fn claims_for(&self, document: &Document) -> Result<ClaimSet, SourceError> {
            if document.name.starts_with("bad") {
                return Err(SourceError::Extraction("model returned nothing".into()));
            }
            Ok(ClaimSet::new().with_category("animals", ["lazy dog", "purple cow"]))
        }
    }

    fn batch_validator(source: Arc<dyn ClaimSource>, concurrency: usize) -> BatchValidator {
        BatchValidator::new(
            SharedValidator::default(),
            source,
            RuntimeConfig::default().with_concurrency(concurrency),
        )
    }

    #[tokio::test]
    async fn test_run_preserves_order() {
        let validator = batch_validator(Arc::new(PickySource), 2);
        let documents: Vec<Document> = (0..6)
            .map(|i| Document::new(format!("doc{}.txt", i), "The quick brown fox jumps over the lazy dog"))
            .collect();

        let batch = validator.run(documents).await;

        let files: Vec<&str> = batch.reports.iter().map(|r| r.file.as_str()).collect();
        assert_eq!(files, ["doc0.txt", "doc1.txt", "doc2.txt", "doc3.txt", "doc4.txt", "doc5.txt"]);
        for report in &batch.reports {
            assert_eq!(report.match_counts["animals"].verified, 1);
            assert_eq!(report.match_counts["animals"].unverified, 1);
        }
        assert!(batch.failures.is_empty());
    }

    #[tokio::test]
    async fn test_failures_do_not_abort_batch() {
        let validator = batch_validator(Arc::new(PickySource), 4);
        let documents = vec![
            Document::new("good.txt", "lazy dog"),
            Document::new("bad.txt", "lazy dog"),
            Document::new("fine.txt", "lazy dog"),
        ];

        let batch = validator.run(documents).await;

        assert_eq!(batch.reports.len(), 2);
        assert_eq!(batch.failures.len(), 1);
        assert_eq!(batch.failures[0].file, "bad.txt");
        assert!(batch.failures[0].error.contains("model returned nothing"));
        assert_eq!(batch.overall_summary().overall.total, 4);
    }

    #[tokio::test]
    async fn test_settings_recorded() {
        let validator = batch_validator(Arc::new(StaticClaimSource::default()), 1);
        validator.validator().set_strictness(Strictness::Strict);

        let batch = validator.run(vec![Document::new("a.txt", "text")]).await;
        assert_eq!(batch.settings.strictness, Strictness::Strict);
        assert_eq!(batch.reports[0].summary.total_categories, 0);
    }

    /// Switches the shared validator to strict while the batch is running.
    struct ReconfiguringSource {
        shared: SharedValidator,
    }

    #[async_trait]
    impl ClaimSource for ReconfiguringSource {
        fn name(&self) -> &str {
            "reconfiguring"
        }

        async fn claims_for(&self, _document: &Document) -> Result<ClaimSet, SourceError> {
            self.shared.set_strictness(Strictness::Strict);
            Ok(ClaimSet::new().with_category("animals", ["quick brown fox runs"]))
        }
    }

    #[tokio::test]
    async fn test_reconfiguration_mid_run_uses_start_snapshot() {
        let shared = SharedValidator::default();
        let validator = BatchValidator::new(
            shared.clone(),
            Arc::new(ReconfiguringSource { shared: shared.clone() }),
            RuntimeConfig::default().with_concurrency(1),
        );
        let documents = vec![
            Document::new("a.txt", "the quick brown fox"),
            Document::new("b.txt", "the quick brown fox"),
        ];

        // 4.5 / 7 at moderate; strict cannot match a 3-token run of a 4-token claim
        let batch = validator.run(documents.clone()).await;
        assert_eq!(batch.settings.strictness, Strictness::Moderate);
        for report in &batch.reports {
            assert_eq!(report.match_counts["animals"].verified, 1);
        }
        assert_eq!(shared.settings().strictness, Strictness::Strict);

        let next = validator.run(documents).await;
        assert_eq!(next.settings.strictness, Strictness::Strict);
        assert_eq!(next.overall_summary().overall.verified, 0);
    }

    #[tokio::test]
    async fn test_run_path_with_sidecars() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("lease.txt"), "The Tenant shall pay rent to Acme Corp.").unwrap();
        fs::write(
            dir.path().join("lease.claims.json"),
            r#"{"parties": ["Acme Corp", "Globex Inc"]}"#,
        )
        .unwrap();
        fs::write(dir.path().join("memo.md"), "No claims file for this one.").unwrap();
        fs::write(dir.path().join("scan.pdf"), "binary").unwrap();

        let validator = batch_validator(Arc::new(SidecarClaimSource::new()), 4);
        let batch = validator.run_path(dir.path()).await.unwrap();

        assert_eq!(batch.reports.len(), 1);
        assert_eq!(batch.reports[0].file, "lease.txt");
        assert_eq!(batch.reports[0].match_counts["parties"].verified, 1);
        assert_eq!(batch.failures.len(), 1);
        assert_eq!(batch.failures[0].file, "memo.md");
    }

    #[tokio::test]
    async fn test_run_path_missing() {
        let validator = batch_validator(Arc::new(StaticClaimSource::default()), 1);
        let result = validator.run_path("/definitely/not/here").await;
        assert!(matches!(result, Err(RuntimeError::Document(_))));
    }
}
