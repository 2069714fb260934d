//! Claim sources: where the claims for a document come from.
//!
//! In production the claims are produced by a language model reading the
//! document. The runtime never calls a model itself; it asks a `ClaimSource`
//! and validates whatever comes back.

use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;

use claimcheck_core::ClaimSet;

use crate::document::Document;

/// Errors from claim sources.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("No claims found for {document} (looked for {path})")]
    Missing { document: String, path: PathBuf },

    #[error("Failed to read claims from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Claims in {path} are not valid JSON: {source}")]
    InvalidJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Claim extraction failed: {0}")]
    Extraction(String),
}

/// Supplies the claims to validate for a document.
///
/// # Contract
/// - Implementations must not mutate shared state visible to other documents
/// - Non-list categories in raw payloads are dropped by `ClaimSet::from_json`
#[async_trait]
pub trait ClaimSource: Send + Sync {
    /// Identifier recorded in logs.
    fn name(&self) -> &str;

    async fn claims_for(&self, document: &Document) -> Result<ClaimSet, SourceError>;
}

/// Returns the same claims for every document.
#[derive(Debug, Clone, Default)]
pub struct StaticClaimSource {
    claims: ClaimSet,
}

impl StaticClaimSource {
    pub fn new(claims: ClaimSet) -> Self {
        Self { claims }
    }

    /// Read the claims from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        Ok(Self::new(read_claims(path.as_ref())?))
    }

    pub fn into_claims(self) -> ClaimSet {
        self.claims
    }
}

#[async_trait]
impl ClaimSource for StaticClaimSource {
    fn name(&self) -> &str {
        "static"
    }

    async fn claims_for(&self, _document: &Document) -> Result<ClaimSet, SourceError> {
        Ok(self.claims.clone())
    }
}

/// Reads `<stem>.claims.json` stored next to each document, or in a
/// separate claims directory.
#[derive(Debug, Clone, Default)]
pub struct SidecarClaimSource {
    directory: Option<PathBuf>,
}

impl SidecarClaimSource {
    /// Look for claims next to each document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look for claims in `directory` instead.
    pub fn in_directory(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: Some(directory.into()),
        }
    }

    /// Path of the claims file for a document.
    pub fn claims_path(&self, document: &Document) -> PathBuf {
        let file_name = format!("{}.claims.json", document.stem());
        match &self.directory {
            Some(dir) => dir.join(file_name),
            None => document
                .path
                .parent()
                .map(|p| p.join(&file_name))
                .unwrap_or_else(|| PathBuf::from(&file_name)),
        }
    }
}

#[async_trait]
impl ClaimSource for SidecarClaimSource {
    fn name(&self) -> &str {
        "sidecar"
    }

    async fn claims_for(&self, document: &Document) -> Result<ClaimSet, SourceError> {
        let path = self.claims_path(document);
        if !path.exists() {
            return Err(SourceError::Missing {
                document: document.name.clone(),
                path,
            });
        }
        read_claims(&path)
    }
}

fn read_claims(path: &Path) -> Result<ClaimSet, SourceError> {
    let contents = fs::read_to_string(path).map_err(|source| SourceError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    ClaimSet::from_json_str(&contents).map_err(|source| SourceError::InvalidJson {
        path: path.to_path_buf(),
        source,
    })
}
