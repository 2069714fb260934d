//! # claimcheck-runtime
//!
//! Document pipeline around `claimcheck-core`.
//!
//! The core crate validates one claim set against one text. This crate
//! adds the parts a deployment needs around that:
//!
//! - Loading and cleaning text documents
//! - Fetching claims for each document from a [`ClaimSource`]
//! - Validating many documents concurrently with a shared, reconfigurable
//!   validator
//! - Writing per-document and batch reports as JSON
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use claimcheck_runtime::{BatchValidator, ReportWriter, RuntimeConfig, SharedValidator, SidecarClaimSource};
//!
//! let batch = BatchValidator::new(
//!     SharedValidator::default(),
//!     Arc::new(SidecarClaimSource::new()),
//!     RuntimeConfig::default(),
//! );
//!
//! let report = batch.run_path("contracts/").await?;
//! ReportWriter::new("contracts/analysis").write(&report)?;
//! ```

use thiserror::Error;

pub mod batch;
pub mod config;
pub mod document;
pub mod report;
pub mod shared;
pub mod source;

pub use batch::BatchValidator;
pub use config::RuntimeConfig;
pub use document::{clean_text, discover, load_document, Document, DocumentError, LoadOptions};
pub use report::{BatchReport, DocumentFailure, DocumentReport, ReportError, ReportMetadata, ReportWriter};
pub use shared::SharedValidator;
pub use source::{ClaimSource, SidecarClaimSource, SourceError, StaticClaimSource};

/// Errors from the runtime.
#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("Validation task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
