//! Plain-text document loading and cleanup.
//!
//! Binary formats (PDF, DOCX) are extracted upstream; this module only reads
//! text files and strips the artifacts extraction tends to leave behind.

use std::fs;
use std::path::{Path, PathBuf};

use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

use claimcheck_core::PreprocessingConfig;

/// Errors from document loading.
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("Document not found: {0}")]
    NotFound(PathBuf),

    #[error("Unsupported document format: {format} (supported: {supported})")]
    UnsupportedFormat { format: String, supported: String },

    #[error("Failed to read document {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Extensions this crate can read directly.
pub const TEXT_FORMATS: [&str; 3] = [".txt", ".md", ".text"];

/// A loaded document.
#[derive(Debug, Clone)]
pub struct Document {
    /// File name (e.g., "contract.txt")
    pub name: String,

    pub path: PathBuf,

    pub text: String,
}

impl Document {
    /// Build an in-memory document.
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            path: PathBuf::from(&name),
            name,
            text: text.into(),
        }
    }

    /// File name without extension.
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.name.clone())
    }
}

lazy_static! {
    static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").unwrap();

    /// Anything outside word characters, whitespace and common punctuation.
    static ref ARTIFACT_CHARS: Regex = Regex::new(r#"[^\w\s.,!?;:\-()\[\]"'/]"#).unwrap();
}

/// Normalize extracted text.
///
/// Collapses whitespace, replaces stray symbols with spaces and squashes
/// runs of five or more identical characters (OCR noise) down to two.
pub fn clean_text(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let collapsed = WHITESPACE_RUN.replace_all(text, " ");
    let stripped = ARTIFACT_CHARS.replace_all(&collapsed, " ");
    squash_repeats(&stripped).trim().to_string()
}

// The regex crate has no backreferences, so repeated characters are
// squashed by hand.
fn squash_repeats(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let mut j = i;
        while j < chars.len() && chars[j] == c {
            j += 1;
        }
        let run = j - i;
        let keep = if run >= 5 { 2 } else { run };
        out.extend(std::iter::repeat(c).take(keep));
        i = j;
    }

    out
}

/// Options for loading documents.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Accepted extensions (lowercase, with leading dot)
    pub supported_formats: Vec<String>,

    pub clean_text: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self::from(&PreprocessingConfig::default())
    }
}

impl From<&PreprocessingConfig> for LoadOptions {
    fn from(config: &PreprocessingConfig) -> Self {
        Self {
            supported_formats: config
                .supported_formats
                .iter()
                .map(|f| f.to_ascii_lowercase())
                .collect(),
            clean_text: config.clean_text,
        }
    }
}

impl LoadOptions {
    fn accepts(&self, path: &Path) -> bool {
        let ext = extension_of(path);
        self.supported_formats.contains(&ext) && TEXT_FORMATS.contains(&ext.as_str())
    }
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e.to_ascii_lowercase()))
        .unwrap_or_default()
}

/// Load a text document from disk.
///
/// Invalid UTF-8 is decoded lossily rather than rejected.
pub fn load_document(path: impl AsRef<Path>, options: &LoadOptions) -> Result<Document, DocumentError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(DocumentError::NotFound(path.to_path_buf()));
    }
    if !options.accepts(path) {
        return Err(DocumentError::UnsupportedFormat {
            format: extension_of(path),
            supported: supported_list(options),
        });
    }

    let bytes = fs::read(path).map_err(|source| DocumentError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let text = match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => {
            tracing::debug!(path = %path.display(), "Document is not valid UTF-8, decoding lossily");
            String::from_utf8_lossy(e.as_bytes()).into_owned()
        }
    };

    let text = if options.clean_text { clean_text(&text) } else { text };

    Ok(Document {
        name: path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
        path: path.to_path_buf(),
        text,
    })
}

fn supported_list(options: &LoadOptions) -> String {
    options
        .supported_formats
        .iter()
        .filter(|f| TEXT_FORMATS.contains(&f.as_str()))
        .cloned()
        .collect::<Vec<_>>()
        .join(", ")
}

/// Find loadable documents.
///
/// A file path yields itself when its format is accepted. A directory
/// yields its accepted files (not recursive), sorted by name.
pub fn discover(path: impl AsRef<Path>, options: &LoadOptions) -> Result<Vec<PathBuf>, DocumentError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(DocumentError::NotFound(path.to_path_buf()));
    }

    if path.is_file() {
        return Ok(if options.accepts(path) {
            vec![path.to_path_buf()]
        } else {
            Vec::new()
        });
    }

    let io_err = |source| DocumentError::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in fs::read_dir(path).map_err(io_err)? {
        let entry_path = entry.map_err(io_err)?.path();
        if entry_path.is_file() && options.accepts(&entry_path) {
            files.push(entry_path);
        }
    }
    files.sort();
    Ok(files)
}
