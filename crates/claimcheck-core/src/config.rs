//! Validator and profile configuration.
//!
//! Configuration files may be YAML, JSON, or TOML (chosen by extension). A
//! file holds either a single profile:
//!
//! ```yaml
//! model_id: "gemma3n:e4b"
//! validation:
//!   threshold: 0.4
//!   strictness: moderate
//! ```
//!
//! or several named profiles keyed by name (`legal:`, `medical:`, ...).
//! Missing validation fields take their defaults.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::scoring::Algorithm;
use crate::strictness::{BaseParams, Strictness};

/// Errors that can occur when loading or saving configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Failed to parse TOML: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Failed to write TOML: {0}")]
    TomlWriteError(#[from] toml::ser::Error),

    #[error("Unsupported configuration format: {0}")]
    UnsupportedFormat(String),

    #[error("Unknown strictness: {0} (expected lenient, moderate or strict)")]
    UnknownStrictness(String),

    #[error("Unknown template: {name}. Available: {available}")]
    UnknownTemplate { name: String, available: String },
}

/// Base validator settings as written in configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Minimum confidence for a verified claim (before strictness scaling)
    pub threshold: f64,

    /// Scoring algorithm name
    pub algorithm: Algorithm,

    /// Weight of the consecutive-run bonus (before strictness scaling)
    pub bonus_factor: f64,

    /// Strictness profile
    pub strictness: Strictness,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            threshold: 0.5,
            algorithm: Algorithm::NgramBonus,
            bonus_factor: 0.5,
            strictness: Strictness::Moderate,
        }
    }
}

impl ValidatorConfig {
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_bonus_factor(mut self, bonus_factor: f64) -> Self {
        self.bonus_factor = bonus_factor;
        self
    }

    pub fn with_strictness(mut self, strictness: Strictness) -> Self {
        self.strictness = strictness;
        self
    }

    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn base_params(&self) -> BaseParams {
        BaseParams {
            threshold: self.threshold,
            bonus_factor: self.bonus_factor,
        }
    }
}

/// Document preprocessing settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PreprocessingConfig {
    /// File extensions (with leading dot) accepted for analysis
    pub supported_formats: Vec<String>,

    /// Normalize whitespace and strip extraction artifacts
    pub clean_text: bool,
}

impl Default for PreprocessingConfig {
    fn default() -> Self {
        Self {
            supported_formats: vec![".txt".to_string(), ".md".to_string()],
            clean_text: true,
        }
    }
}

/// One named analysis profile.
///
/// Unknown keys are rejected so that a file of named profiles is never
/// mistaken for a single profile.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ProfileConfig {
    /// Model that produced the claims (recorded in reports)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_id: Option<String>,

    /// Extraction prompt settings, carried through for the extractor
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<serde_json::Value>,

    pub validation: ValidatorConfig,

    pub preprocessing: PreprocessingConfig,
}

/// Contents of a configuration file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ConfigFile {
    /// Top-level `validation` / `preprocessing` keys
    Single(ProfileConfig),

    /// Profiles keyed by name
    Named(BTreeMap<String, ProfileConfig>),
}

/// Supported configuration file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Json,
    Toml,
}

impl ConfigFormat {
    /// Pick a format from a file extension.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match ext.as_str() {
            "yaml" | "yml" => Ok(ConfigFormat::Yaml),
            "json" => Ok(ConfigFormat::Json),
            "toml" => Ok(ConfigFormat::Toml),
            _ => Err(ConfigError::UnsupportedFormat(format!(".{}", ext))),
        }
    }
}

impl ConfigFile {
    /// Parse configuration text in the given format.
    pub fn parse(contents: &str, format: ConfigFormat) -> Result<Self, ConfigError> {
        let parsed = match format {
            ConfigFormat::Yaml => serde_yaml::from_str(contents)?,
            ConfigFormat::Json => serde_json::from_str(contents)?,
            ConfigFormat::Toml => toml::from_str(contents)?,
        };
        Ok(parsed)
    }

    /// Load a configuration file, choosing the format by extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let format = ConfigFormat::from_path(path)?;
        let contents = fs::read_to_string(path)?;
        Self::parse(&contents, format)
    }

    /// Render in the given format.
    pub fn render(&self, format: ConfigFormat) -> Result<String, ConfigError> {
        let rendered = match format {
            ConfigFormat::Yaml => serde_yaml::to_string(self)?,
            ConfigFormat::Json => serde_json::to_string_pretty(self)?,
            ConfigFormat::Toml => toml::to_string_pretty(self)?,
        };
        Ok(rendered)
    }

    /// Write to a file, choosing the format by extension.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let format = ConfigFormat::from_path(path)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.render(format)?)?;
        Ok(())
    }

    /// Select a profile.
    ///
    /// A named profile wins when `name` is given and present. Otherwise a
    /// single-profile file yields its profile, and anything else falls back
    /// to the built-in `legal` template.
    pub fn profile(&self, name: Option<&str>) -> ProfileConfig {
        match (self, name) {
            (ConfigFile::Named(profiles), Some(name)) if profiles.contains_key(name) => {
                profiles[name].clone()
            }
            (ConfigFile::Single(profile), _) => profile.clone(),
            _ => {
                tracing::debug!(profile = ?name, "Profile not found, using legal template");
                templates::legal()
            }
        }
    }

    /// Names of the profiles in this file (empty for a single-profile file).
    pub fn profile_names(&self) -> Vec<String> {
        match self {
            ConfigFile::Single(_) => Vec::new(),
            ConfigFile::Named(profiles) => profiles.keys().cloned().collect(),
        }
    }
}

/// Built-in profile templates.
pub mod templates {
    use serde_json::{json, Value};

    use super::*;

    /// Names of all built-in templates.
    pub const NAMES: [&str; 3] = ["legal", "medical", "contracts"];

    const DEFAULT_MODEL: &str = "gemma3n:e4b";

    const LEGAL_SYSTEM_PROMPT: &str = "You are a legal document analyst tasked with extracting information from legal documents.

Instructions:
1. Review the provided document text and context information.
2. Extract relevant legal entities, clauses, dates, and key information based on the specified extraction targets.
3. Focus only on information directly relevant to the specified context.
4. If no relevant information is found, return empty arrays.
5. Do not include any text, notes, or explanations outside of the JSON object.
6. Disregard any artifacts from document parsing.";

    const LEGAL_PROMPT_TEMPLATE: &str = "Use the following information to extract the relevant legal information.

Context: {context}
Document Type: {document_type}
Analysis Target: {analysis_target}

Document Text:
{document_text}";

    const MEDICAL_SYSTEM_PROMPT: &str = "You are a medical data analyst tasked with extracting information from medical documents.

Instructions:
1. Review the provided medical document text and context information.
2. Identify relevant medical information based on the specified context and analysis target.
3. Only include information directly relevant to the specified context.
4. If no relevant information is found, return empty arrays.
5. Do not include any text, notes, or explanations outside of the JSON object.
6. Disregard any artifacts from document parsing.";

    const MEDICAL_PROMPT_TEMPLATE: &str = "Use the following information to extract relevant medical information.

Context: {context}
Analysis Target: {analysis_target}
Date of Interest: {date}

Medical Document Text:
{document_text}";

    const CONTRACTS_SYSTEM_PROMPT: &str = "You are a contract analyst tasked with extracting key information from contract documents.

Instructions:
1. Review the provided contract text and context information.
2. Extract contract terms, parties, obligations, dates, and financial information.
3. Focus only on information directly relevant to the contract analysis.
4. If no relevant information is found, return empty arrays.
5. Do not include any text, notes, or explanations outside of the JSON object.
6. Disregard any artifacts from document parsing.";

    const CONTRACTS_PROMPT_TEMPLATE: &str = "Use the following information to extract relevant contract information.

Contract Type: {contract_type}
Analysis Focus: {analysis_focus}
Context: {context}

Contract Text:
{document_text}";

    /// Extractor settings: prompts, model parameters, and a response schema
    /// with one string-array property per category.
    ///
    /// Scalars come before `response_schema` so the block also renders as TOML.
    fn analysis(system_prompt: &str, prompt_template: &str, categories: &[&str]) -> Value {
        let properties: serde_json::Map<String, Value> = categories
            .iter()
            .map(|c| (c.to_string(), json!({ "type": "array", "items": { "type": "string" } })))
            .collect();

        json!({
            "system_prompt": system_prompt,
            "prompt_template": prompt_template,
            "model_id": DEFAULT_MODEL,
            "max_tokens": 16000,
            "temperature": 0.2,
            "response_schema": { "type": "object", "properties": properties }
        })
    }

    fn profile(analysis: Value, threshold: f64, strictness: Strictness) -> ProfileConfig {
        ProfileConfig {
            model_id: Some(DEFAULT_MODEL.to_string()),
            analysis: Some(analysis),
            validation: ValidatorConfig::default()
                .with_threshold(threshold)
                .with_strictness(strictness),
            preprocessing: PreprocessingConfig::default(),
        }
    }

    pub fn legal() -> ProfileConfig {
        profile(
            analysis(
                LEGAL_SYSTEM_PROMPT,
                LEGAL_PROMPT_TEMPLATE,
                &["entities", "key_clauses", "dates", "obligations"],
            ),
            0.4,
            Strictness::Moderate,
        )
    }

    pub fn medical() -> ProfileConfig {
        profile(
            analysis(
                MEDICAL_SYSTEM_PROMPT,
                MEDICAL_PROMPT_TEMPLATE,
                &["injuries", "treatments", "medications", "diagnoses"],
            ),
            0.5,
            Strictness::Strict,
        )
    }

    pub fn contracts() -> ProfileConfig {
        profile(
            analysis(
                CONTRACTS_SYSTEM_PROMPT,
                CONTRACTS_PROMPT_TEMPLATE,
                &["parties", "terms", "obligations", "dates", "financial_terms"],
            ),
            0.4,
            Strictness::Moderate,
        )
    }

    /// Look up a template by name.
    pub fn get(name: &str) -> Result<ProfileConfig, ConfigError> {
        match name {
            "legal" => Ok(legal()),
            "medical" => Ok(medical()),
            "contracts" => Ok(contracts()),
            _ => Err(ConfigError::UnknownTemplate {
                name: name.to_string(),
                available: NAMES.join(", "),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ValidatorConfig::default();
        assert_eq!(config.threshold, 0.5);
        assert_eq!(config.bonus_factor, 0.5);
        assert_eq!(config.algorithm, Algorithm::NgramBonus);
        assert_eq!(config.strictness, Strictness::Moderate);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let yaml = r#"
validation:
  threshold: 0.4
  strictness: strict
"#;
        let file = ConfigFile::parse(yaml, ConfigFormat::Yaml).unwrap();
        let profile = file.profile(None);

        assert_eq!(profile.validation.threshold, 0.4);
        assert_eq!(profile.validation.strictness, Strictness::Strict);
        assert_eq!(profile.validation.bonus_factor, 0.5);
        assert!(profile.preprocessing.clean_text);
    }

    #[test]
    fn test_unknown_strictness_and_algorithm_in_file() {
        let json = r#"{ "validation": { "strictness": "extreme", "algorithm": "bm25" } }"#;
        let file = ConfigFile::parse(json, ConfigFormat::Json).unwrap();
        let validation = file.profile(None).validation;

        assert_eq!(validation.strictness, Strictness::Moderate);
        assert_eq!(validation.algorithm, Algorithm::NgramBonus);
    }

    #[test]
    fn test_named_profiles_toml() {
        let toml = r#"
[medical]
model_id = "local-model"

[medical.validation]
threshold = 0.6
strictness = "strict"

[legal.validation]
threshold = 0.3
"#;
        let file = ConfigFile::parse(toml, ConfigFormat::Toml).unwrap();
        assert_eq!(file.profile_names(), vec!["legal", "medical"]);

        let medical = file.profile(Some("medical"));
        assert_eq!(medical.model_id.as_deref(), Some("local-model"));
        assert_eq!(medical.validation.threshold, 0.6);

        // Missing profile name falls back to the legal template
        let fallback = file.profile(Some("finance"));
        assert_eq!(fallback, templates::legal());
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(ConfigFormat::from_path(Path::new("a.YML")).unwrap(), ConfigFormat::Yaml);
        assert_eq!(ConfigFormat::from_path(Path::new("a.toml")).unwrap(), ConfigFormat::Toml);
        assert!(matches!(
            ConfigFormat::from_path(Path::new("a.ini")),
            Err(ConfigError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_save_and_load_template() {
        let dir = tempfile::tempdir().unwrap();
        for ext in ["yaml", "json", "toml"] {
            let path = dir.path().join(format!("medical.{}", ext));
            ConfigFile::Single(templates::medical()).save(&path).unwrap();

            let loaded = ConfigFile::load(&path).unwrap();
            assert_eq!(loaded.profile(None), templates::medical(), "format {}", ext);
        }
    }

    #[test]
    fn test_templates_carry_extractor_settings() {
        for name in templates::NAMES {
            let profile = templates::get(name).unwrap();
            let analysis = profile.analysis.expect("template has analysis settings");
            assert!(analysis["system_prompt"].as_str().unwrap().contains("Instructions:"));
            assert!(analysis["prompt_template"].as_str().unwrap().contains("{document_text}"));
            assert_eq!(analysis["model_id"], "gemma3n:e4b");
            assert_eq!(analysis["max_tokens"], 16000);
            assert_eq!(analysis["temperature"], 0.2);
            assert_eq!(analysis["response_schema"]["type"], "object");
        }

        let medical = templates::medical().analysis.unwrap();
        let categories: Vec<&String> = medical["response_schema"]["properties"]
            .as_object()
            .unwrap()
            .keys()
            .collect();
        assert_eq!(categories, ["injuries", "treatments", "medications", "diagnoses"]);
        assert_eq!(
            medical["response_schema"]["properties"]["injuries"]["items"]["type"],
            "string"
        );
    }

    #[test]
    fn test_unknown_template() {
        let err = templates::get("finance").unwrap_err();
        assert!(err.to_string().contains("legal, medical, contracts"));
    }

    #[test]
    fn test_template_values() {
        assert_eq!(templates::medical().validation.strictness, Strictness::Strict);
        assert_eq!(templates::legal().validation.threshold, 0.4);
        assert_eq!(templates::contracts().validation.strictness, Strictness::Moderate);
    }
}
