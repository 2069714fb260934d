//! Command handlers.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tracing::info;

use claimcheck_core::{templates, ConfigFile, GroundingValidator, ProfileConfig, ValidationSummary};
use claimcheck_runtime::{
    load_document, BatchReport, BatchValidator, ClaimSource, DocumentReport, LoadOptions, ReportWriter,
    RuntimeConfig, SharedValidator, SidecarClaimSource, StaticClaimSource,
};

use crate::cli::{BatchArgs, Cli, SummarizeArgs, TemplatesArgs, ValidateArgs};

/// Resolve the active profile from `--config` and `--profile`.
///
/// With a config file the profile is looked up there. Without one,
/// `--profile` names a built-in template; with neither, defaults apply.
pub fn resolve_profile(config: Option<&Path>, profile: Option<&str>) -> Result<ProfileConfig> {
    match (config, profile) {
        (Some(path), name) => {
            let file = ConfigFile::load(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            Ok(file.profile(name))
        }
        (None, Some(name)) => Ok(templates::get(name)?),
        (None, None) => Ok(ProfileConfig::default()),
    }
}

pub fn validate(cli: &Cli, args: &ValidateArgs) -> Result<()> {
    let profile = resolve_profile(cli.config.as_deref(), cli.profile.as_deref())?;

    let options = LoadOptions::from(&profile.preprocessing);
    let document = load_document(&args.document, &options)
        .with_context(|| format!("Failed to load {}", args.document.display()))?;
    let claims = StaticClaimSource::from_file(&args.claims)
        .with_context(|| format!("Failed to read claims from {}", args.claims.display()))?;

    let mut validator = GroundingValidator::new(profile.validation.clone());
    if let Some(strictness) = args.strictness {
        validator.set_strictness(strictness);
    }
    if let Some(threshold) = args.threshold {
        validator.set_threshold(threshold);
    }

    let claims = claims.into_claims();
    let outcome = validator.validate(&document.text, &claims);
    let report = DocumentReport::new(
        document.name.clone(),
        claims,
        outcome,
        document.text.len(),
        profile.model_id.clone(),
    );

    println!("{}", serde_json::to_string_pretty(&report)?);

    if let Some(output) = &args.output {
        let batch = BatchReport {
            reports: vec![report],
            failures: Vec::new(),
            settings: validator.settings(),
        };
        let written = ReportWriter::new(output).write(&batch)?;
        info!(files = written.len(), dir = %output.display(), "Reports saved");
    }

    Ok(())
}

pub async fn batch(cli: &Cli, args: &BatchArgs) -> Result<()> {
    let profile = resolve_profile(cli.config.as_deref(), cli.profile.as_deref())?;

    let source: Arc<dyn ClaimSource> = match &args.claims_dir {
        Some(dir) => Arc::new(SidecarClaimSource::in_directory(dir)),
        None => Arc::new(SidecarClaimSource::new()),
    };
    let config = RuntimeConfig::from_profile(&profile).with_concurrency(args.concurrency);
    let validator = BatchValidator::new(SharedValidator::from_config(profile.validation), source, config);

    let report = validator
        .run_path(&args.path)
        .await
        .with_context(|| format!("Batch validation of {} failed", args.path.display()))?;

    if report.reports.is_empty() && report.failures.is_empty() {
        println!("No documents found in {}", args.path.display());
        return Ok(());
    }

    let output = args.output.clone().unwrap_or_else(|| default_output_dir(&args.path));
    ReportWriter::new(&output).write(&report)?;

    print!("{}", format_batch(&report, &output));
    Ok(())
}

pub fn summarize(args: &SummarizeArgs) -> Result<()> {
    let contents = fs::read_to_string(&args.report)
        .with_context(|| format!("Failed to read {}", args.report.display()))?;
    let report = DocumentReport::from_json_str(&contents)
        .with_context(|| format!("{} is not a document report", args.report.display()))?;

    let summary = ValidationSummary::from_counts(&report.match_counts);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print!("{}", format_summary(&report.file, &summary));
    }
    Ok(())
}

pub fn config_show(cli: &Cli, profile: Option<&str>) -> Result<()> {
    let name = profile.or(cli.profile.as_deref());
    let resolved = resolve_profile(cli.config.as_deref(), name)?;
    print!("{}", serde_yaml::to_string(&resolved)?);
    Ok(())
}

pub fn config_create(name: &str, template: &str, dir: &Path) -> Result<PathBuf> {
    let profile = templates::get(template)?;
    let path = dir.join(format!("{}.yaml", name));
    if path.exists() {
        bail!("{} already exists", path.display());
    }

    ConfigFile::Single(profile)
        .save(&path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Created {} from template '{}'", path.display(), template);
    Ok(path)
}

pub fn list_templates(args: &TemplatesArgs) -> Result<()> {
    println!("Available templates:");
    for name in templates::NAMES {
        println!("  - {}", name);
    }

    let configs = config_files(&args.dir)?;
    if !configs.is_empty() {
        println!("\nConfiguration files in {}:", args.dir.display());
        for name in configs {
            println!("  - {}", name);
        }
    }
    Ok(())
}

/// Stems of the configuration files in `dir`, sorted. A missing directory has none.
fn config_files(dir: &Path) -> Result<Vec<String>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut names = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("Failed to list {}", dir.display()))? {
        let path = entry?.path();
        let is_config = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml" | "yml" | "json" | "toml")
        );
        if is_config {
            if let Some(stem) = path.file_stem() {
                names.push(stem.to_string_lossy().into_owned());
            }
        }
    }
    names.sort();
    Ok(names)
}

fn default_output_dir(path: &Path) -> PathBuf {
    if path.is_dir() {
        path.join("analysis")
    } else {
        path.parent()
            .map(|p| p.join("analysis"))
            .unwrap_or_else(|| PathBuf::from("analysis"))
    }
}

fn format_summary(file: &str, summary: &ValidationSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", file);
    for (category, s) in &summary.categories {
        let _ = writeln!(
            out,
            "  {:<20} {:>4}/{:<4} verified ({:.1}%)",
            category,
            s.verified,
            s.total,
            s.verification_rate * 100.0
        );
    }
    let _ = writeln!(
        out,
        "  {:<20} {:>4}/{:<4} verified ({:.1}%)",
        "overall",
        summary.overall.verified,
        summary.overall.total,
        summary.overall.verification_rate * 100.0
    );
    out
}

fn format_batch(report: &BatchReport, output: &Path) -> String {
    let mut out = String::new();
    for doc in &report.reports {
        out.push_str(&format_summary(&doc.file, &doc.summary));
    }
    for failure in &report.failures {
        let _ = writeln!(out, "{}\n  failed: {}", failure.file, failure.error);
    }

    let overall = report.overall_summary().overall;
    let _ = writeln!(
        out,
        "\n{} documents, {} failed, {}/{} claims verified. Reports in {}",
        report.reports.len() + report.failures.len(),
        report.failures.len(),
        overall.verified,
        overall.total,
        output.display()
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use claimcheck_core::{ClaimSet, Strictness};

    #[test]
    fn test_resolve_profile_defaults() {
        let profile = resolve_profile(None, None).unwrap();
        assert_eq!(profile.validation.threshold, 0.5);
        assert!(profile.model_id.is_none());
    }

    #[test]
    fn test_resolve_profile_template() {
        let profile = resolve_profile(None, Some("medical")).unwrap();
        assert_eq!(profile.validation.strictness, Strictness::Strict);
        assert!(resolve_profile(None, Some("nope")).is_err());
    }

    #[test]
    fn test_create_then_resolve() {
        let dir = tempfile::tempdir().unwrap();
        let path = config_create("acme", "medical", dir.path()).unwrap();
        assert_eq!(path, dir.path().join("acme.yaml"));

        let profile = resolve_profile(Some(path.as_path()), None).unwrap();
        assert_eq!(profile, templates::medical());

        assert!(config_create("acme", "medical", dir.path()).is_err());
        assert_eq!(config_files(dir.path()).unwrap(), vec!["acme"]);
    }

    #[test]
    fn test_config_files_missing_dir() {
        assert!(config_files(Path::new("/no/such/dir")).unwrap().is_empty());
    }

    #[test]
    fn test_format_summary() {
        let text = "Acme Corp signed the lease";
        let claims = ClaimSet::new().with_category("parties", ["Acme Corp", "Globex"]);
        let outcome = GroundingValidator::default().validate(text, &claims);
        let summary = ValidationSummary::from_counts(&outcome.match_counts);

        let out = format_summary("lease.txt", &summary);
        assert!(out.starts_with("lease.txt\n"));
        assert!(out.contains("parties"));
        assert!(out.contains("(50.0%)"));
    }

    #[test]
    fn test_default_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(default_output_dir(dir.path()), dir.path().join("analysis"));
        assert_eq!(
            default_output_dir(&dir.path().join("lease.txt")),
            dir.path().join("analysis")
        );
    }
}
