//! Command-line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use claimcheck_core::Strictness;

#[derive(Parser, Debug)]
#[command(name = "claimcheck")]
#[command(about = "Check model-extracted claims against the documents they came from", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Configuration file (.yaml, .yml, .json or .toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Profile in the configuration file, or a built-in template name
    #[arg(long, global = true)]
    pub profile: Option<String>,

    /// Verbose output (debug level logging)
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Quiet mode (errors only)
    #[arg(long, short, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate the claims for one document
    Validate(ValidateArgs),

    /// Validate every document in a directory using sidecar claim files
    Batch(BatchArgs),

    /// Print the verification summary of a saved document report
    Summarize(SummarizeArgs),

    /// Configuration commands
    #[command(subcommand)]
    Config(ConfigCommands),

    /// List built-in templates and configuration files
    Templates(TemplatesArgs),
}

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Document to validate against
    pub document: PathBuf,

    /// JSON file of claims, keyed by category
    #[arg(long)]
    pub claims: PathBuf,

    /// Strictness profile (lenient, moderate, strict)
    #[arg(long, short)]
    pub strictness: Option<Strictness>,

    /// Confidence threshold (0.0 to 1.0), applied after strictness
    #[arg(long, short, value_parser = parse_threshold)]
    pub threshold: Option<f64>,

    /// Also write reports to this directory
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct BatchArgs {
    /// Document or directory of documents
    pub path: PathBuf,

    /// Directory holding `<stem>.claims.json` files (default: next to each document)
    #[arg(long)]
    pub claims_dir: Option<PathBuf>,

    /// Report directory (default: `<path>/analysis`)
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Documents validated at the same time
    #[arg(long, default_value_t = 4)]
    pub concurrency: usize,
}

#[derive(Args, Debug)]
pub struct SummarizeArgs {
    /// A `<stem>_analysis.json` report
    pub report: PathBuf,

    /// Print the summary as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the resolved configuration
    Show {
        /// Profile or template name (overrides --profile)
        profile: Option<String>,
    },

    /// Create a configuration file from a template
    Create {
        /// Name of the new configuration file (without extension)
        name: String,

        /// Template to start from
        #[arg(long, short, default_value = "legal")]
        template: String,

        /// Directory to write into
        #[arg(long, short, default_value = "config")]
        dir: PathBuf,
    },
}

#[derive(Args, Debug)]
pub struct TemplatesArgs {
    /// Directory to look for configuration files in
    #[arg(long, short, default_value = "config")]
    pub dir: PathBuf,
}

fn parse_threshold(s: &str) -> Result<f64, String> {
    let value: f64 = s.parse().map_err(|_| format!("`{}` is not a number", s))?;
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("threshold must be between 0.0 and 1.0, got {}", value))
    }
}
