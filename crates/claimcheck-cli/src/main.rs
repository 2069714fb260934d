mod cli;
mod commands;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands, ConfigCommands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli);

    match &cli.command {
        Commands::Validate(args) => commands::validate(&cli, args),
        Commands::Batch(args) => commands::batch(&cli, args).await,
        Commands::Summarize(args) => commands::summarize(args),
        Commands::Config(ConfigCommands::Show { profile }) => {
            commands::config_show(&cli, profile.as_deref())
        }
        Commands::Config(ConfigCommands::Create { name, template, dir }) => {
            commands::config_create(name, template, dir).map(|_| ())
        }
        Commands::Templates(args) => commands::list_templates(args),
    }
}

/// `RUST_LOG` wins; otherwise `--quiet` means errors only, `--verbose` debug, default warnings.
fn init_logging(cli: &Cli) {
    let default_level = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "warn"
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
