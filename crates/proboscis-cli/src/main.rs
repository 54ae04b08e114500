//! proboscis CLI tool.
//!
//! Usage:
//! ```bash
//! proboscis check [OPTIONS] [PATH]
//! proboscis list-rules
//! proboscis init
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use proboscis_core::ReportFormat;
use proboscis_rules::Preset;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod commands;
mod config_resolver;
mod discovery;
mod git;

/// Test-coverage linter for Python projects
#[derive(Parser)]
#[command(name = "proboscis")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that public functions and methods have tests in every tier
    Check {
        /// Project directory to analyze (default: current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Output format: text, json or compact
        #[arg(short, long)]
        format: Option<ReportFormat>,

        /// Exit with status 1 when violations are found
        #[arg(long)]
        fail_on_error: bool,

        /// Treat underscore-prefixed names as public
        #[arg(long)]
        strict: bool,

        /// Only run specific rules (comma-separated ids or names)
        #[arg(long)]
        rules: Option<String>,

        /// Rule preset: strict, recommended or minimal
        #[arg(long)]
        preset: Option<Preset>,

        /// Exclude patterns (can be specified multiple times)
        #[arg(short, long)]
        exclude: Vec<String>,

        /// Only lint files changed in the git working tree
        #[arg(long)]
        changed_only: bool,

        /// Apply automatic fixes, then report what is left
        #[arg(long)]
        fix: bool,
    },

    /// List available rules
    ListRules,

    /// Initialize configuration file
    Init {
        /// Overwrite existing config
        #[arg(long)]
        force: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(2)
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    match cli.command {
        Commands::Check {
            path,
            format,
            fail_on_error,
            strict,
            rules,
            preset,
            exclude,
            changed_only,
            fix,
        } => {
            let args = commands::check::CheckArgs {
                path,
                format,
                fail_on_error,
                strict,
                rules,
                preset,
                exclude,
                changed_only,
                fix,
            };
            let source = config_resolver::resolve(&args.path, cli.config.as_deref());
            let outcome = commands::check::run(&args, &source)?;
            tracing::debug!(
                "{} violation(s), {} skipped file(s)",
                outcome.result.violations.len(),
                outcome.result.skipped.len()
            );
            Ok(if outcome.failed {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            })
        }
        Commands::ListRules => {
            commands::list_rules::run();
            Ok(ExitCode::SUCCESS)
        }
        Commands::Init { force } => {
            commands::init::run(&std::env::current_dir()?, force)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
