//! Check command implementation.

use anyhow::{bail, Context, Result};
use proboscis_core::{AutoFixer, Config, Engine, FileSet, LintResult, ReportFormat, RuleBox};
use proboscis_python::PythonParser;
use proboscis_rules::{all_rules, Preset};
use std::path::{Path, PathBuf};

use crate::config_resolver::ConfigSource;
use crate::{discovery, git};

/// Command-line options of `proboscis check`.
#[derive(Debug, Clone, Default)]
#[allow(clippy::struct_excessive_bools)]
pub struct CheckArgs {
    /// Project directory.
    pub path: PathBuf,
    /// Report format override.
    pub format: Option<ReportFormat>,
    /// Force a failing exit status on violations.
    pub fail_on_error: bool,
    /// Force strict visibility.
    pub strict: bool,
    /// Comma-separated rule ids or names to keep enabled.
    pub rules: Option<String>,
    /// Rule preset; all rules when unset.
    pub preset: Option<Preset>,
    /// Extra exclude globs.
    pub exclude: Vec<String>,
    /// Restrict to files changed in git.
    pub changed_only: bool,
    /// Apply fixes before reporting.
    pub fix: bool,
}

/// What a check run produced.
#[derive(Debug)]
pub struct CheckOutcome {
    /// Final lint result, after fixes when requested.
    pub result: LintResult,
    /// The process should exit with status 1.
    pub failed: bool,
}

/// Runs the check command.
pub fn run(args: &CheckArgs, source: &ConfigSource) -> Result<CheckOutcome> {
    let root = args
        .path
        .canonicalize()
        .with_context(|| format!("Cannot access {}", args.path.display()))?;
    if !root.is_dir() {
        bail!("{} is not a directory", root.display());
    }

    let mut config = source.load()?;
    apply_overrides(&mut config, args);

    let engine = Engine::builder()
        .parser(PythonParser::new())
        .rules(select_rules(args.preset))
        .config(config)
        .build()
        .context("Failed to build engine")?;

    let files = select_files(&root, &engine, args.changed_only)?;

    tracing::info!(
        "Checking {} with {} of {} rules",
        root.display(),
        engine.enabled_rules().count(),
        engine.rule_count()
    );

    let mut result = engine.lint(&files);
    if args.fix {
        result = fix_and_relint(&engine, &files, result);
    }

    super::output::print(&result, engine.config().output_format, &root)?;

    let failed = engine.config().fail_on_error && result.has_violations();
    Ok(CheckOutcome { result, failed })
}

/// Merges command-line options over the file configuration.
fn apply_overrides(config: &mut Config, args: &CheckArgs) {
    if let Some(format) = args.format {
        config.output_format = format;
    }
    if args.fail_on_error {
        config.fail_on_error = true;
    }
    if args.strict {
        config.strict_mode = true;
    }
    config.exclude_patterns.extend(args.exclude.iter().cloned());
    if let Some(filter) = &args.rules {
        restrict_rules(config, filter);
    }
}

/// Disables every rule not named in the comma-separated `filter`.
fn restrict_rules(config: &mut Config, filter: &str) {
    let wanted: Vec<&str> = filter
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    let catalogue = all_rules();

    for name in &wanted {
        if !catalogue.iter().any(|r| r.code() == *name || r.name() == *name) {
            tracing::warn!("Unknown rule: {}", name);
        }
    }
    for rule in &catalogue {
        if !wanted.iter().any(|w| *w == rule.code() || *w == rule.name()) {
            config.set_rule_enabled(rule.code(), false);
        }
    }
}

fn select_rules(preset: Option<Preset>) -> Vec<RuleBox> {
    preset.map_or_else(all_rules, Preset::rules)
}

fn select_files(root: &Path, engine: &Engine, changed_only: bool) -> Result<FileSet> {
    let mut files = discovery::discover(root, engine.config(), engine.extensions())?;
    if !changed_only {
        return Ok(files);
    }

    let changed = git::changed_python_files(root)?;
    if changed.is_empty() {
        tracing::info!("No changed Python files");
        return Ok(FileSet::new(root));
    }
    files.sources.retain(|path| changed.contains(path));
    for test in &mut files.tests {
        test.check_markers = changed.contains(&test.path);
    }
    Ok(files)
}

fn fix_and_relint(engine: &Engine, files: &FileSet, result: LintResult) -> LintResult {
    let report = AutoFixer::new().apply(&result.violations);
    for failure in &report.failures {
        eprintln!("Could not fix {}: {}", failure.path.display(), failure.message);
    }
    if report.total() == 0 {
        return result;
    }
    tracing::info!(
        "Applied {} fix(es) in {} file(s)",
        report.total(),
        report.applied.len()
    );
    engine.lint(files)
}
