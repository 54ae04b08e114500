//! Source and test file discovery.
//!
//! Sources are every file with a parser extension (`*.py`) below the
//! project root outside the test directories. Tests are the files inside
//! each configured test directory whose name matches one of the test
//! patterns. Both walks honour `.gitignore` and the configured exclude
//! globs.

use anyhow::{Context, Result};
use ignore::WalkBuilder;
use proboscis_core::{Config, FileSet, TestFile};
use std::path::{Path, PathBuf};

/// Directory names never descended into.
const SKIPPED_DIRS: &[&str] = &["__pycache__", "venv", ".venv", "env", ".env"];

/// Compiled exclude globs, matched against absolute and root-relative paths.
struct Excludes {
    root: PathBuf,
    patterns: Vec<glob::Pattern>,
}

impl Excludes {
    fn new(root: &Path, patterns: &[String]) -> Result<Self> {
        Ok(Self {
            root: root.to_path_buf(),
            patterns: compile(patterns)?,
        })
    }

    fn matches(&self, path: &Path) -> bool {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        self.patterns
            .iter()
            .any(|p| p.matches_path(path) || p.matches_path(relative))
    }
}

fn compile(patterns: &[String]) -> Result<Vec<glob::Pattern>> {
    patterns
        .iter()
        .map(|p| glob::Pattern::new(p).with_context(|| format!("Invalid glob pattern '{p}'")))
        .collect()
}

/// Finds the source and test files of the project rooted at `root`, keeping
/// files whose extension is one of `extensions`.
pub fn discover(root: &Path, config: &Config, extensions: &[&str]) -> Result<FileSet> {
    let excludes = Excludes::new(root, &config.exclude_patterns)?;
    let test_patterns = compile(&config.test_patterns)?;

    let mut files = FileSet::new(root);
    files.sources = source_files(root, extensions, Some(&config.test_directories))?
        .into_iter()
        .filter(|path| !excludes.matches(path))
        .collect();

    for dir in &config.test_directories {
        let test_root = root.join(dir);
        if !test_root.is_dir() {
            continue;
        }
        for path in source_files(&test_root, extensions, None)? {
            let is_test = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|name| test_patterns.iter().any(|p| p.matches(name)));
            if is_test && !excludes.matches(&path) {
                files.tests.push(TestFile::new(path, &test_root));
            }
        }
    }

    tracing::debug!(
        "Discovered {} source and {} test files",
        files.sources.len(),
        files.tests.len()
    );
    Ok(files)
}

/// Walks `root` for files with one of `extensions`, sorted. Top-level
/// directories named in `skip_top_level` are not entered.
fn source_files(
    root: &Path,
    extensions: &[&str],
    skip_top_level: Option<&[String]>,
) -> Result<Vec<PathBuf>> {
    let top_level: Vec<String> = skip_top_level.map(<[String]>::to_vec).unwrap_or_default();

    let mut builder = WalkBuilder::new(root);
    builder
        .hidden(true)
        .git_ignore(true)
        .require_git(false)
        .filter_entry(move |entry| {
            if !entry.file_type().is_some_and(|t| t.is_dir()) {
                return true;
            }
            let name = entry.file_name().to_string_lossy();
            if SKIPPED_DIRS.contains(&&*name) {
                return false;
            }
            !(entry.depth() == 1 && top_level.iter().any(|d| *d == name))
        });

    let mut files = Vec::new();
    for entry in builder.build() {
        let entry = entry.with_context(|| format!("Failed to walk {}", root.display()))?;
        let path = entry.path();
        if entry.file_type().is_some_and(|t| t.is_file())
            && path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| extensions.contains(&e))
        {
            files.push(path.to_path_buf());
        }
    }

    files.sort();
    Ok(files)
}
