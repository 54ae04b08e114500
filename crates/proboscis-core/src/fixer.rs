//! Applies fix descriptors back into source files.
//!
//! Edits for a file are planned first, then applied to an in-memory line
//! buffer in descending line order so earlier insertions never shift later
//! targets, and the file is written once.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::types::{Fix, FixKind, Violation};

/// One planned insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    /// 0-indexed line the text is inserted before.
    pub index: usize,
    /// Full line to insert, including indentation but no line ending.
    pub text: String,
}

/// A file whose fixes could not be applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FixFailure {
    /// File that failed.
    pub path: PathBuf,
    /// What went wrong.
    pub message: String,
}

/// Outcome of applying fixes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FixReport {
    /// Number of fixes applied per file.
    pub applied: BTreeMap<PathBuf, usize>,
    /// Files that could not be read or written.
    pub failures: Vec<FixFailure>,
}

impl FixReport {
    /// Total fixes applied across all files.
    #[must_use]
    pub fn total(&self) -> usize {
        self.applied.values().sum()
    }
}

/// Plans decorator insertions for `lines` (without line endings).
///
/// Each fix lands above the whole decorator stack that contains its target
/// line, indented like the target line. Duplicate fixes collapse into one
/// edit. The result is sorted by descending insertion point.
#[must_use]
pub fn plan_edits(lines: &[&str], fixes: &[&Fix]) -> Vec<Edit> {
    let mut edits: Vec<Edit> = Vec::new();

    for fix in fixes {
        if fix.kind != FixKind::AddDecorator {
            continue;
        }
        let Some(target) = fix.line.checked_sub(1).filter(|&i| i < lines.len()) else {
            warn!("Fix target line {} is out of range", fix.line);
            continue;
        };

        let mut index = target;
        while index > 0 && lines[index - 1].trim_start().starts_with('@') {
            index -= 1;
        }

        let line = lines[index];
        let indent = &line[..line.len() - line.trim_start().len()];
        let edit = Edit {
            index,
            text: format!("{indent}{}", fix.content.trim()),
        };
        if !edits.contains(&edit) {
            edits.push(edit);
        }
    }

    edits.sort_by(|a, b| b.index.cmp(&a.index));
    edits
}

/// Applies edits produced by [`plan_edits`] to a line buffer whose entries
/// keep their line endings.
pub fn apply_edits(lines: &mut Vec<String>, edits: &[Edit]) {
    for edit in edits {
        let ending = lines
            .get(edit.index)
            .map_or("\n", |l| if l.ends_with("\r\n") { "\r\n" } else { "\n" });
        lines.insert(edit.index, format!("{}{ending}", edit.text));
    }
}

/// Applies fix descriptors to files on disk.
///
/// Not safe to run concurrently with another lint or fix pass over the same
/// files.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoFixer;

impl AutoFixer {
    /// Creates a fixer.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Applies every fix carried by `violations`.
    ///
    /// I/O failures are recorded per file in the report; other files are
    /// still fixed.
    #[must_use]
    pub fn apply(&self, violations: &[Violation]) -> FixReport {
        let mut by_file: BTreeMap<&Path, Vec<&Fix>> = BTreeMap::new();
        for violation in violations {
            if let Some(fix) = &violation.fix {
                by_file
                    .entry(violation.location.file.as_path())
                    .or_default()
                    .push(fix);
            }
        }

        let mut report = FixReport::default();
        for (path, fixes) in by_file {
            match Self::fix_file(path, &fixes) {
                Ok(0) => debug!("No applicable fixes in {}", path.display()),
                Ok(count) => {
                    info!("Fixed {} issue(s) in {}", count, path.display());
                    report.applied.insert(path.to_path_buf(), count);
                }
                Err(e) => {
                    warn!("Failed to fix {}: {}", path.display(), e);
                    report.failures.push(FixFailure {
                        path: path.to_path_buf(),
                        message: e.to_string(),
                    });
                }
            }
        }
        report
    }

    fn fix_file(path: &Path, fixes: &[&Fix]) -> std::io::Result<usize> {
        let content = std::fs::read_to_string(path)?;
        let mut buffer: Vec<String> = content.split_inclusive('\n').map(String::from).collect();
        let bare: Vec<&str> = buffer
            .iter()
            .map(|l| l.trim_end_matches(['\n', '\r']))
            .collect();

        let edits = plan_edits(&bare, fixes);
        if edits.is_empty() {
            return Ok(0);
        }
        apply_edits(&mut buffer, &edits);
        std::fs::write(path, buffer.concat())?;
        Ok(edits.len())
    }
}
