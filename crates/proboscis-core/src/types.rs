//! Core types for lint violations and results.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Severity level for lint violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Warning that should be addressed.
    Warning,
    /// Error that must be fixed.
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "warning" | "warn" => Ok(Self::Warning),
            "error" => Ok(Self::Error),
            other => Err(format!("unknown severity '{other}'")),
        }
    }
}

/// Source code location.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    /// Absolute path of the file.
    pub file: PathBuf,
    /// Line number (1-indexed).
    pub line: usize,
    /// Column number (1-indexed).
    pub column: usize,
}

impl Location {
    /// Creates a new location with explicit values.
    #[must_use]
    pub fn new(file: PathBuf, line: usize, column: usize) -> Self {
        Self { file, line, column }
    }
}

/// Kind of automatic fix attached to a violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FixKind {
    /// Insert a decorator line on top of a function's decorator stack.
    AddDecorator,
}

impl std::fmt::Display for FixKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AddDecorator => write!(f, "add_decorator"),
        }
    }
}

/// Machine-applicable fix descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fix {
    /// What kind of edit to perform.
    pub kind: FixKind,
    /// Text to insert (without indentation).
    pub content: String,
    /// 1-indexed line the edit targets.
    pub line: usize,
}

impl Fix {
    /// Creates an `AddDecorator` fix targeting `line`.
    #[must_use]
    pub fn add_decorator(content: impl Into<String>, line: usize) -> Self {
        Self {
            kind: FixKind::AddDecorator,
            content: content.into(),
            line,
        }
    }
}

/// A lint violation found during analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Rule code (e.g., "PL001").
    pub code: String,
    /// Rule label (e.g., "require-unit-test").
    pub rule: String,
    /// Severity of this violation.
    pub severity: Severity,
    /// Location of the offending declaration.
    pub location: Location,
    /// Qualified name of the offending declaration.
    pub function_name: String,
    /// Human-readable message.
    pub message: String,
    /// Optional automatic fix.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fix: Option<Fix>,
}

impl Violation {
    /// Creates a new violation.
    #[must_use]
    pub fn new(
        code: impl Into<String>,
        rule: impl Into<String>,
        severity: Severity,
        location: Location,
        function_name: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            rule: rule.into(),
            severity,
            location,
            function_name: function_name.into(),
            message: message.into(),
            fix: None,
        }
    }

    /// Attaches a fix descriptor to this violation.
    #[must_use]
    pub fn with_fix(mut self, fix: Fix) -> Self {
        self.fix = Some(fix);
        self
    }

    /// Composite rule name, e.g. `PL001:require-unit-test`.
    #[must_use]
    pub fn rule_name(&self) -> String {
        format!("{}:{}", self.code, self.rule)
    }

    /// First message line without the leading `[CODE]` tag.
    #[must_use]
    pub fn headline(&self) -> &str {
        let first = self.message.lines().next().unwrap_or_default();
        first
            .strip_prefix('[')
            .and_then(|rest| rest.strip_prefix(self.code.as_str()))
            .and_then(|rest| rest.strip_prefix("] "))
            .unwrap_or(first)
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}:{}: {} [{}] {}",
            self.location.file.display(),
            self.location.line,
            self.location.column,
            self.severity,
            self.code,
            self.headline()
        )
    }
}

/// A file the engine could not evaluate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedFile {
    /// Path of the skipped file.
    pub path: PathBuf,
    /// Why it was skipped.
    pub reason: String,
}

/// Result of running lint analysis.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct LintResult {
    /// All violations found, in emission order.
    pub violations: Vec<Violation>,
    /// Files that failed to read or parse.
    pub skipped: Vec<SkippedFile>,
    /// Number of files evaluated.
    pub files_checked: usize,
}

impl LintResult {
    /// Creates a new empty result.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if there are any errors.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.violations
            .iter()
            .any(|v| v.severity == Severity::Error)
    }

    /// Returns true if any violation was found.
    #[must_use]
    pub fn has_violations(&self) -> bool {
        !self.violations.is_empty()
    }

    /// Returns violations emitted by a given rule code.
    #[must_use]
    pub fn by_code(&self, code: &str) -> Vec<&Violation> {
        self.violations.iter().filter(|v| v.code == code).collect()
    }

    /// Counts violations by severity as `(errors, warnings)`.
    #[must_use]
    pub fn count_by_severity(&self) -> (usize, usize) {
        let errors = self
            .violations
            .iter()
            .filter(|v| v.severity == Severity::Error)
            .count();
        (errors, self.violations.len() - errors)
    }

    /// Returns violations that carry a fix descriptor.
    #[must_use]
    pub fn fixable(&self) -> Vec<&Violation> {
        self.violations.iter().filter(|v| v.fix.is_some()).collect()
    }
}
