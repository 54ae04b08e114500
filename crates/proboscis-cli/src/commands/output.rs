//! Shared output formatting for lint results.

use anyhow::Result;
use proboscis_core::utils::display_relative;
use proboscis_core::{FixKind, LintResult, ReportFormat, Severity, Violation};
use serde::Serialize;
use std::fmt::{self, Write};
use std::path::Path;

/// Print lint results in the specified format. Text and compact output show
/// paths relative to `root`; JSON keeps them as discovered.
pub fn print(result: &LintResult, format: ReportFormat, root: &Path) -> Result<()> {
    print!("{}", render(result, format, root)?);
    Ok(())
}

/// Renders lint results in the specified format.
pub fn render(result: &LintResult, format: ReportFormat, root: &Path) -> Result<String> {
    Ok(match format {
        ReportFormat::Text => render_text(result, root)?,
        ReportFormat::Json => render_json(result)? + "\n",
        ReportFormat::Compact => render_compact(result, root)?,
    })
}

fn render_text(result: &LintResult, root: &Path) -> Result<String, fmt::Error> {
    let mut out = String::new();

    for skipped in &result.skipped {
        writeln!(
            out,
            "\x1b[33mskipped\x1b[0m {}: {}",
            display_relative(root, &skipped.path),
            skipped.reason
        )?;
    }
    if !result.skipped.is_empty() {
        out.push('\n');
    }

    if result.violations.is_empty() {
        writeln!(
            out,
            "\x1b[32mNo test coverage issues found in {} file(s)\x1b[0m",
            result.files_checked
        )?;
        return Ok(out);
    }

    for violation in &result.violations {
        let severity_indicator = match violation.severity {
            Severity::Error => "\x1b[31merror\x1b[0m",
            Severity::Warning => "\x1b[33mwarning\x1b[0m",
        };

        writeln!(
            out,
            "{} at {}:{}",
            violation.rule_name(),
            display_relative(root, &violation.location.file),
            violation.location.line,
        )?;
        let mut lines = violation.message.lines();
        writeln!(out, "  {}: {}", severity_indicator, lines.next().unwrap_or_default())?;
        for line in lines {
            writeln!(out, "  {line}")?;
        }
        if let Some(fix) = &violation.fix {
            writeln!(out, "  = fix: {} `{}` at line {}", fix.kind, fix.content, fix.line)?;
        }
        out.push('\n');
    }

    let (errors, warnings) = result.count_by_severity();
    let summary_color = if errors > 0 { "\x1b[31m" } else { "\x1b[33m" };
    writeln!(
        out,
        "{}Found {} error(s), {} warning(s) in {} file(s)\x1b[0m",
        summary_color, errors, warnings, result.files_checked
    )?;
    out.push_str("Tip: add `# noqa: <RULE>` to a declaration line to suppress a finding.\n");
    Ok(out)
}

#[derive(Serialize)]
struct JsonReport<'a> {
    total_violations: usize,
    violations: Vec<JsonViolation<'a>>,
    skipped: Vec<JsonSkipped<'a>>,
}

#[derive(Serialize)]
struct JsonViolation<'a> {
    rule_name: String,
    file_path: String,
    line_number: usize,
    function_name: &'a str,
    message: &'a str,
    severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    fix_type: Option<FixKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    fix_content: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    fix_line: Option<usize>,
}

#[derive(Serialize)]
struct JsonSkipped<'a> {
    file_path: String,
    reason: &'a str,
}

impl<'a> JsonViolation<'a> {
    fn new(violation: &'a Violation) -> Self {
        let fix = violation.fix.as_ref();
        Self {
            rule_name: violation.rule_name(),
            file_path: violation.location.file.display().to_string(),
            line_number: violation.location.line,
            function_name: &violation.function_name,
            message: &violation.message,
            severity: violation.severity,
            fix_type: fix.map(|f| f.kind),
            fix_content: fix.map(|f| f.content.as_str()),
            fix_line: fix.map(|f| f.line),
        }
    }
}

fn render_json(result: &LintResult) -> Result<String> {
    let report = JsonReport {
        total_violations: result.violations.len(),
        violations: result
            .violations
            .iter()
            .map(JsonViolation::new)
            .collect(),
        skipped: result
            .skipped
            .iter()
            .map(|s| JsonSkipped {
                file_path: s.path.display().to_string(),
                reason: &s.reason,
            })
            .collect(),
    };
    Ok(serde_json::to_string_pretty(&report)?)
}

fn render_compact(result: &LintResult, root: &Path) -> Result<String, fmt::Error> {
    let mut out = String::new();
    for violation in &result.violations {
        writeln!(
            out,
            "{}:{}: {} [{}] {}",
            display_relative(root, &violation.location.file),
            violation.location.line,
            violation.severity,
            violation.code,
            violation.headline(),
        )?;
    }
    Ok(out)
}
