//! Shared check for the per-tier coverage rules (PL001-PL003).

use proboscis_core::{
    expected_test_name, DeclKind, Declaration, FileContext, Location, Severity, Tier,
    Violation,
};
use tracing::trace;

/// Settings common to the tier coverage rules.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TierRule {
    pub code: &'static str,
    pub name: &'static str,
    pub tier: Tier,
    pub severity: Severity,
    pub ignore_protocols: bool,
}

impl TierRule {
    pub(crate) fn check(&self, ctx: &FileContext, decl: &Declaration) -> Option<Violation> {
        let ignore_protocols = ctx
            .rule_config(self.code, self.name)
            .map_or(self.ignore_protocols, |c| {
                c.get_bool("ignore_protocols", self.ignore_protocols)
            });
        if ignore_protocols && ctx.module.class_of(decl).is_some_and(|c| c.is_protocol) {
            trace!("{} skips protocol method {}", self.code, decl.qualified_name);
            return None;
        }

        if ctx.tests.has_test(decl, self.tier) {
            return None;
        }

        let subject = match (&decl.kind, ctx.module.class_of(decl)) {
            (DeclKind::Method, Some(class)) => {
                format!("Method '{}' of class '{}'", decl.simple_name, class.name)
            }
            _ => format!("Function '{}'", decl.simple_name),
        };
        let expected_file = ctx.expected_test_file(self.tier);
        let message = format!(
            "[{}] {subject} has no {} test found.\nExpected test function: {}\nIn test file: {expected_file}",
            self.code,
            self.tier,
            expected_test_name(decl),
            expected_file = expected_file.display(),
        );

        Some(Violation::new(
            self.code,
            self.name,
            self.severity,
            Location::new(ctx.module.path.clone(), decl.line, decl.column),
            decl.qualified_name.clone(),
            message,
        ))
    }
}
