//! Rule requiring pytest tier markers on tests.
//!
//! # Rationale
//!
//! Tier markers let `pytest -m unit` select exactly the tests stored under
//! `test/unit/`. A test placed in a tier directory without the matching
//! marker silently drops out of that selection.
//!
//! # Detected Patterns
//!
//! ```text
//! # test/unit/test_calc.py
//! def test_divide():          # missing @pytest.mark.unit
//!     ...
//! ```
//!
//! Both `@pytest.mark.unit` and the short `@mark.unit` form are accepted,
//! with or without call parentheses. Tests directly under a test directory
//! have no tier and are not checked.

use proboscis_core::{
    Declaration, FileContext, Fix, Location, Rule, RuleScope, Severity, Tier, Violation,
};

/// Rule code for require-test-markers.
pub const CODE: &str = "PL004";

/// Rule name for require-test-markers.
pub const NAME: &str = "require-test-markers";

/// Requires `@pytest.mark.<tier>` on tests inside tier directories.
#[derive(Debug, Clone)]
pub struct RequireTestMarkers {
    /// Custom severity.
    pub severity: Severity,
}

impl Default for RequireTestMarkers {
    fn default() -> Self {
        Self::new()
    }
}

impl RequireTestMarkers {
    /// Creates a new rule with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            severity: Severity::Error,
        }
    }

    /// Sets the severity level.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }
}

/// pytest only collects functions whose name starts with `test`.
fn is_test_function(decl: &Declaration) -> bool {
    decl.simple_name.starts_with("test")
}

impl Rule for RequireTestMarkers {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Requires pytest markers matching the test's tier directory"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn scope(&self) -> RuleScope {
        RuleScope::Test
    }

    fn check(&self, ctx: &FileContext, decl: &Declaration) -> Option<Violation> {
        let tier = ctx.tier.filter(|t| *t != Tier::General)?;
        if !is_test_function(decl) || decl.markers().contains(tier.as_str()) {
            return None;
        }

        let decorator = format!("@pytest.mark.{tier}");
        let message = format!(
            "[{CODE}] Test function '{}' is missing required pytest marker.\nExpected: {decorator}",
            decl.simple_name
        );
        Some(
            Violation::new(
                CODE,
                NAME,
                self.severity,
                Location::new(ctx.module.path.clone(), decl.line, decl.column),
                decl.qualified_name.clone(),
                message,
            )
            .with_fix(Fix::add_decorator(decorator, decl.stack_start_line())),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proboscis_core::{Config, Decorator, FixKind, Module, TestIndex};
    use std::path::Path;

    fn check(decl: Declaration, tier: Tier) -> Option<Violation> {
        let module = Module::new("/proj/test/unit/test_calc.py").with_declaration(decl);
        let index = TestIndex::default();
        let config = Config::default();
        let ctx = FileContext::test(&module, tier, Path::new("/proj"), &index, &config);
        RequireTestMarkers::new().check(&ctx, &module.declarations[0])
    }

    #[test]
    fn test_missing_marker_carries_fix_at_stack_top() {
        let decl = Declaration::function("test_divide", 5)
            .with_decorator(Decorator::new(4, "@pytest.mark.slow"));
        let v = check(decl, Tier::Unit).unwrap();
        assert_eq!(v.rule_name(), "PL004:require-test-markers");
        let fix = v.fix.unwrap();
        assert_eq!(fix.kind, FixKind::AddDecorator);
        assert_eq!(fix.content, "@pytest.mark.unit");
        assert_eq!(fix.line, 4);
        insta::assert_snapshot!(v.message, @r"
        [PL004] Test function 'test_divide' is missing required pytest marker.
        Expected: @pytest.mark.unit
        ");
    }

    #[test]
    fn test_marker_forms_are_accepted() {
        for text in ["@pytest.mark.integration", "@mark.integration", "@pytest.mark.integration()"] {
            let decl = Declaration::function("test_x", 2).with_decorator(Decorator::new(1, text));
            assert!(check(decl, Tier::Integration).is_none(), "{text}");
        }
    }

    #[test]
    fn test_wrong_tier_marker_is_reported() {
        let decl = Declaration::function("test_x", 2)
            .with_decorator(Decorator::new(1, "@pytest.mark.unit"));
        let v = check(decl, Tier::E2E).unwrap();
        assert!(v.message.ends_with("Expected: @pytest.mark.e2e"));
    }

    #[test]
    fn test_general_tier_and_helpers_are_skipped() {
        assert!(check(Declaration::function("test_x", 1), Tier::General).is_none());
        assert!(check(Declaration::function("make_fixture", 1), Tier::Unit).is_none());
    }

    #[test]
    fn test_source_context_is_skipped() {
        let module = Module::new("/proj/src/a.py").with_declaration(Declaration::function("test_x", 1));
        let index = TestIndex::default();
        let config = Config::default();
        let ctx = FileContext::source(&module, Path::new("/proj"), &index, &config);
        assert!(RequireTestMarkers::new().check(&ctx, &module.declarations[0]).is_none());
    }
}
