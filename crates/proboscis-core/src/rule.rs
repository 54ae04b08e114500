//! Rule trait for defining lint rules.

use crate::context::FileContext;
use crate::model::Declaration;
use crate::types::{Severity, Violation};

/// Which files a rule evaluates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleScope {
    /// Public declarations of source modules.
    Source,
    /// Public declarations of test modules.
    Test,
}

/// A per-declaration lint rule.
///
/// The engine resolves visibility, suppression and severity overrides; a
/// rule only decides whether one public declaration is in violation.
///
/// # Example
///
/// ```ignore
/// use proboscis_core::{Declaration, FileContext, Rule, RuleScope, Violation};
///
/// pub struct NoTodoNames;
///
/// impl Rule for NoTodoNames {
///     fn name(&self) -> &'static str { "no-todo-names" }
///     fn code(&self) -> &'static str { "PL900" }
///     fn scope(&self) -> RuleScope { RuleScope::Source }
///
///     fn check(&self, ctx: &FileContext, decl: &Declaration) -> Option<Violation> {
///         decl.simple_name.contains("todo").then(|| /* ... */ todo!())
///     }
/// }
/// ```
pub trait Rule: Send + Sync {
    /// Returns the kebab-case name of this rule (e.g., "require-unit-test").
    fn name(&self) -> &'static str;

    /// Returns the rule code (e.g., "PL001").
    fn code(&self) -> &'static str;

    /// Returns a brief description of what this rule checks.
    fn description(&self) -> &'static str {
        ""
    }

    /// Returns the default severity for violations from this rule.
    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    /// Returns which files this rule evaluates.
    fn scope(&self) -> RuleScope;

    /// Checks one public declaration.
    ///
    /// # Arguments
    ///
    /// * `ctx` - Context about the file being checked
    /// * `decl` - A public declaration of that file
    fn check(&self, ctx: &FileContext, decl: &Declaration) -> Option<Violation>;
}

/// Type alias for boxed Rule trait objects.
pub type RuleBox = Box<dyn Rule>;
