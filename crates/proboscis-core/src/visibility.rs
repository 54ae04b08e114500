//! Public API resolution.
//!
//! Precedence, highest first:
//!
//! 1. Dunder methods are never evaluated.
//! 2. A literal `__all__` decides for top-level names. Listed names are
//!    public even with a leading underscore; unlisted names are private.
//! 3. Without `__all__`, underscore-prefixed names are private unless
//!    strict mode is on.
//!
//! A method is public only if every class around it is public. `__all__`
//! lists top-level names, so it never applies to method or nested class
//! names; those always follow the underscore convention.

use crate::model::{DeclKind, Declaration, Module};

/// Decides which declarations of a module are public API.
#[derive(Debug, Clone, Copy, Default)]
pub struct VisibilityResolver {
    strict_mode: bool,
}

impl VisibilityResolver {
    /// Creates a resolver.
    #[must_use]
    pub fn new(strict_mode: bool) -> Self {
        Self { strict_mode }
    }

    /// Returns true if strict mode is on.
    #[must_use]
    pub fn strict_mode(&self) -> bool {
        self.strict_mode
    }

    /// Returns the public declarations of `module`, in source order.
    #[must_use]
    pub fn resolve<'m>(&self, module: &'m Module) -> Vec<&'m Declaration> {
        module
            .declarations
            .iter()
            .filter(|decl| self.is_public(module, decl))
            .collect()
    }

    /// Returns true if `decl` is public API of `module`.
    #[must_use]
    pub fn is_public(&self, module: &Module, decl: &Declaration) -> bool {
        if decl.is_dunder() {
            return false;
        }
        match decl.kind {
            DeclKind::Function => self.top_level_public(module, &decl.simple_name),
            DeclKind::Method => {
                let Some(class) = decl.enclosing_class.as_deref() else {
                    return self.top_level_public(module, &decl.simple_name);
                };
                self.class_chain_public(module, class) && self.by_convention(&decl.simple_name)
            }
        }
    }

    fn class_chain_public(&self, module: &Module, qualified_class: &str) -> bool {
        let mut segments = qualified_class.split('.');
        let Some(outermost) = segments.next() else {
            return false;
        };
        self.top_level_public(module, outermost) && segments.all(|inner| self.by_convention(inner))
    }

    fn top_level_public(&self, module: &Module, name: &str) -> bool {
        match &module.exported_names {
            Some(exports) => exports.contains(name),
            None => self.by_convention(name),
        }
    }

    fn by_convention(&self, name: &str) -> bool {
        self.strict_mode || !name.starts_with('_')
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ClassInfo;

    fn names(resolver: VisibilityResolver, module: &Module) -> Vec<String> {
        resolver
            .resolve(module)
            .into_iter()
            .map(|d| d.qualified_name.clone())
            .collect()
    }

    fn mixed_module() -> Module {
        Module::new("/proj/src/mod.py")
            .with_class(ClassInfo::new("Public", 1))
            .with_class(ClassInfo::new("_Hidden", 10))
            .with_declaration(Declaration::method("Public", "__init__", 2))
            .with_declaration(Declaration::method("Public", "run", 4))
            .with_declaration(Declaration::method("Public", "_step", 6))
            .with_declaration(Declaration::method("_Hidden", "go", 11))
            .with_declaration(Declaration::function("helper", 20))
            .with_declaration(Declaration::function("_private", 22))
    }

    #[test]
    fn test_convention_without_all() {
        let module = mixed_module();
        assert_eq!(
            names(VisibilityResolver::new(false), &module),
            vec!["Public.run", "helper"]
        );
    }

    #[test]
    fn test_strict_mode_includes_underscore_names_but_not_dunders() {
        let module = mixed_module();
        assert_eq!(
            names(VisibilityResolver::new(true), &module),
            vec!["Public.run", "Public._step", "_Hidden.go", "helper", "_private"]
        );
    }

    #[test]
    fn test_all_overrides_convention() {
        let module = Module::new("/proj/src/mod.py")
            .with_declaration(Declaration::function("foo", 1))
            .with_declaration(Declaration::function("_bar", 2))
            .with_declaration(Declaration::function("baz", 3))
            .with_exports(["foo"]);
        assert_eq!(names(VisibilityResolver::new(false), &module), vec!["foo"]);
        assert_eq!(names(VisibilityResolver::new(true), &module), vec!["foo"]);
    }

    #[test]
    fn test_all_can_export_underscore_names() {
        let module = Module::new("/proj/src/mod.py")
            .with_declaration(Declaration::function("_bar", 2))
            .with_exports(["_bar"]);
        assert_eq!(names(VisibilityResolver::new(false), &module), vec!["_bar"]);
    }

    #[test]
    fn test_empty_all_means_nothing_public() {
        let module = mixed_module().with_exports(Vec::<String>::new());
        assert!(VisibilityResolver::new(false).resolve(&module).is_empty());
        assert!(VisibilityResolver::new(true).resolve(&module).is_empty());
    }

    #[test]
    fn test_methods_follow_exported_class() {
        let module = mixed_module().with_exports(["Public"]);
        assert_eq!(names(VisibilityResolver::new(false), &module), vec!["Public.run"]);
    }

    #[test]
    fn test_method_name_in_all_does_not_expose_private_class() {
        let module = mixed_module().with_exports(["go"]);
        assert!(names(VisibilityResolver::new(false), &module).is_empty());
    }

    #[test]
    fn test_nested_private_class_hides_methods() {
        let module = Module::new("/proj/src/mod.py")
            .with_class(ClassInfo::new("Outer", 1))
            .with_class(ClassInfo::nested("Outer", "_Inner", 2))
            .with_class(ClassInfo::nested("Outer", "Inner", 6))
            .with_declaration(Declaration::method("Outer._Inner", "a", 3))
            .with_declaration(Declaration::method("Outer.Inner", "b", 7));
        assert_eq!(
            names(VisibilityResolver::new(false), &module),
            vec!["Outer.Inner.b"]
        );
    }
}
