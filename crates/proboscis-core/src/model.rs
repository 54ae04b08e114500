//! Declaration model produced by module parsers.
//!
//! A [`Module`] is created once per file per lint pass and is immutable after
//! parsing. Rules, the visibility resolver and the test matcher only ever read
//! it.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

/// Kind of a declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclKind {
    /// Module-level `def`.
    Function,
    /// `def` directly inside a class body.
    Method,
}

/// Rules suppressed by a `noqa` directive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Suppression {
    /// Nothing is suppressed.
    #[default]
    None,
    /// Bare `noqa`: every rule is suppressed.
    All,
    /// Only the listed rule codes are suppressed.
    Rules(BTreeSet<String>),
}

impl Suppression {
    /// Returns true if `code` is suppressed.
    #[must_use]
    pub fn covers(&self, code: &str) -> bool {
        match self {
            Self::None => false,
            Self::All => true,
            Self::Rules(rules) => rules.contains(code),
        }
    }

    /// Returns true if nothing is suppressed.
    #[must_use]
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Combines two suppressions; the result covers everything either covers.
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        match (self, other) {
            (Self::All, _) | (_, Self::All) => Self::All,
            (Self::None, s) | (s, Self::None) => s,
            (Self::Rules(mut a), Self::Rules(b)) => {
                a.extend(b);
                Self::Rules(a)
            }
        }
    }
}

/// A decorator attached to a declaration, in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decorator {
    /// 1-indexed line of the `@`.
    pub line: usize,
    /// Original decorator text including the leading `@` (may span lines).
    pub text: String,
}

impl Decorator {
    /// Creates a decorator record.
    #[must_use]
    pub fn new(line: usize, text: impl Into<String>) -> Self {
        Self {
            line,
            text: text.into(),
        }
    }

    /// The decorated expression with `@`, surrounding whitespace and any call
    /// arguments removed: `@pytest.mark.unit()` becomes `pytest.mark.unit`.
    #[must_use]
    pub fn target(&self) -> &str {
        let expr = self.text.trim().trim_start_matches('@').trim();
        expr.split('(').next().unwrap_or(expr).trim()
    }

    /// Marker name for `@pytest.mark.<name>` or `@mark.<name>` decorators.
    #[must_use]
    pub fn marker(&self) -> Option<&str> {
        let target = self.target();
        let rest = target
            .strip_prefix("pytest.mark.")
            .or_else(|| target.strip_prefix("mark."))?;
        let name = rest.split('.').next().unwrap_or(rest).trim();
        (!name.is_empty()).then_some(name)
    }

    /// Returns the property name if this is a `@<name>.setter`, `.getter` or
    /// `.deleter` accessor decorator.
    #[must_use]
    pub fn property_accessor_of(&self) -> Option<&str> {
        let target = self.target();
        let (owner, accessor) = target.rsplit_once('.')?;
        matches!(accessor, "setter" | "getter" | "deleter").then_some(owner)
    }
}

/// A function or method found in a source or test file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    /// `Class.method` or `function`.
    pub qualified_name: String,
    /// Bare identifier.
    pub simple_name: String,
    /// Function or method.
    pub kind: DeclKind,
    /// Qualified name of the enclosing class (key into [`Module::classes`]).
    pub enclosing_class: Option<String>,
    /// 1-indexed line of the `def` (or `async def`).
    pub line: usize,
    /// 1-indexed column of the `def`.
    pub column: usize,
    /// Decorators immediately above the `def`, outermost first.
    pub decorators: Vec<Decorator>,
    /// Line-scoped `noqa` directives for this declaration.
    pub suppressions: Suppression,
}

impl Declaration {
    /// Creates a module-level function declaration.
    #[must_use]
    pub fn function(name: impl Into<String>, line: usize) -> Self {
        let name = name.into();
        Self {
            qualified_name: name.clone(),
            simple_name: name,
            kind: DeclKind::Function,
            enclosing_class: None,
            line,
            column: 1,
            decorators: Vec::new(),
            suppressions: Suppression::None,
        }
    }

    /// Creates a method declaration inside `class` (a qualified class name).
    #[must_use]
    pub fn method(class: impl Into<String>, name: impl Into<String>, line: usize) -> Self {
        let class = class.into();
        let name = name.into();
        Self {
            qualified_name: format!("{class}.{name}"),
            simple_name: name,
            kind: DeclKind::Method,
            enclosing_class: Some(class),
            line,
            column: 1,
            decorators: Vec::new(),
            suppressions: Suppression::None,
        }
    }

    /// Adds a decorator (builder style).
    #[must_use]
    pub fn with_decorator(mut self, decorator: Decorator) -> Self {
        self.decorators.push(decorator);
        self
    }

    /// Sets line-level suppressions (builder style).
    #[must_use]
    pub fn with_suppressions(mut self, suppressions: Suppression) -> Self {
        self.suppressions = suppressions;
        self
    }

    /// `__name__` style special method.
    #[must_use]
    pub fn is_dunder(&self) -> bool {
        is_dunder(&self.simple_name)
    }

    /// Marker names carried by `@pytest.mark.<name>` / `@mark.<name>`.
    #[must_use]
    pub fn markers(&self) -> BTreeSet<&str> {
        self.decorators.iter().filter_map(Decorator::marker).collect()
    }

    /// First line of the decorator stack, or the `def` line when undecorated.
    #[must_use]
    pub fn stack_start_line(&self) -> usize {
        self.decorators.first().map_or(self.line, |d| d.line)
    }

    /// True if decorated with `@property` (or `functools.cached_property`).
    #[must_use]
    pub fn is_property(&self) -> bool {
        self.decorators
            .iter()
            .any(|d| matches!(d.target(), "property" | "cached_property" | "functools.cached_property"))
    }
}

/// Returns true for `__name__` style identifiers.
#[must_use]
pub fn is_dunder(name: &str) -> bool {
    name.len() > 4 && name.starts_with("__") && name.ends_with("__")
}

/// A class that owns methods.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassInfo {
    /// Bare class name.
    pub name: String,
    /// Dotted name including enclosing classes (`Outer.Inner`).
    pub qualified_name: String,
    /// Qualified name of the enclosing class, for nested classes.
    pub parent: Option<String>,
    /// 1-indexed line of the `class` statement.
    pub line: usize,
    /// Underscore-prefixed class name.
    pub is_private: bool,
    /// Subclasses `typing.Protocol`.
    pub is_protocol: bool,
}

impl ClassInfo {
    /// Creates a top-level class record.
    #[must_use]
    pub fn new(name: impl Into<String>, line: usize) -> Self {
        let name = name.into();
        Self {
            is_private: name.starts_with('_'),
            qualified_name: name.clone(),
            name,
            parent: None,
            line,
            is_protocol: false,
        }
    }

    /// Creates a class nested inside `parent` (a qualified class name).
    #[must_use]
    pub fn nested(parent: &str, name: impl Into<String>, line: usize) -> Self {
        let mut class = Self::new(name, line);
        class.qualified_name = format!("{parent}.{}", class.name);
        class.parent = Some(parent.to_string());
        class
    }

    /// Marks the class as a `Protocol` (builder style).
    #[must_use]
    pub fn protocol(mut self, is_protocol: bool) -> Self {
        self.is_protocol = is_protocol;
        self
    }
}

/// One parsed file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Module {
    /// Absolute path of the file.
    pub path: PathBuf,
    /// Declarations in source order.
    pub declarations: Vec<Declaration>,
    /// Classes keyed by qualified name.
    pub classes: BTreeMap<String, ClassInfo>,
    /// Names from a literal `__all__`; `None` when absent or not a literal.
    pub exported_names: Option<BTreeSet<String>>,
    /// File-scoped `noqa` directive.
    pub file_suppression: Suppression,
}

impl Module {
    /// Creates an empty module for `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Looks up the class enclosing `decl`.
    #[must_use]
    pub fn class_of(&self, decl: &Declaration) -> Option<&ClassInfo> {
        decl.enclosing_class
            .as_deref()
            .and_then(|name| self.classes.get(name))
    }

    /// Returns true if `code` is suppressed for `decl`, either on the
    /// declaration itself or for the whole file.
    #[must_use]
    pub fn is_suppressed(&self, decl: &Declaration, code: &str) -> bool {
        self.file_suppression.covers(code) || decl.suppressions.covers(code)
    }

    /// Registers a class (builder style).
    #[must_use]
    pub fn with_class(mut self, class: ClassInfo) -> Self {
        self.classes.insert(class.qualified_name.clone(), class);
        self
    }

    /// Appends a declaration (builder style).
    #[must_use]
    pub fn with_declaration(mut self, decl: Declaration) -> Self {
        self.declarations.push(decl);
        self
    }

    /// Sets the `__all__` list (builder style).
    #[must_use]
    pub fn with_exports<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exported_names = Some(names.into_iter().map(Into::into).collect());
        self
    }
}

/// Test tier derived from the directory layout under a test root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tier {
    /// `<test dir>/unit/...`
    Unit,
    /// `<test dir>/integration/...`
    Integration,
    /// `<test dir>/e2e/...`
    E2E,
    /// Directly under a test directory, no tier subdirectory.
    General,
}

impl Tier {
    /// The three dedicated tiers, in rule order.
    pub const DEDICATED: [Self; 3] = [Self::Unit, Self::Integration, Self::E2E];

    /// Directory / marker name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unit => "unit",
            Self::Integration => "integration",
            Self::E2E => "e2e",
            Self::General => "general",
        }
    }

    /// Parses a tier subdirectory name.
    #[must_use]
    pub fn from_dir_name(name: &str) -> Option<Self> {
        match name {
            "unit" => Some(Self::Unit),
            "integration" => Some(Self::Integration),
            "e2e" => Some(Self::E2E),
            _ => None,
        }
    }

    /// Classifies a test file by its path relative to its test root.
    ///
    /// `root/unit/x/test_a.py` is [`Tier::Unit`]; `root/test_a.py` and
    /// `root/helpers/test_a.py` are [`Tier::General`].
    #[must_use]
    pub fn classify(root: &Path, file: &Path) -> Self {
        let relative = file.strip_prefix(root).unwrap_or(file);
        let mut components = relative.components();
        let first = components.next();
        // A file sitting directly in the root has no tier directory.
        if components.next().is_none() {
            return Self::General;
        }
        first
            .and_then(|c| c.as_os_str().to_str())
            .and_then(Self::from_dir_name)
            .unwrap_or(Self::General)
    }

    /// Name tags accepted in tier-tagged test names (`test_<tag>_<name>`).
    #[must_use]
    pub fn name_tags(self) -> &'static [&'static str] {
        match self {
            Self::Unit => &["unit"],
            Self::Integration => &["integration", "int"],
            Self::E2E => &["e2e", "end_to_end"],
            Self::General => &[],
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed file found under a test directory.
#[derive(Debug, Clone)]
pub struct TestModule {
    /// Parsed contents.
    pub module: Module,
    /// Tier derived from the file's location.
    pub tier: Tier,
    /// Whether marker rules should evaluate this file.
    pub check_markers: bool,
}

/// A declaration viewed as a test.
#[derive(Debug, Clone, Copy)]
pub struct TestDeclaration<'a> {
    /// Underlying declaration.
    pub declaration: &'a Declaration,
    /// Tier of the containing file.
    pub tier: Tier,
}

impl TestModule {
    /// Creates a test module.
    #[must_use]
    pub fn new(module: Module, tier: Tier) -> Self {
        Self {
            module,
            tier,
            check_markers: true,
        }
    }

    /// Iterates the module's declarations tagged with this module's tier.
    pub fn test_declarations(&self) -> impl Iterator<Item = TestDeclaration<'_>> {
        self.module.declarations.iter().map(|declaration| TestDeclaration {
            declaration,
            tier: self.tier,
        })
    }
}
