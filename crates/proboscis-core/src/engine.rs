//! Rule evaluation engine.
//!
//! One run goes through: parse test files, index test names, parse source
//! files, evaluate enabled rules on public declarations, drop suppressed
//! findings, apply severity overrides, sort. Parsing and evaluation run on
//! the rayon pool; only the final sort fixes the output order.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::context::FileContext;
use crate::error::LintError;
use crate::matcher::TestIndex;
use crate::model::{Module, TestModule, Tier};
use crate::parser::ModuleParser;
use crate::rule::{Rule, RuleBox, RuleScope};
use crate::types::{LintResult, SkippedFile, Violation};
use crate::visibility::VisibilityResolver;

/// A test file together with the test directory it was found in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestFile {
    /// Absolute path of the file.
    pub path: PathBuf,
    /// Test directory the tier is derived from.
    pub root: PathBuf,
    /// Whether marker rules evaluate this file.
    pub check_markers: bool,
}

impl TestFile {
    /// Creates a test file entry evaluated by marker rules.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, root: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            root: root.into(),
            check_markers: true,
        }
    }

    /// Tier derived from the location under the test directory.
    #[must_use]
    pub fn tier(&self) -> Tier {
        Tier::classify(&self.root, &self.path)
    }
}

/// Files of one lint run, in discovery order.
#[derive(Debug, Clone, Default)]
pub struct FileSet {
    /// Project root.
    pub root: PathBuf,
    /// Source files evaluated by source rules.
    pub sources: Vec<PathBuf>,
    /// Every test file of the project. All of them feed the test index.
    pub tests: Vec<TestFile>,
}

impl FileSet {
    /// Creates an empty file set rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    /// Adds a source file (builder style).
    #[must_use]
    pub fn source(mut self, path: impl Into<PathBuf>) -> Self {
        self.sources.push(path.into());
        self
    }

    /// Adds a test file (builder style).
    #[must_use]
    pub fn test(mut self, file: TestFile) -> Self {
        self.tests.push(file);
        self
    }

    /// Total number of files.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sources.len() + self.tests.len()
    }

    /// Returns true if there are no files.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Builder for configuring an [`Engine`].
#[derive(Default)]
pub struct EngineBuilder {
    parser: Option<Box<dyn ModuleParser>>,
    rules: Vec<RuleBox>,
    config: Option<Config>,
}

impl EngineBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the module parser.
    #[must_use]
    pub fn parser<P: ModuleParser + 'static>(mut self, parser: P) -> Self {
        self.parser = Some(Box::new(parser));
        self
    }

    /// Adds a rule to the engine.
    #[must_use]
    pub fn rule<R: Rule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// Adds several boxed rules.
    #[must_use]
    pub fn rules<I>(mut self, rules: I) -> Self
    where
        I: IntoIterator<Item = RuleBox>,
    {
        self.rules.extend(rules);
        self
    }

    /// Sets the configuration.
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Builds the engine.
    ///
    /// # Errors
    ///
    /// Returns an error if no parser was set.
    ///
    /// The configuration is taken as given. Without test directories every
    /// public declaration simply has no coverage.
    pub fn build(self) -> Result<Engine, LintError> {
        let parser = self.parser.ok_or(LintError::MissingParser)?;
        let config = self.config.unwrap_or_default();

        Ok(Engine {
            parser,
            rules: self.rules,
            resolver: VisibilityResolver::new(config.strict_mode),
            config,
        })
    }
}

/// The engine that orchestrates a lint run.
///
/// Use [`Engine::builder()`] to construct an instance.
pub struct Engine {
    parser: Box<dyn ModuleParser>,
    rules: Vec<RuleBox>,
    resolver: VisibilityResolver,
    config: Config,
}

impl Engine {
    /// Creates a new builder for configuring an engine.
    #[must_use]
    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    /// Returns the effective configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the number of registered rules.
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// File extensions the configured parser reads.
    #[must_use]
    pub fn extensions(&self) -> &'static [&'static str] {
        self.parser.extensions()
    }

    /// Returns the registered rules that are enabled by configuration.
    pub fn enabled_rules(&self) -> impl Iterator<Item = &dyn Rule> {
        self.rules
            .iter()
            .map(|rule| -> &dyn Rule { rule.as_ref() })
            .filter(|rule| self.config.is_rule_enabled(rule.code(), rule.name()))
    }

    /// Reads and parses one file.
    ///
    /// # Errors
    ///
    /// Returns [`LintError::Io`] if the file cannot be read and
    /// [`LintError::ParseFailed`] if it has syntax errors.
    pub fn parse_file(&self, path: &Path) -> Result<Module, LintError> {
        let source = std::fs::read_to_string(path).map_err(|e| LintError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        self.parser
            .parse(path, &source)
            .map_err(|e| LintError::ParseFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            })
    }

    /// Lints a set of files.
    ///
    /// Never fails: unreadable or unparsable files are reported in
    /// [`LintResult::skipped`].
    #[must_use]
    pub fn lint(&self, files: &FileSet) -> LintResult {
        info!(
            "Linting {} source and {} test files under {} ({})",
            files.sources.len(),
            files.tests.len(),
            files.root.display(),
            self.parser.language_id()
        );
        let mut result = LintResult::new();

        let parsed_tests: Vec<(&TestFile, Result<Module, LintError>)> = files
            .tests
            .par_iter()
            .map(|file| (file, self.parse_file(&file.path)))
            .collect();
        let mut test_modules = Vec::with_capacity(parsed_tests.len());
        for (file, parsed) in parsed_tests {
            match parsed {
                Ok(module) => {
                    let mut test_module = TestModule::new(module, file.tier());
                    test_module.check_markers = file.check_markers;
                    test_modules.push(test_module);
                }
                Err(e) => result.skipped.push(skip(e)),
            }
        }

        let index = TestIndex::build(&test_modules, self.config.general_tier);
        debug!("Indexed {} test names", index.len());

        let parsed_sources: Vec<Result<Module, LintError>> = files
            .sources
            .par_iter()
            .map(|path| self.parse_file(path))
            .collect();
        let mut source_modules = Vec::with_capacity(parsed_sources.len());
        for parsed in parsed_sources {
            match parsed {
                Ok(module) => source_modules.push(module),
                Err(e) => result.skipped.push(skip(e)),
            }
        }
        result.files_checked = source_modules.len() + test_modules.len();

        let source_rules = self.rules_in(RuleScope::Source);
        let test_rules = self.rules_in(RuleScope::Test);

        if !source_rules.is_empty() {
            let found: Vec<Vec<Violation>> = source_modules
                .par_iter()
                .map(|module| {
                    let ctx = FileContext::source(module, &files.root, &index, &self.config);
                    self.evaluate(&ctx, &source_rules)
                })
                .collect();
            result.violations.extend(found.into_iter().flatten());
        }

        if !test_rules.is_empty() {
            let found: Vec<Vec<Violation>> = test_modules
                .par_iter()
                .filter(|test| test.check_markers)
                .map(|test| {
                    let ctx = FileContext::test(
                        &test.module,
                        test.tier,
                        &files.root,
                        &index,
                        &self.config,
                    );
                    self.evaluate(&ctx, &test_rules)
                })
                .collect();
            result.violations.extend(found.into_iter().flatten());
        }

        sort_in_discovery_order(&mut result.violations, files);

        info!(
            "Lint complete: {} violations in {} files ({} skipped)",
            result.violations.len(),
            result.files_checked,
            result.skipped.len()
        );
        result
    }

    fn rules_in(&self, scope: RuleScope) -> Vec<&dyn Rule> {
        self.rules
            .iter()
            .map(|rule| -> &dyn Rule { rule.as_ref() })
            .filter(|rule| rule.scope() == scope)
            .filter(|rule| {
                let enabled = self.config.is_rule_enabled(rule.code(), rule.name());
                if !enabled {
                    debug!("Skipping disabled rule: {}", rule.code());
                }
                enabled
            })
            .collect()
    }

    /// Evaluates `rules` on the public declarations of one file.
    fn evaluate(&self, ctx: &FileContext<'_>, rules: &[&dyn Rule]) -> Vec<Violation> {
        let module = ctx.module;
        let mut violations = Vec::new();

        for decl in self.resolver.resolve(module) {
            for rule in rules {
                if module.is_suppressed(decl, rule.code()) {
                    debug!(
                        "Suppressed {} for {} in {}",
                        rule.code(),
                        decl.qualified_name,
                        module.path.display()
                    );
                    continue;
                }
                if let Some(mut violation) = rule.check(ctx, decl) {
                    if let Some(severity) = self.config.rule_severity(rule.code(), rule.name()) {
                        violation.severity = severity;
                    }
                    violations.push(violation);
                }
            }
        }

        violations
    }
}

fn skip(error: LintError) -> SkippedFile {
    let (path, reason) = match error {
        LintError::ParseFailed { path, message } => (path, message),
        LintError::Io { path, source } => (path, format!("failed to read: {source}")),
        other => (PathBuf::new(), other.to_string()),
    };
    warn!("Skipping {}: {}", path.display(), reason);
    SkippedFile { path, reason }
}

/// Sorts by (file in discovery order, line, rule code).
fn sort_in_discovery_order(violations: &mut [Violation], files: &FileSet) {
    let order: HashMap<&Path, usize> = files
        .sources
        .iter()
        .map(PathBuf::as_path)
        .chain(files.tests.iter().map(|t| t.path.as_path()))
        .enumerate()
        .map(|(i, path)| (path, i))
        .collect();

    violations.sort_by(|a, b| {
        let rank = |v: &Violation| {
            order
                .get(v.location.file.as_path())
                .copied()
                .unwrap_or(usize::MAX)
        };
        rank(a)
            .cmp(&rank(b))
            .then_with(|| a.location.file.cmp(&b.location.file))
            .then(a.location.line.cmp(&b.location.line))
            .then_with(|| a.code.cmp(&b.code))
    });
}
