//! Context types for rule execution.

use std::path::{Path, PathBuf};

use crate::config::{Config, RuleConfig};
use crate::matcher::TestIndex;
use crate::model::{Module, Tier};
use crate::utils::paths;

/// Context provided to rules for one parsed file.
#[derive(Debug, Clone)]
pub struct FileContext<'a> {
    /// The parsed file.
    pub module: &'a Module,
    /// Project root.
    pub root: &'a Path,
    /// Path relative to the project root.
    pub relative_path: PathBuf,
    /// Tier of the file when it is a test module, `None` for sources.
    pub tier: Option<Tier>,
    /// Test names of the whole project.
    pub tests: &'a TestIndex,
    /// Effective configuration.
    pub config: &'a Config,
}

impl<'a> FileContext<'a> {
    /// Creates a context for a source module.
    #[must_use]
    pub fn source(
        module: &'a Module,
        root: &'a Path,
        tests: &'a TestIndex,
        config: &'a Config,
    ) -> Self {
        Self {
            module,
            root,
            relative_path: module
                .path
                .strip_prefix(root)
                .map_or_else(|_| module.path.clone(), Path::to_path_buf),
            tier: None,
            tests,
            config,
        }
    }

    /// Creates a context for a test module of `tier`.
    #[must_use]
    pub fn test(
        module: &'a Module,
        tier: Tier,
        root: &'a Path,
        tests: &'a TestIndex,
        config: &'a Config,
    ) -> Self {
        Self {
            tier: Some(tier),
            ..Self::source(module, root, tests, config)
        }
    }

    /// Where a test for this file is expected in `tier`, relative to the root.
    #[must_use]
    pub fn expected_test_file(&self, tier: Tier) -> PathBuf {
        let test_dir = self
            .config
            .test_directories
            .first()
            .map_or("test", String::as_str);
        paths::expected_test_file(self.root, &self.module.path, test_dir, tier)
    }

    /// Table configuration for a rule, if any.
    #[must_use]
    pub fn rule_config(&self, code: &str, label: &str) -> Option<&'a RuleConfig> {
        self.config.rule_config(code, label)
    }
}
