//! # proboscis-core
//!
//! Core framework for test-coverage linting of Python projects.
//!
//! This crate provides the language-agnostic pieces:
//!
//! - [`Module`] / [`Declaration`] model produced by a [`ModuleParser`]
//! - [`VisibilityResolver`] deciding which declarations are public API
//! - [`TestIndex`] correlating declarations with test names per [`Tier`]
//! - [`Rule`] trait and the [`Engine`] orchestrating a lint run
//! - [`AutoFixer`] applying fix descriptors back into files
//!
//! ## Example
//!
//! ```ignore
//! use proboscis_core::{Engine, FileSet, TestFile};
//!
//! let engine = Engine::builder()
//!     .parser(PythonParser::new())
//!     .rules(all_rules())
//!     .config(config)
//!     .build()?;
//!
//! let files = FileSet::new("/proj")
//!     .source("/proj/src/calc.py")
//!     .test(TestFile::new("/proj/test/unit/test_calc.py", "/proj/test"));
//! let result = engine.lint(&files);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod context;
mod engine;
mod error;
mod fixer;
mod matcher;
mod model;
mod parser;
mod rule;
mod types;
mod visibility;

/// Utility modules for parsers and rule implementations.
pub mod utils;

pub use config::{Config, ConfigError, GeneralTierPolicy, ReportFormat, RuleConfig, RuleSetting};
pub use context::FileContext;
pub use engine::{Engine, EngineBuilder, FileSet, TestFile};
pub use error::LintError;
pub use fixer::{apply_edits, plan_edits, AutoFixer, Edit, FixFailure, FixReport};
pub use matcher::{candidate_names, expected_test_name, TestIndex};
pub use model::{
    is_dunder, ClassInfo, DeclKind, Declaration, Decorator, Module, Suppression, TestDeclaration,
    TestModule, Tier,
};
pub use parser::{ModuleParser, ParseError};
pub use rule::{Rule, RuleBox, RuleScope};
pub use types::{Fix, FixKind, LintResult, Location, Severity, SkippedFile, Violation};
pub use visibility::VisibilityResolver;
