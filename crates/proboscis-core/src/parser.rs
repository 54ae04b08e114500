//! Parser extension point.
//!
//! `ModuleParser` turns source text into a [`Module`]. The engine is
//! language-agnostic; the Python implementation lives in `proboscis-python`.

use std::path::Path;

use crate::model::Module;

/// A syntax error that prevents a file from being evaluated.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("syntax error at line {line}: {message}")]
pub struct ParseError {
    /// 1-indexed line of the first error.
    pub line: usize,
    /// Parser diagnostic.
    pub message: String,
}

impl ParseError {
    /// Creates a parse error.
    #[must_use]
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

/// Trait for language-specific declaration extraction.
///
/// Implementations must be stateless across calls so the engine can parse
/// files from several threads.
pub trait ModuleParser: Send + Sync {
    /// Language identifier (e.g., `"python"`).
    fn language_id(&self) -> &'static str;

    /// File extensions this parser handles (e.g., `&["py"]`).
    fn extensions(&self) -> &'static [&'static str];

    /// Parses `source` (the contents of `path`) into a module.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] if the source has syntax errors.
    fn parse(&self, path: &Path, source: &str) -> Result<Module, ParseError>;
}
