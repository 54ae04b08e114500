//! Error taxonomy for lint runs.

use std::path::PathBuf;

use crate::config::ConfigError;

/// Errors that abort a lint invocation.
///
/// Per-file problems never appear here: unparsable files become
/// [`SkippedFile`](crate::SkippedFile) entries and fix failures become
/// [`FixFailure`](crate::FixFailure) entries.
#[derive(Debug, thiserror::Error)]
pub enum LintError {
    /// Changed-only mode was requested outside a git repository.
    #[error("not a git repository: {}", path.display())]
    NotAGitRepository {
        /// Path that was searched.
        path: PathBuf,
    },

    /// Configuration could not be loaded.
    #[error("invalid configuration: {0}")]
    ConfigInvalid(#[from] ConfigError),

    /// A file failed to parse.
    #[error("failed to parse {}: {message}", path.display())]
    ParseFailed {
        /// File that failed.
        path: PathBuf,
        /// Parser diagnostic.
        message: String,
    },

    /// Filesystem error outside per-file processing.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// Path involved.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// The engine was built without a parser.
    #[error("no module parser configured")]
    MissingParser,
}
