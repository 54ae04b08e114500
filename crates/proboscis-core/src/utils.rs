//! Utility functions for parsers and rule implementations.

pub mod noqa;
pub mod paths;

// Re-export commonly used utilities for rule implementations
#[doc(inline)]
pub use noqa::{parse_noqa, CommentMap};
#[doc(inline)]
pub use paths::{display_relative, expected_test_file};
