//! # proboscis-python
//!
//! Tree-sitter based Python parser for proboscis.
//!
//! [`PythonParser`] implements [`proboscis_core::ModuleParser`] and turns a
//! Python file into a [`proboscis_core::Module`]:
//!
//! - module-level functions and methods of (nested) classes, in source order
//! - decorator stacks with their original text
//! - a literal `__all__` list or tuple
//! - `noqa` comments on declaration headers and at the top of the file
//! - `Protocol` classes
//!
//! Functions defined inside other functions are never reported.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod exports;
pub mod python;

pub use python::PythonParser;
