//! # proboscis-rules
//!
//! Built-in rules for proboscis.
//!
//! ## Available Rules
//!
//! | Code | Name | Description |
//! |------|------|-------------|
//! | PL001 | `require-unit-test` | Every public function/method has a unit test |
//! | PL002 | `require-integration-test` | Every public function/method has an integration test |
//! | PL003 | `require-e2e-test` | Every public function/method has an e2e test |
//! | PL004 | `require-test-markers` | Tests in tier directories carry the tier's pytest marker |
//!
//! ## Usage
//!
//! ```ignore
//! use proboscis_core::Engine;
//! use proboscis_python::PythonParser;
//! use proboscis_rules::all_rules;
//!
//! let engine = Engine::builder()
//!     .parser(PythonParser::new())
//!     .rules(all_rules())
//!     .build()?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod pl004_require_test_markers;
mod presets;
mod tier_rule;

pub use pl001_require_unit_test::RequireUnitTest;
pub use pl002_require_integration_test::RequireIntegrationTest;
pub use pl003_require_e2e_test::RequireE2eTest;
pub use pl004_require_test_markers::RequireTestMarkers;
pub use presets::{all_rules, minimal_rules, recommended_rules, Preset};

/// Re-export core types for convenience.
pub use proboscis_core::{Rule, Severity, Violation};
