//! Path utilities for mapping source modules to expected test locations.

use std::path::{Path, PathBuf};

use crate::model::Tier;

/// Returns the module components of `file` relative to `root`.
///
/// A leading `src` directory is stripped and a trailing `__init__` is
/// dropped, so `src/shop/cart/__init__.py` yields `["shop", "cart"]`.
fn module_components(root: &Path, file: &Path) -> Vec<String> {
    let relative = file.strip_prefix(root).unwrap_or(file);
    let mut parts: Vec<String> = relative
        .with_extension("")
        .components()
        .filter_map(|c| c.as_os_str().to_str().map(ToString::to_string))
        .collect();

    if parts.len() > 1 && parts.first().is_some_and(|p| p == "src") {
        parts.remove(0);
    }
    if parts.last().is_some_and(|p| p == "__init__") {
        parts.pop();
    }
    parts
}

/// Canonical location for a test of `file` in `tier`:
/// `<test_dir>/<tier>/<package dirs>/test_<module>.py`, relative to the
/// project root.
#[must_use]
pub fn expected_test_file(root: &Path, file: &Path, test_dir: &str, tier: Tier) -> PathBuf {
    let mut parts = module_components(root, file);
    let module = parts.pop().unwrap_or_else(|| {
        file.file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("module")
            .to_string()
    });

    let mut path = PathBuf::from(test_dir);
    if tier != Tier::General {
        path.push(tier.as_str());
    }
    for dir in parts {
        path.push(dir);
    }
    path.push(format!("test_{module}.py"));
    path
}

/// Displays `path` relative to `root` when possible.
#[must_use]
pub fn display_relative(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}
