//! Init command implementation.

use anyhow::{bail, Context, Result};
use std::path::Path;

const CONFIG_FILE: &str = "proboscis.toml";

const DEFAULT_CONFIG: &str = r#"# proboscis configuration
# The same keys can live in pyproject.toml under [tool.proboscis].

# Directories holding tests. Subdirectories unit/, integration/ and e2e/
# select the tier; tests directly inside count as general tests.
test_directories = ["test", "tests"]

# File names recognised as test files.
test_patterns = ["test_*.py", "*_test.py"]

# Glob patterns to exclude from analysis
exclude_patterns = [
    "**/migrations/**",
]

# Treat _private names as public too
strict_mode = false

# text, json or compact
output_format = "text"

# Exit with status 1 when violations are found
fail_on_error = false

# How general tests count: "all-tiers" or "missing-tiers"
general_tier = "all-tiers"

# Rule configurations
# A rule is either toggled with a boolean or configured with a table.

[rules]
PL001 = true
PL002 = true

[rules.PL003]
enabled = true
# severity = "warning"  # Override default severity
# ignore_protocols = true

[rules.require-test-markers]
enabled = true
"#;

/// Runs the init command, writing the template into `dir`.
pub fn run(dir: &Path, force: bool) -> Result<()> {
    let config_path = dir.join(CONFIG_FILE);

    if config_path.exists() && !force {
        bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    std::fs::write(&config_path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    println!("Created {CONFIG_FILE}");
    println!("\nNext steps:");
    println!("  1. Edit {CONFIG_FILE} to configure rules");
    println!("  2. Run: proboscis check");

    Ok(())
}
