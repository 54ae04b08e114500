//! Configuration types for proboscis.
//!
//! Configuration lives either in a `[tool.proboscis]` table of
//! `pyproject.toml` or at the top level of a `proboscis.toml` file.

use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::Severity;

/// Top-level configuration for proboscis.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory names searched for test files.
    pub test_directories: Vec<String>,

    /// File-name globs identifying test files.
    pub test_patterns: Vec<String>,

    /// Glob patterns for files and directories to leave out.
    pub exclude_patterns: Vec<String>,

    /// Treat underscore-prefixed names as public too.
    pub strict_mode: bool,

    /// Default report format.
    pub output_format: ReportFormat,

    /// Exit non-zero when violations are found.
    pub fail_on_error: bool,

    /// How tests outside a tier subdirectory count toward tier coverage.
    pub general_tier: GeneralTierPolicy,

    /// Per-rule configuration keyed by rule id or label.
    pub rules: BTreeMap<String, RuleSetting>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            test_directories: vec!["test".to_string(), "tests".to_string()],
            test_patterns: vec!["test_*.py".to_string(), "*_test.py".to_string()],
            exclude_patterns: Vec::new(),
            strict_mode: false,
            output_format: ReportFormat::Text,
            fail_on_error: false,
            general_tier: GeneralTierPolicy::AllTiers,
            rules: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Creates a new default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a file.
    ///
    /// `pyproject.toml` files are read from their `[tool.proboscis]` table,
    /// anything else from the top level.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        if path.file_name().is_some_and(|n| n == "pyproject.toml") {
            Self::from_pyproject(&content)
        } else {
            Self::parse(&content)
        }
    }

    /// Parses configuration from a standalone TOML document.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid or fails validation.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })?;
        config.finish()
    }

    /// Parses the `[tool.proboscis]` table of a `pyproject.toml` document.
    /// A document without that table yields the default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid or fails validation.
    pub fn from_pyproject(content: &str) -> Result<Self, ConfigError> {
        let document: toml::Table = toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })?;
        let Some(section) = proboscis_section(&document) else {
            return Ok(Self::default());
        };
        let config: Self = toml::Value::Table(section.clone())
            .try_into()
            .map_err(|e: toml::de::Error| ConfigError::Parse {
                message: e.to_string(),
            })?;
        config.finish()
    }

    /// Returns true if `content` is a `pyproject.toml` with a
    /// `[tool.proboscis]` table.
    #[must_use]
    pub fn has_proboscis_section(content: &str) -> bool {
        toml::from_str::<toml::Table>(content)
            .ok()
            .is_some_and(|doc| proboscis_section(&doc).is_some())
    }

    fn finish(self) -> Result<Self, ConfigError> {
        for (key, setting) in &self.rules {
            if let RuleSetting::Invalid(found) = setting {
                warn!(rule = %key, value = %found, "Invalid rule configuration, keeping rule enabled");
            }
        }
        self.validate()?;
        Ok(self)
    }

    /// Rejects empty test directory and pattern lists in a config file.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.test_directories.is_empty() {
            return Err(ConfigError::Validation {
                message: "test_directories cannot be empty".to_string(),
            });
        }
        if self.test_patterns.is_empty() {
            return Err(ConfigError::Validation {
                message: "test_patterns cannot be empty".to_string(),
            });
        }
        Ok(())
    }

    fn setting(&self, code: &str, label: &str) -> Option<&RuleSetting> {
        self.rules.get(code).or_else(|| self.rules.get(label))
    }

    /// Checks if a rule is enabled. Rules are enabled unless configured off.
    #[must_use]
    pub fn is_rule_enabled(&self, code: &str, label: &str) -> bool {
        self.setting(code, label).map_or(true, RuleSetting::is_enabled)
    }

    /// Gets the severity override for a rule.
    #[must_use]
    pub fn rule_severity(&self, code: &str, label: &str) -> Option<Severity> {
        match self.setting(code, label)? {
            RuleSetting::Table(rule) => rule.severity,
            _ => None,
        }
    }

    /// Gets the table configuration of a rule, if it has one.
    #[must_use]
    pub fn rule_config(&self, code: &str, label: &str) -> Option<&RuleConfig> {
        match self.setting(code, label)? {
            RuleSetting::Table(rule) => Some(rule),
            _ => None,
        }
    }

    /// Sets a rule on or off, replacing any existing entry for its id.
    pub fn set_rule_enabled(&mut self, code: &str, enabled: bool) {
        match self.rules.get_mut(code) {
            Some(RuleSetting::Table(rule)) => rule.enabled = enabled,
            _ => {
                self.rules
                    .insert(code.to_string(), RuleSetting::Toggle(enabled));
            }
        }
    }
}

fn proboscis_section(document: &toml::Table) -> Option<&toml::Table> {
    document
        .get("tool")
        .and_then(toml::Value::as_table)
        .and_then(|tool| tool.get("proboscis"))
        .and_then(toml::Value::as_table)
}

/// Report format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Human-readable blocks with a summary.
    #[default]
    Text,
    /// Machine-readable JSON document.
    Json,
    /// One line per violation.
    Compact,
}

impl std::str::FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            "compact" => Ok(Self::Compact),
            other => Err(format!(
                "invalid output format '{other}', expected text, json or compact"
            )),
        }
    }
}

/// Policy for tests placed directly in a test directory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GeneralTierPolicy {
    /// A general test satisfies every tier.
    #[default]
    AllTiers,
    /// A general test only satisfies tiers that have no dedicated
    /// subdirectory anywhere in the test pool.
    MissingTiers,
}

/// One entry of the `rules` table.
#[derive(Debug, Clone, PartialEq)]
pub enum RuleSetting {
    /// `PL002 = false`
    Toggle(bool),
    /// `[rules.PL003]` table.
    Table(RuleConfig),
    /// Anything else. The rule stays enabled.
    Invalid(String),
}

impl RuleSetting {
    /// Whether the rule runs under this setting.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        match self {
            Self::Toggle(enabled) => *enabled,
            Self::Table(rule) => rule.enabled,
            Self::Invalid(_) => true,
        }
    }

    fn from_value(value: toml::Value) -> Self {
        match value {
            toml::Value::Boolean(enabled) => Self::Toggle(enabled),
            toml::Value::Table(table) => RuleConfig::from_table(table)
                .map_or_else(Self::Invalid, Self::Table),
            other => Self::Invalid(other.to_string()),
        }
    }
}

impl<'de> Deserialize<'de> for RuleSetting {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        toml::Value::deserialize(deserializer).map(Self::from_value)
    }
}

/// Per-rule table configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleConfig {
    /// Whether this rule is enabled.
    pub enabled: bool,

    /// Severity override for this rule.
    pub severity: Option<Severity>,

    /// Rule-specific options. Keys of a nested `options` table and loose
    /// keys of the rule table both land here.
    pub options: BTreeMap<String, toml::Value>,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            severity: None,
            options: BTreeMap::new(),
        }
    }
}

impl RuleConfig {
    fn from_table(table: toml::Table) -> Result<Self, String> {
        let mut rule = Self::default();
        for (key, value) in table {
            match key.as_str() {
                "enabled" => {
                    rule.enabled = value
                        .as_bool()
                        .ok_or_else(|| format!("enabled = {value}"))?;
                }
                "severity" => rule.severity = parse_severity(&value),
                "options" => match value {
                    toml::Value::Table(options) => rule.options.extend(options),
                    other => return Err(format!("options = {other}")),
                },
                _ => {
                    rule.options.insert(key, value);
                }
            }
        }
        if rule.severity.is_none() {
            rule.severity = rule.options.get("severity").and_then(parse_severity);
        }
        Ok(rule)
    }

    /// Gets an option value as a specific type.
    #[must_use]
    pub fn get_option<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.options
            .get(key)
            .and_then(|v| v.clone().try_into().ok())
    }

    /// Gets a boolean option with a default value.
    #[must_use]
    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        self.options
            .get(key)
            .and_then(toml::Value::as_bool)
            .unwrap_or(default)
    }
}

fn parse_severity(value: &toml::Value) -> Option<Severity> {
    let raw = value.as_str()?;
    match raw.parse() {
        Ok(severity) => Some(severity),
        Err(message) => {
            warn!(%message, "Ignoring severity override");
            None
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error reading config file.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Parse error in config file.
    #[error("Failed to parse config: {message}")]
    Parse {
        /// Parse error message.
        message: String,
    },

    /// Structurally valid TOML with unusable values.
    #[error("Invalid config: {message}")]
    Validation {
        /// What is wrong.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.test_directories, vec!["test", "tests"]);
        assert_eq!(config.test_patterns, vec!["test_*.py", "*_test.py"]);
        assert!(!config.strict_mode);
        assert_eq!(config.output_format, ReportFormat::Text);
        assert!(config.is_rule_enabled("PL001", "require-unit-test"));
    }

    #[test]
    fn test_parse_pyproject_section() {
        let content = r#"
[project]
name = "shop"

[tool.proboscis]
test_directories = ["tests", "spec", "test"]
exclude_patterns = ["**/vendor/**"]
output_format = "json"
fail_on_error = true

[tool.proboscis.rules]
PL001 = true
PL002 = false

[tool.proboscis.rules.PL003]
enabled = true
options = {severity = "warning", max_violations = 10}

[tool.proboscis.rules.PL004]
enabled = false
options = {ignore_private = true}

[tool.black]
line-length = 88
"#;
        let config = Config::from_pyproject(content).unwrap();
        assert_eq!(config.test_directories, vec!["tests", "spec", "test"]);
        assert_eq!(config.output_format, ReportFormat::Json);
        assert!(config.fail_on_error);
        assert!(config.is_rule_enabled("PL001", "require-unit-test"));
        assert!(!config.is_rule_enabled("PL002", "require-integration-test"));
        assert!(config.is_rule_enabled("PL003", "require-e2e-test"));
        assert!(!config.is_rule_enabled("PL004", "require-test-markers"));
        assert_eq!(
            config.rule_severity("PL003", "require-e2e-test"),
            Some(Severity::Warning)
        );
        let pl004 = config.rule_config("PL004", "require-test-markers").unwrap();
        assert!(pl004.get_bool("ignore_private", false));
        assert_eq!(
            config
                .rule_config("PL003", "require-e2e-test")
                .unwrap()
                .get_option::<i64>("max_violations"),
            Some(10)
        );
    }

    #[test]
    fn test_pyproject_without_section_is_default() {
        let config = Config::from_pyproject("[project]\nname = \"x\"\n").unwrap();
        assert_eq!(config.test_directories, vec!["test", "tests"]);
        assert!(!Config::has_proboscis_section("[project]\nname = \"x\"\n"));
        assert!(Config::has_proboscis_section("[tool.proboscis]\nstrict_mode = true\n"));
    }

    #[test]
    fn test_rules_keyed_by_label() {
        let config = Config::parse("[rules]\nrequire-e2e-test = false\n").unwrap();
        assert!(!config.is_rule_enabled("PL003", "require-e2e-test"));
    }

    #[test]
    fn test_invalid_rule_entries_fall_back_to_enabled() {
        let content = r#"
[rules]
PL001 = "yes"
PL002 = 0

[rules.PL003]
enabled = "no"
"#;
        let config = Config::parse(content).unwrap();
        assert!(config.is_rule_enabled("PL001", "require-unit-test"));
        assert!(config.is_rule_enabled("PL002", "require-integration-test"));
        assert!(config.is_rule_enabled("PL003", "require-e2e-test"));
        assert!(matches!(config.rules.get("PL001"), Some(RuleSetting::Invalid(_))));
    }

    #[test]
    fn test_empty_lists_are_rejected() {
        let err = Config::parse("test_directories = []\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation { .. }));
        let err = Config::parse("test_patterns = []\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation { .. }));
    }

    #[test]
    fn test_unknown_output_format_is_parse_error() {
        let err = Config::parse("output_format = \"xml\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_general_tier_policy() {
        let config = Config::parse("general_tier = \"missing-tiers\"\n").unwrap();
        assert_eq!(config.general_tier, GeneralTierPolicy::MissingTiers);
    }

    #[test]
    fn test_set_rule_enabled_keeps_table_options() {
        let mut config =
            Config::parse("[rules.PL001]\nenabled = true\nignore_protocols = false\n").unwrap();
        config.set_rule_enabled("PL001", false);
        assert!(!config.is_rule_enabled("PL001", "require-unit-test"));
        let rule = config.rule_config("PL001", "require-unit-test").unwrap();
        assert!(!rule.get_bool("ignore_protocols", true));
        config.set_rule_enabled("PL002", false);
        assert!(!config.is_rule_enabled("PL002", "require-integration-test"));
    }
}
