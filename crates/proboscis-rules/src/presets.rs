//! Rule presets for common configurations.

use crate::{RequireE2eTest, RequireIntegrationTest, RequireTestMarkers, RequireUnitTest};
use proboscis_core::{RuleBox, Severity};

/// Preset configurations for proboscis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    /// Every rule at error severity.
    Strict,
    /// Unit coverage and markers are errors; integration and e2e coverage
    /// are warnings.
    Recommended,
    /// Unit coverage only, for gradual adoption.
    Minimal,
}

impl Preset {
    /// Returns the rules for this preset.
    #[must_use]
    pub fn rules(self) -> Vec<RuleBox> {
        match self {
            Self::Strict => all_rules(),
            Self::Recommended => recommended_rules(),
            Self::Minimal => minimal_rules(),
        }
    }
}

impl std::str::FromStr for Preset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "strict" => Ok(Self::Strict),
            "recommended" => Ok(Self::Recommended),
            "minimal" => Ok(Self::Minimal),
            other => Err(format!("unknown preset '{other}'")),
        }
    }
}

/// Returns the recommended set of rules.
#[must_use]
pub fn recommended_rules() -> Vec<RuleBox> {
    vec![
        Box::new(RequireUnitTest::new()),
        Box::new(RequireIntegrationTest::new().severity(Severity::Warning)),
        Box::new(RequireE2eTest::new().severity(Severity::Warning)),
        Box::new(RequireTestMarkers::new()),
    ]
}

/// Returns the minimal set of rules.
#[must_use]
pub fn minimal_rules() -> Vec<RuleBox> {
    vec![Box::new(RequireUnitTest::new())]
}

/// Returns all available rules (PL001-PL004) with default settings.
#[must_use]
pub fn all_rules() -> Vec<RuleBox> {
    vec![
        Box::new(RequireUnitTest::new()),
        Box::new(RequireIntegrationTest::new()),
        Box::new(RequireE2eTest::new()),
        Box::new(RequireTestMarkers::new()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_rules_catalogue() {
        let rules = all_rules();
        let ids: Vec<(&str, &str)> = rules.iter().map(|r| (r.code(), r.name())).collect();
        assert_eq!(
            ids,
            vec![
                ("PL001", "require-unit-test"),
                ("PL002", "require-integration-test"),
                ("PL003", "require-e2e-test"),
                ("PL004", "require-test-markers"),
            ]
        );
    }

    #[test]
    fn test_preset_rules() {
        assert_eq!(Preset::Strict.rules().len(), 4);
        assert_eq!(Preset::Minimal.rules().len(), 1);
        let recommended = Preset::Recommended.rules();
        assert_eq!(recommended[1].default_severity(), Severity::Warning);
        assert_eq!("minimal".parse::<Preset>(), Ok(Preset::Minimal));
        assert!("lenient".parse::<Preset>().is_err());
    }
}
