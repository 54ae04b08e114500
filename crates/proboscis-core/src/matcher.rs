//! Name correlation between declarations and tests.
//!
//! A declaration `name` is covered in a tier when a test in that tier (or a
//! general test, depending on [`GeneralTierPolicy`]) is named:
//!
//! - `test_<name>` or `test_<name>_<anything>`
//! - `test_<Class>_<name>` / `test_<class>_<name>` for methods, plus the
//!   same with a suffix
//! - `test_<tag>_<name>` / `test_<tag>_<Class>_<name>` where `<tag>` is a
//!   tier tag such as `unit`, `int` or `end_to_end`

use std::collections::{BTreeSet, HashMap};

use crate::config::GeneralTierPolicy;
use crate::model::{Declaration, TestModule, Tier};

/// Index of test names per tier.
#[derive(Debug, Clone, Default)]
pub struct TestIndex {
    by_tier: HashMap<Tier, BTreeSet<String>>,
    present: BTreeSet<Tier>,
    policy: GeneralTierPolicy,
}

impl TestIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new(policy: GeneralTierPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// Builds an index from parsed test modules.
    #[must_use]
    pub fn build<'a, I>(modules: I, policy: GeneralTierPolicy) -> Self
    where
        I: IntoIterator<Item = &'a TestModule>,
    {
        let mut index = Self::new(policy);
        for test_module in modules {
            index.present.insert(test_module.tier);
            for test in test_module.test_declarations() {
                index.insert(test.tier, &test.declaration.simple_name);
            }
        }
        index
    }

    /// Adds a test name to a tier.
    pub fn insert(&mut self, tier: Tier, name: &str) {
        self.present.insert(tier);
        self.by_tier
            .entry(tier)
            .or_default()
            .insert(name.to_string());
    }

    /// Number of indexed test names across all tiers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_tier.values().map(BTreeSet::len).sum()
    }

    /// Returns true if no test names are indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true if some test covers `decl` in `tier`.
    #[must_use]
    pub fn has_test(&self, decl: &Declaration, tier: Tier) -> bool {
        let candidates = candidate_names(decl, tier);
        self.pools(tier)
            .any(|pool| candidates.iter().any(|c| matches_candidate(pool, c)))
    }

    fn pools(&self, tier: Tier) -> impl Iterator<Item = &BTreeSet<String>> {
        let general = tier != Tier::General
            && match self.policy {
                GeneralTierPolicy::AllTiers => true,
                GeneralTierPolicy::MissingTiers => !self.present.contains(&tier),
            };
        let mut tiers = vec![tier];
        if general {
            tiers.push(Tier::General);
        }
        tiers.into_iter().filter_map(|t| self.by_tier.get(&t))
    }
}

fn matches_candidate(pool: &BTreeSet<String>, candidate: &str) -> bool {
    if pool.contains(candidate) {
        return true;
    }
    let prefix = format!("{candidate}_");
    pool.range(prefix.clone()..)
        .next()
        .is_some_and(|name| name.starts_with(&prefix))
}

/// Bare class name of a method's enclosing class.
fn class_name(decl: &Declaration) -> Option<&str> {
    decl.enclosing_class
        .as_deref()
        .map(|qualified| qualified.rsplit('.').next().unwrap_or(qualified))
}

/// Canonical test function name for `decl`: `test_<name>` for functions,
/// `test_<Class>_<name>` for methods.
#[must_use]
pub fn expected_test_name(decl: &Declaration) -> String {
    match class_name(decl) {
        Some(class) => format!("test_{class}_{}", decl.simple_name),
        None => format!("test_{}", decl.simple_name),
    }
}

/// Every accepted test name for `decl` in `tier`, excluding suffixed
/// variants (those are matched by prefix).
#[must_use]
pub fn candidate_names(decl: &Declaration, tier: Tier) -> Vec<String> {
    let name = &decl.simple_name;
    let mut stems = vec![name.clone()];
    if let Some(class) = class_name(decl) {
        stems.push(format!("{class}_{name}"));
        let lowered = class.to_lowercase();
        if lowered != class {
            stems.push(format!("{lowered}_{name}"));
        }
    }

    let mut candidates: Vec<String> = stems.iter().map(|s| format!("test_{s}")).collect();
    for tag in tier.name_tags() {
        candidates.extend(stems.iter().map(|s| format!("test_{tag}_{s}")));
    }
    candidates
}
