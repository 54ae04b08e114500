//! Integration test: whole lint runs over small Python projects.
//!
//! Each test lays out a project in a temp directory, parses it with the
//! tree-sitter parser and runs the built-in rules through the engine.

use proboscis_core::{AutoFixer, Config, Engine, FileSet, LintResult, TestFile};
use proboscis_python::PythonParser;
use proboscis_rules::{all_rules, RequireTestMarkers, RequireUnitTest};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

struct Project {
    dir: TempDir,
    sources: Vec<PathBuf>,
    tests: Vec<PathBuf>,
}

impl Project {
    fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
            sources: Vec::new(),
            tests: Vec::new(),
        }
    }

    fn root(&self) -> &Path {
        self.dir.path()
    }

    fn write(&self, rel: &str, content: &str) -> PathBuf {
        let path = self.root().join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, content).unwrap();
        path
    }

    fn source(mut self, rel: &str, content: &str) -> Self {
        let path = self.write(rel, content);
        self.sources.push(path);
        self
    }

    fn test(mut self, rel: &str, content: &str) -> Self {
        let path = self.write(rel, content);
        self.tests.push(path);
        self
    }

    fn files(&self) -> FileSet {
        let test_root = self.root().join("test");
        let mut files = FileSet::new(self.root());
        for source in &self.sources {
            files = files.source(source);
        }
        for test in &self.tests {
            files = files.test(TestFile::new(test, &test_root));
        }
        files
    }

    fn lint_all(&self, config: Config) -> LintResult {
        Engine::builder()
            .parser(PythonParser::new())
            .rules(all_rules())
            .config(config)
            .build()
            .expect("engine should build")
            .lint(&self.files())
    }
}

fn summary(result: &LintResult) -> Vec<String> {
    result
        .violations
        .iter()
        .map(|v| format!("{} {}", v.code, v.function_name))
        .collect()
}

// ── Source coverage ──

#[test]
fn private_function_is_ignored_and_public_one_needs_every_tier() {
    let project = Project::new().source(
        "src/calc.py",
        "def f():\n    return 1\n\n\ndef _g():\n    return 2\n",
    );
    let result = project.lint_all(Config::default());

    assert_eq!(summary(&result), vec!["PL001 f", "PL002 f", "PL003 f"]);
    assert_eq!(result.files_checked, 1);
    assert!(result.skipped.is_empty());
}

#[test]
fn no_test_directories_reports_missing_coverage() {
    let project = Project::new().source("src/calc.py", "def add(a, b):\n    return a + b\n");
    let result = project.lint_all(Config {
        test_directories: Vec::new(),
        ..Config::default()
    });

    assert_eq!(summary(&result), vec!["PL001 add", "PL002 add", "PL003 add"]);
    assert!(result.violations[0].message.contains("test/unit/test_calc.py"));
}

#[test]
fn strict_mode_reports_a_superset() {
    let project = Project::new().source(
        "src/calc.py",
        "def f():\n    return 1\n\n\ndef _g():\n    return 2\n",
    );
    let relaxed = project.lint_all(Config::default());
    let strict = project.lint_all(Config {
        strict_mode: true,
        ..Config::default()
    });

    let strict_summary = summary(&strict);
    for finding in summary(&relaxed) {
        assert!(strict_summary.contains(&finding), "{finding} missing in strict run");
    }
    assert!(strict_summary.contains(&"PL001 _g".to_string()));
}

#[test]
fn empty_all_exports_nothing() {
    let project = Project::new().source(
        "src/calc.py",
        "__all__ = []\n\n\ndef f():\n    return 1\n",
    );
    let result = project.lint_all(Config::default());
    assert!(result.violations.is_empty(), "{:#?}", result.violations);
}

#[test]
fn all_list_overrides_underscore_convention() {
    let project = Project::new().source(
        "src/calc.py",
        "__all__ = ['_g']\n\n\ndef f():\n    pass\n\n\ndef _g():\n    pass\n",
    );
    let result = project.lint_all(Config::default());
    assert_eq!(summary(&result), vec!["PL001 _g", "PL002 _g", "PL003 _g"]);
}

#[test]
fn extended_all_falls_back_to_convention() {
    let project = Project::new().source(
        "src/calc.py",
        "__all__ = ['f']\n__all__.extend(['g'])\n\n\ndef f():\n    pass\n\n\ndef g():\n    pass\n\n\ndef _h():\n    pass\n",
    );
    let result = project.lint_all(Config::default());
    assert_eq!(
        summary(&result),
        vec!["PL001 f", "PL002 f", "PL003 f", "PL001 g", "PL002 g", "PL003 g"]
    );
}

#[test]
fn tier_tests_are_correlated_by_name() {
    let project = Project::new()
        .source(
            "src/calc.py",
            "def divide(a, b):\n    return a / b\n\n\nclass C:\n    def m(self):\n        pass\n",
        )
        .test(
            "test/unit/test_calc.py",
            "import pytest\n\n\n@pytest.mark.unit\ndef test_divide_by_zero():\n    pass\n\n\n@pytest.mark.unit\ndef test_C_m():\n    pass\n",
        )
        .test(
            "test/integration/test_calc.py",
            "import pytest\n\n\n@pytest.mark.integration\ndef test_int_divide():\n    pass\n",
        );
    let result = project.lint_all(Config::default());

    assert_eq!(
        summary(&result),
        vec!["PL003 divide", "PL002 C.m", "PL003 C.m"]
    );
    let message = &result.by_code("PL002")[0].message;
    assert!(message.starts_with("[PL002] Method 'm' of class 'C' has no integration test found."));
    assert!(message.contains("Expected test function: test_C_m"));
}

#[test]
fn general_tests_cover_every_tier_by_default() {
    let project = Project::new()
        .source("src/calc.py", "def f():\n    pass\n")
        .test("test/test_calc.py", "def test_f():\n    pass\n");
    let result = project.lint_all(Config::default());
    assert!(result.violations.is_empty(), "{:#?}", result.violations);
}

#[test]
fn noqa_comments_suppress_findings() {
    let project = Project::new()
        .source(
            "src/calc.py",
            "def f():  # noqa: PL001, PL002\n    pass\n\n\ndef g():  # noqa\n    pass\n",
        )
        .source("src/legacy.py", "# noqa: PL003\n\ndef h():\n    pass\n");
    let result = project.lint_all(Config::default());
    assert_eq!(summary(&result), vec!["PL003 f", "PL001 h", "PL002 h"]);
}

#[test]
fn disabled_rules_and_severity_overrides_apply() {
    let project = Project::new().source("src/calc.py", "def f():\n    pass\n");
    let config = Config::parse(
        "[rules]\nPL002 = false\nrequire-e2e-test = { severity = \"warning\" }\n",
    )
    .unwrap();
    let result = project.lint_all(config);

    assert_eq!(summary(&result), vec!["PL001 f", "PL003 f"]);
    assert_eq!(result.count_by_severity(), (1, 1));
}

// ── Robustness ──

#[test]
fn syntax_errors_skip_the_file_only() {
    let project = Project::new()
        .source("src/broken.py", "def broken(:\n    pass\n")
        .source("src/ok.py", "def ok():\n    pass\n");
    let engine = Engine::builder()
        .parser(PythonParser::new())
        .rule(RequireUnitTest::new())
        .build()
        .unwrap();
    let result = engine.lint(&project.files());

    assert_eq!(summary(&result), vec!["PL001 ok"]);
    assert_eq!(result.skipped.len(), 1);
    assert!(result.skipped[0].path.ends_with("broken.py"));
    assert!(result.skipped[0].reason.starts_with("syntax error at line"));
}

#[test]
fn repeated_runs_are_identical() {
    let project = Project::new()
        .source("src/a.py", "def a1():\n    pass\n\n\ndef a2():\n    pass\n")
        .source("src/b.py", "class B:\n    def b(self):\n        pass\n")
        .test("test/unit/test_a.py", "def test_a1():\n    pass\n");
    let first = project.lint_all(Config::default());
    let second = project.lint_all(Config::default());
    assert_eq!(first.violations, second.violations);
}

// ── Markers ──

#[test]
fn marker_fix_round_trip() {
    let project = Project::new().test(
        "test/unit/test_calc.py",
        "import pytest\n\n\n@pytest.mark.slow\ndef test_divide():\n    pass\n\n\nclass TestCalc:\n    def test_add(self):\n        pass\n",
    );
    let engine = Engine::builder()
        .parser(PythonParser::new())
        .rule(RequireTestMarkers::new())
        .build()
        .unwrap();

    let before = engine.lint(&project.files());
    assert_eq!(summary(&before), vec!["PL004 test_divide", "PL004 TestCalc.test_add"]);
    assert_eq!(before.fixable().len(), 2);

    let report = AutoFixer::new().apply(&before.violations);
    assert_eq!(report.total(), 2);
    assert!(report.failures.is_empty());

    let fixed = std::fs::read_to_string(&project.tests[0]).unwrap();
    insta::assert_snapshot!(fixed, @r"
    import pytest


    @pytest.mark.unit
    @pytest.mark.slow
    def test_divide():
        pass


    class TestCalc:
        @pytest.mark.unit
        def test_add(self):
            pass
    ");

    let after = engine.lint(&project.files());
    assert!(after.violations.is_empty(), "{:#?}", after.violations);
}

#[test]
fn general_tier_tests_need_no_marker() {
    let project = Project::new().test("test/test_misc.py", "def test_anything():\n    pass\n");
    let result = project.lint_all(Config::default());
    assert!(result.by_code("PL004").is_empty());
}
