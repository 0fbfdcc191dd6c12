//! On-disk fixture store
//!
//! Tree convention:
//!
//! ```text
//! rules/
//!   CORE-000001/
//!     rule.yaml            rule definition, consumed opaquely by the engine
//!     positive/
//!       01/
//!         dataset.yaml
//!         expected.yaml
//!         results/         written by the reporter, ignored here
//!     negative/
//!       01/...
//! ```
//!
//! The store never writes; it resolves a per-case `results` directory for
//! the reporter but leaves creation to it.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::rule::RuleId;
use crate::testcase::{Category, TestCase, TestCaseRef};

/// Read-only access to a fixture tree
#[derive(Debug, Clone)]
pub struct FixtureStore {
    root: PathBuf,
}

impl FixtureStore {
    /// Create a store rooted at a `rules/` directory
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The tree root
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// All rule ids present in the tree, sorted
    ///
    /// Directories that do not follow the rule-id naming convention are
    /// ignored, matching the contributor workflow where scratch directories
    /// live alongside real fixtures.
    ///
    /// # Errors
    ///
    /// Returns `Error::Discovery` if the tree root is missing or unreadable.
    pub fn list_rules(&self) -> Result<Vec<RuleId>> {
        if !self.root.is_dir() {
            return Err(Error::Discovery(format!(
                "rules directory not found: {}",
                self.root.display()
            )));
        }

        let mut rules = Vec::new();
        for entry in std::fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.path().is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if RuleId::is_valid(&name) {
                rules.push(RuleId::parse(name)?);
            }
        }
        rules.sort();
        Ok(rules)
    }

    /// All test cases for a rule, positive before negative, name order
    /// within each category
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownRule` if the rule has no fixture directory and
    /// `Error::Discovery` if the directory exists but holds no test cases.
    pub fn list_test_cases(&self, rule: &RuleId) -> Result<Vec<TestCaseRef>> {
        let rule_dir = self.root.join(rule.as_str());
        if !rule_dir.is_dir() {
            return Err(Error::UnknownRule(rule.to_string()));
        }

        let mut cases = Vec::new();
        for category in Category::all() {
            let category_dir = rule_dir.join(category.dir_name());
            if !category_dir.is_dir() {
                continue;
            }
            let mut names: Vec<String> = std::fs::read_dir(&category_dir)?
                .filter_map(std::result::Result::ok)
                .filter(|e| e.path().is_dir() && e.path().join("dataset.yaml").is_file())
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .collect();
            names.sort();
            for name in names {
                cases.push(TestCaseRef {
                    rule: rule.clone(),
                    category,
                    name: name.clone(),
                    dir: category_dir.join(name),
                });
            }
        }

        if cases.is_empty() {
            return Err(Error::Discovery(format!(
                "rule {rule} has no test cases under {}",
                rule_dir.display()
            )));
        }
        Ok(cases)
    }

    /// Find one test case by its `category/name` sub-path
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownTestCase` if no case matches.
    pub fn find_test_case(&self, rule: &RuleId, case_path: &str) -> Result<TestCaseRef> {
        let cases = self.list_test_cases(rule)?;
        cases
            .into_iter()
            .find(|c| c.case_path() == case_path)
            .ok_or_else(|| Error::UnknownTestCase {
                rule: rule.to_string(),
                case: case_path.to_string(),
            })
    }

    /// Materialize a test case: dataset plus validated expected findings
    ///
    /// # Errors
    ///
    /// Returns `Error::MalformedFixture` per the invariants documented on
    /// [`TestCase::load`].
    pub fn load_test_case(&self, reference: &TestCaseRef) -> Result<TestCase> {
        TestCase::load(reference.clone())
    }

    /// The rule definition file handed to the engine
    ///
    /// # Errors
    ///
    /// Returns `Error::MalformedFixture` if the rule directory carries no
    /// `rule.yaml`.
    pub fn rule_definition(&self, rule: &RuleId) -> Result<PathBuf> {
        let path = self.root.join(rule.as_str()).join("rule.yaml");
        if path.is_file() {
            Ok(path)
        } else {
            Err(Error::malformed(
                rule.to_string(),
                "rule definition (rule.yaml) missing",
            ))
        }
    }

    /// Result-output directory for one test case, isolated per case
    #[must_use]
    pub fn results_dir(&self, reference: &TestCaseRef) -> PathBuf {
        reference.dir.join("results")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    /// Lay down one rule directory with the given `category/name` cases.
    fn seed(root: &Path, rule: &str, cases: &[&str]) {
        let rule_dir = root.join(rule);
        std::fs::create_dir_all(&rule_dir).unwrap();
        std::fs::write(rule_dir.join("rule.yaml"), "check: {}\n").unwrap();
        for case in cases {
            let dir = rule_dir.join(case);
            std::fs::create_dir_all(&dir).unwrap();
            std::fs::write(dir.join("dataset.yaml"), "records:\n  - id: R1\n").unwrap();
            let expected = if case.starts_with("positive") {
                "findings:\n  - record: R1\n"
            } else {
                "findings: []\n"
            };
            std::fs::write(dir.join("expected.yaml"), expected).unwrap();
        }
    }

    fn store_with_rules() -> (TempDir, FixtureStore) {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("rules");
        seed(&root, "CORE-000001", &["positive/01", "negative/01", "negative/02"]);
        seed(&root, "CG0002", &["positive/01"]);
        // Scratch directory that must be ignored by discovery
        std::fs::create_dir_all(root.join("wip-notes")).unwrap();
        let store = FixtureStore::new(&root);
        (tmp, store)
    }

    #[test]
    fn test_list_rules_sorted_and_filtered() {
        let (_tmp, store) = store_with_rules();
        let rules = store.list_rules().unwrap();
        let names: Vec<&str> = rules.iter().map(RuleId::as_str).collect();
        assert_eq!(names, vec!["CG0002", "CORE-000001"]);
    }

    #[test]
    fn test_list_rules_missing_root_is_discovery_error() {
        let store = FixtureStore::new("/nonexistent/rules");
        let err = store.list_rules().unwrap_err();
        assert!(matches!(err, Error::Discovery(_)));
    }

    #[test]
    fn test_list_test_cases_ordering() {
        let (_tmp, store) = store_with_rules();
        let rule = RuleId::parse("CORE-000001").unwrap();
        let cases = store.list_test_cases(&rule).unwrap();
        let paths: Vec<String> = cases.iter().map(TestCaseRef::case_path).collect();
        assert_eq!(paths, vec!["positive/01", "negative/01", "negative/02"]);
    }

    #[test]
    fn test_unknown_rule() {
        let (_tmp, store) = store_with_rules();
        let rule = RuleId::parse("CG9999").unwrap();
        let err = store.list_test_cases(&rule).unwrap_err();
        assert!(matches!(err, Error::UnknownRule(_)));
    }

    #[test]
    fn test_rule_with_no_cases_is_discovery_error() {
        let (tmp, store) = store_with_rules();
        let empty = tmp.path().join("rules").join("CG0003");
        std::fs::create_dir_all(&empty).unwrap();
        let rule = RuleId::parse("CG0003").unwrap();
        let err = store.list_test_cases(&rule).unwrap_err();
        assert!(matches!(err, Error::Discovery(_)));
    }

    #[test]
    fn test_case_dirs_without_dataset_are_skipped() {
        let (tmp, store) = store_with_rules();
        // results/ directories and half-authored cases have no dataset.yaml
        let stray = tmp
            .path()
            .join("rules/CORE-000001/positive/02-draft");
        std::fs::create_dir_all(&stray).unwrap();
        let rule = RuleId::parse("CORE-000001").unwrap();
        let cases = store.list_test_cases(&rule).unwrap();
        assert_eq!(cases.len(), 3);
    }

    #[test]
    fn test_find_test_case() {
        let (_tmp, store) = store_with_rules();
        let rule = RuleId::parse("CORE-000001").unwrap();
        let found = store.find_test_case(&rule, "negative/02").unwrap();
        assert_eq!(found.name, "02");
        assert_eq!(found.category, Category::Negative);

        let err = store.find_test_case(&rule, "negative/09").unwrap_err();
        assert!(matches!(err, Error::UnknownTestCase { .. }));
    }

    #[test]
    fn test_load_test_case_through_store() {
        let (_tmp, store) = store_with_rules();
        let rule = RuleId::parse("CG0002").unwrap();
        let reference = store.find_test_case(&rule, "positive/01").unwrap();
        let case = store.load_test_case(&reference).unwrap();
        assert_eq!(case.expected.len(), 1);
        assert_eq!(case.expected[0].rule, rule);
    }

    #[test]
    fn test_rule_definition_lookup() {
        let (tmp, store) = store_with_rules();
        let rule = RuleId::parse("CORE-000001").unwrap();
        let def = store.rule_definition(&rule).unwrap();
        assert!(def.ends_with("CORE-000001/rule.yaml"));

        std::fs::remove_file(&def).unwrap();
        let err = store.rule_definition(&rule).unwrap_err();
        assert!(err.to_string().contains("rule.yaml"));
        drop(tmp);
    }

    #[test]
    fn test_results_dir_isolated_per_case() {
        let (_tmp, store) = store_with_rules();
        let rule = RuleId::parse("CORE-000001").unwrap();
        let a = store.find_test_case(&rule, "negative/01").unwrap();
        let b = store.find_test_case(&rule, "negative/02").unwrap();
        assert_ne!(store.results_dir(&a), store.results_dir(&b));
        assert!(store.results_dir(&a).ends_with("negative/01/results"));
    }
}
