//! Test cases and the expected-findings annotation
//!
//! A test case pairs an input dataset with the findings its author expects
//! the engine to produce. Positive cases must expect at least one finding;
//! negative cases must expect none. Both invariants are checked at load
//! time so a broken fixture can never masquerade as a pass.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::dataset::Dataset;
use crate::error::{Error, Result};
use crate::finding::{Finding, MatchKeySchema};
use crate::rule::RuleId;

/// Test-case category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// The rule is expected to fire on crafted records
    Positive,
    /// The rule must not fire at all
    Negative,
}

impl Category {
    /// Both categories, in enumeration order
    #[must_use]
    pub const fn all() -> [Self; 2] {
        [Self::Positive, Self::Negative]
    }

    /// Directory name for this category
    #[must_use]
    pub const fn dir_name(&self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
        }
    }

    /// Parse a category from its directory name
    ///
    /// # Errors
    ///
    /// Returns `Error::Discovery` for anything other than `positive` or
    /// `negative`.
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "positive" => Ok(Self::Positive),
            "negative" => Ok(Self::Negative),
            other => Err(Error::Discovery(format!(
                "invalid test category: {other} (expected positive or negative)"
            ))),
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// Reference to one test case in the fixture tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCaseRef {
    /// Owning rule
    pub rule: RuleId,
    /// Positive or negative
    pub category: Category,
    /// Case name, e.g. `01`
    pub name: String,
    /// Absolute or root-relative case directory
    pub dir: PathBuf,
}

impl TestCaseRef {
    /// `rule/category/name` label used in console output and errors
    #[must_use]
    pub fn label(&self) -> String {
        format!("{}/{}/{}", self.rule, self.category, self.name)
    }

    /// `category/name` sub-path, the form taken by the `-t` flag
    #[must_use]
    pub fn case_path(&self) -> String {
        format!("{}/{}", self.category, self.name)
    }
}

/// The expected-findings annotation as it appears in `expected.yaml`
///
/// The rule id is implied by the fixture location and injected at load
/// time, so authors only write record/variable/message.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ExpectedAnnotation {
    /// Declared match-key schema, shared by expected and produced findings
    #[serde(default)]
    match_key: MatchKeySchema,
    /// Expected findings; empty for negative cases
    #[serde(default)]
    findings: Vec<ExpectedFindingSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ExpectedFindingSpec {
    record: String,
    #[serde(default)]
    variable: Option<String>,
    #[serde(default)]
    message: String,
}

/// A fully materialized test case
#[derive(Debug, Clone)]
pub struct TestCase {
    /// Where this case lives
    pub reference: TestCaseRef,
    /// Input records for the engine
    pub dataset: Dataset,
    /// Author-expected findings, rule id injected
    pub expected: Vec<Finding>,
    /// Declared match-key schema
    pub match_key: MatchKeySchema,
}

impl TestCase {
    /// Load and validate a test case from its directory
    ///
    /// # Errors
    ///
    /// Returns `Error::MalformedFixture` when the dataset or annotation is
    /// absent, unparsable, or inconsistent (see crate docs for the
    /// category invariants).
    pub fn load(reference: TestCaseRef) -> Result<Self> {
        let label = reference.label();

        let dataset = load_yaml::<Dataset>(&reference.dir.join("dataset.yaml"), &label, "dataset")?;
        if dataset.is_empty() {
            return Err(Error::malformed(&label, "dataset has no records"));
        }
        if let Some(dup) = dataset.duplicate_id() {
            return Err(Error::malformed(
                &label,
                format!("duplicate record id {dup} in dataset"),
            ));
        }

        let annotation = load_yaml::<ExpectedAnnotation>(
            &reference.dir.join("expected.yaml"),
            &label,
            "expected findings annotation",
        )?;

        match reference.category {
            Category::Positive if annotation.findings.is_empty() => {
                return Err(Error::malformed(
                    &label,
                    "positive case declares no expected findings",
                ));
            }
            Category::Negative if !annotation.findings.is_empty() => {
                return Err(Error::malformed(
                    &label,
                    format!(
                        "negative case declares {} expected finding(s); negative cases must expect none",
                        annotation.findings.len()
                    ),
                ));
            }
            _ => {}
        }

        let mut expected = Vec::with_capacity(annotation.findings.len());
        for spec in annotation.findings {
            if !dataset.contains(&spec.record) {
                return Err(Error::malformed(
                    &label,
                    format!("expected finding references unknown record {}", spec.record),
                ));
            }
            if annotation.match_key.includes_variable() && spec.variable.is_none() {
                return Err(Error::malformed(
                    &label,
                    format!(
                        "match key is {} but expected finding for {} declares no variable",
                        annotation.match_key, spec.record
                    ),
                ));
            }
            expected.push(Finding {
                record: spec.record,
                rule: reference.rule.clone(),
                variable: spec.variable,
                message: spec.message,
            });
        }

        Ok(Self {
            reference,
            dataset,
            expected,
            match_key: annotation.match_key,
        })
    }

    /// Path of this case's dataset file, handed to the engine
    #[must_use]
    pub fn dataset_path(&self) -> PathBuf {
        self.reference.dir.join("dataset.yaml")
    }
}

fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path, label: &str, what: &str) -> Result<T> {
    if !path.exists() {
        return Err(Error::malformed(label, format!("{what} missing ({})", file_name(path))));
    }
    let content = std::fs::read_to_string(path)?;
    serde_yaml::from_str(&content)
        .map_err(|e| Error::malformed(label, format!("{what} unparsable: {e}")))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
