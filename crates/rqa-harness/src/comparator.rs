//! Finding comparator
//!
//! Classifies produced findings against expected findings for one test
//! case under the case's declared match key. The verdict is strict set
//! equality over keys: any false positive or false negative fails the
//! case, with no partial credit.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use rqa_fixtures::{Finding, FindingKey, MatchKeySchema};

/// Pass/fail verdict for one test case
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    /// Expected and produced findings agree exactly
    Pass,
    /// Any divergence, or the engine could not run
    Fail,
}

impl Verdict {
    /// Whether this is a passing verdict
    #[must_use]
    pub fn is_pass(self) -> bool {
        matches!(self, Self::Pass)
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pass => write!(f, "PASS"),
            Self::Fail => write!(f, "FAIL"),
        }
    }
}

/// TP/FP/FN classification of one test case's findings
///
/// True positives carry the produced finding (the engine's own message);
/// false negatives carry the expected finding, since the engine produced
/// nothing to show for them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    /// Expected and produced
    pub true_positives: Vec<Finding>,
    /// Produced but not expected: the rule flagged an unexpected discrepancy
    pub false_positives: Vec<Finding>,
    /// Expected but not produced: the rule failed to flag a discrepancy
    pub false_negatives: Vec<Finding>,
}

impl Classification {
    /// The verdict implied by this classification
    #[must_use]
    pub fn verdict(&self) -> Verdict {
        if self.false_positives.is_empty() && self.false_negatives.is_empty() {
            Verdict::Pass
        } else {
            Verdict::Fail
        }
    }

    /// (TP, FP, FN) counts
    #[must_use]
    pub fn counts(&self) -> (usize, usize, usize) {
        (
            self.true_positives.len(),
            self.false_positives.len(),
            self.false_negatives.len(),
        )
    }
}

/// Classify produced findings P against expected findings E under a match key
///
/// Duplicate findings under the same key collapse to a single occurrence;
/// the first instance wins, in input order. Output vectors are sorted by
/// key so serialized results are deterministic across runs.
#[must_use]
pub fn classify(
    expected: &[Finding],
    produced: &[Finding],
    schema: MatchKeySchema,
) -> Classification {
    let expected_by_key = index_by_key(expected, schema);
    let produced_by_key = index_by_key(produced, schema);

    let mut classification = Classification::default();

    for (key, finding) in &produced_by_key {
        if expected_by_key.contains_key(key) {
            classification.true_positives.push((*finding).clone());
        } else {
            classification.false_positives.push((*finding).clone());
        }
    }
    for (key, finding) in &expected_by_key {
        if !produced_by_key.contains_key(key) {
            classification.false_negatives.push((*finding).clone());
        }
    }

    classification
}

fn index_by_key(
    findings: &[Finding],
    schema: MatchKeySchema,
) -> BTreeMap<FindingKey, &Finding> {
    let mut map = BTreeMap::new();
    for finding in findings {
        map.entry(finding.key(schema)).or_insert(finding);
    }
    map
}
