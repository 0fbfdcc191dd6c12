//! Test-case input datasets
//!
//! A dataset is the set of records the engine evaluates for one test case,
//! stored as `dataset.yaml` in the case directory. Record values are opaque
//! to the harness; only record ids matter for matching findings.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One data record submitted to the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Stable record identifier, referenced by findings
    pub id: String,
    /// Variable name → value; passed through to the engine untouched
    #[serde(default)]
    pub values: BTreeMap<String, serde_yaml::Value>,
}

/// The input dataset for one test case
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Dataset {
    /// Records in fixture order
    pub records: Vec<Record>,
}

impl Dataset {
    /// Number of records
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset has no records
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether a record id is present
    #[must_use]
    pub fn contains(&self, record_id: &str) -> bool {
        self.records.iter().any(|r| r.id == record_id)
    }

    /// First record id that appears more than once, if any
    #[must_use]
    pub fn duplicate_id(&self) -> Option<&str> {
        let mut seen = std::collections::BTreeSet::new();
        self.records
            .iter()
            .find(|r| !seen.insert(r.id.as_str()))
            .map(|r| r.id.as_str())
    }
}
