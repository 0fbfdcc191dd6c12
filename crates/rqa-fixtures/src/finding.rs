//! Findings and the match-key schema
//!
//! A finding flags one record for one rule. Expected and produced findings
//! are compared under a match key declared once per test case; fields
//! outside the key (the message, any metadata) are informational only.

use serde::{Deserialize, Serialize};

use crate::rule::RuleId;

/// Which fields participate in finding identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchKeySchema {
    /// Key = (record id, rule id)
    #[default]
    Record,
    /// Key = (record id, rule id, variable name), for rules that flag
    /// individual variables within one record
    RecordVariable,
}

impl MatchKeySchema {
    /// Whether the variable field is part of the key
    #[must_use]
    pub fn includes_variable(self) -> bool {
        matches!(self, Self::RecordVariable)
    }
}

impl std::fmt::Display for MatchKeySchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Record => write!(f, "record"),
            Self::RecordVariable => write!(f, "record-variable"),
        }
    }
}

/// A discrepancy flag on a specific record, produced by the engine or
/// expected by the fixture author
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// Stable identifier of the flagged record
    pub record: String,
    /// Rule that fired (or is expected to fire)
    pub rule: RuleId,
    /// Variable within the record, when the rule flags one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variable: Option<String>,
    /// Human-readable discrepancy description; never part of the match key
    #[serde(default)]
    pub message: String,
}

impl Finding {
    /// Create a record-level finding
    #[must_use]
    pub fn new(record: impl Into<String>, rule: RuleId, message: impl Into<String>) -> Self {
        Self {
            record: record.into(),
            rule,
            variable: None,
            message: message.into(),
        }
    }

    /// Attach a variable name
    #[must_use]
    pub fn with_variable(mut self, variable: impl Into<String>) -> Self {
        self.variable = Some(variable.into());
        self
    }

    /// Project this finding onto the declared match key
    #[must_use]
    pub fn key(&self, schema: MatchKeySchema) -> FindingKey {
        FindingKey {
            record: self.record.clone(),
            rule: self.rule.clone(),
            variable: if schema.includes_variable() {
                self.variable.clone()
            } else {
                None
            },
        }
    }
}

/// The identity of a finding under a match-key schema
///
/// Ordered so that classified findings serialize deterministically.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FindingKey {
    /// Record id component
    pub record: String,
    /// Rule id component
    pub rule: RuleId,
    /// Variable component; `None` unless the schema declares it
    pub variable: Option<String>,
}

impl std::fmt::Display for FindingKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.variable {
            Some(var) => write!(f, "{}:{}:{var}", self.record, self.rule),
            None => write!(f, "{}:{}", self.record, self.rule),
        }
    }
}
