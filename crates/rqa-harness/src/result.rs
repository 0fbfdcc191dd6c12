//! Run results and per-invocation aggregation
//!
//! One [`RunResult`] is produced per executed (rule, test case) pair and is
//! the unit the reporter persists. [`RunSummary`] aggregates a single
//! invocation and exists only for its duration.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

use rqa_fixtures::{Finding, RuleId, TestCaseRef};

use crate::comparator::{Classification, Verdict};
use crate::engine::EngineFailure;
use crate::error::Result;

/// Why a case failed without a classification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum CaseFailure {
    /// The engine could not run or its output was unusable
    Engine {
        /// Diagnostic detail from the adapter
        detail: String,
    },
    /// The fixture itself was malformed
    Fixture {
        /// What was wrong with the fixture
        detail: String,
    },
}

impl CaseFailure {
    /// Build from an engine failure
    #[must_use]
    pub fn engine(failure: &EngineFailure) -> Self {
        Self::Engine {
            detail: failure.to_string(),
        }
    }

    /// Diagnostic text regardless of kind
    #[must_use]
    pub fn detail(&self) -> &str {
        match self {
            Self::Engine { detail } | Self::Fixture { detail } => detail,
        }
    }
}

/// Invocation-scoped context recorded into every result for auditability
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunContext {
    /// Host the run executed on
    pub hostname: String,
    /// Operating system
    pub os: String,
    /// Engine identity (binary name or version string)
    pub engine: String,
    /// Harness version
    pub harness_version: String,
}

impl RunContext {
    /// Detect the local context for a given engine identity
    #[must_use]
    pub fn detect(engine: impl Into<String>) -> Self {
        Self {
            hostname: hostname::get().map_or_else(
                |_| "unknown".to_string(),
                |h| h.to_string_lossy().to_string(),
            ),
            os: std::env::consts::OS.to_string(),
            engine: engine.into(),
            harness_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// The outcome of executing one (rule, test case) pair
///
/// Immutable once created; the timestamp is the only field exempt from the
/// byte-for-byte idempotence guarantee on re-runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    /// Rule that was executed
    pub rule: RuleId,
    /// `category/name` of the test case
    pub case: String,
    /// Final verdict
    pub verdict: Verdict,
    /// Author-expected findings
    pub expected: Vec<Finding>,
    /// Engine-produced findings
    pub produced: Vec<Finding>,
    /// TP/FP/FN classification; absent when the case failed before
    /// comparison
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classification: Option<Classification>,
    /// Failure detail when no classification was attempted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<CaseFailure>,
    /// Where and with what the run happened
    pub context: RunContext,
    /// When the result was created
    pub timestamp: DateTime<Utc>,
}

impl RunResult {
    /// Result for a case that was compared normally
    #[must_use]
    pub fn classified(
        reference: &TestCaseRef,
        expected: Vec<Finding>,
        produced: Vec<Finding>,
        classification: Classification,
        context: RunContext,
    ) -> Self {
        Self {
            rule: reference.rule.clone(),
            case: reference.case_path(),
            verdict: classification.verdict(),
            expected,
            produced,
            classification: Some(classification),
            failure: None,
            context,
            timestamp: Utc::now(),
        }
    }

    /// Result for a case whose engine invocation failed
    #[must_use]
    pub fn engine_failed(
        reference: &TestCaseRef,
        expected: Vec<Finding>,
        failure: &EngineFailure,
        context: RunContext,
    ) -> Self {
        Self {
            rule: reference.rule.clone(),
            case: reference.case_path(),
            verdict: Verdict::Fail,
            expected,
            produced: Vec::new(),
            classification: None,
            failure: Some(CaseFailure::engine(failure)),
            context,
            timestamp: Utc::now(),
        }
    }

    /// Result for a case whose fixture could not be loaded
    #[must_use]
    pub fn fixture_failed(
        reference: &TestCaseRef,
        detail: impl Into<String>,
        context: RunContext,
    ) -> Self {
        Self {
            rule: reference.rule.clone(),
            case: reference.case_path(),
            verdict: Verdict::Fail,
            expected: Vec::new(),
            produced: Vec::new(),
            classification: None,
            failure: Some(CaseFailure::Fixture {
                detail: detail.into(),
            }),
            context,
            timestamp: Utc::now(),
        }
    }

    /// `rule/category/name` label
    #[must_use]
    pub fn label(&self) -> String {
        format!("{}/{}", self.rule, self.case)
    }
}

/// A rule-level failure that prevented its cases from running
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleError {
    /// The affected rule
    pub rule: RuleId,
    /// Why its cases could not be enumerated
    pub detail: String,
}

/// Aggregate of one harness invocation
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Results in execution order
    pub results: Vec<RunResult>,
    /// Rules whose discovery failed; their cases never ran
    pub rule_errors: Vec<RuleError>,
}

impl RunSummary {
    /// Create an empty summary
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one case result
    pub fn push(&mut self, result: RunResult) {
        self.results.push(result);
    }

    /// Record a rule-level discovery failure
    pub fn push_rule_error(&mut self, rule: RuleId, detail: impl Into<String>) {
        self.rule_errors.push(RuleError {
            rule,
            detail: detail.into(),
        });
    }

    /// Number of passing cases
    #[must_use]
    pub fn passed(&self) -> usize {
        self.results.iter().filter(|r| r.verdict.is_pass()).count()
    }

    /// Number of failing cases
    #[must_use]
    pub fn failed(&self) -> usize {
        self.results.len() - self.passed()
    }

    /// Overall success: every case passed and no rule-level failure occurred
    #[must_use]
    pub fn success(&self) -> bool {
        self.rule_errors.is_empty() && self.results.iter().all(|r| r.verdict.is_pass())
    }
}

/// Destination for per-case results
///
/// The coordinator hands each [`RunResult`] to a sink together with the
/// case's isolated results directory; the file reporter lives in the
/// report crate, tests use an in-memory sink.
pub trait ReportSink {
    /// Persist or present one result
    ///
    /// # Errors
    ///
    /// Returns an error when the result could not be recorded; the
    /// coordinator propagates it without touching sibling cases' output.
    fn record(&mut self, result: &RunResult, results_dir: &Path) -> Result<()>;
}
