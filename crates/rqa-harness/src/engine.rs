//! Engine adapter
//!
//! The external rule-evaluation engine is invoked through the [`RuleEngine`]
//! trait so the rest of the harness can be exercised against a scripted
//! stub. The contract is deliberately narrow: a rule definition and a
//! dataset go in, a list of findings or a failure comes out. A clean run
//! with zero findings is `Ok(vec![])`; it is never folded into the failure
//! path.

use std::path::Path;
use std::process::Command;

use serde::Deserialize;
use thiserror::Error;

use rqa_fixtures::{Finding, RuleId};

/// Environment variable through which the timeout knob reaches the engine.
/// The harness itself never kills the child process.
pub const ENGINE_TIMEOUT_ENV: &str = "RQA_ENGINE_TIMEOUT_MS";

/// Ways an engine invocation can fail
///
/// Distinct from "ran and found nothing": every variant here means no
/// trustworthy findings were obtained.
#[derive(Debug, Clone, Error)]
pub enum EngineFailure {
    /// The engine process could not be started at all
    #[error("engine could not be spawned: {0}")]
    Spawn(String),

    /// The engine ran and exited non-zero
    #[error("engine exited with code {exit_code}: {stderr}")]
    Failed {
        /// Exit code (-1 when terminated by signal)
        exit_code: i32,
        /// Captured stderr, trimmed
        stderr: String,
    },

    /// The engine exited zero but its output was not valid findings JSON
    #[error("engine output unparsable: {0}")]
    UnparsableOutput(String),
}

/// Black-box boundary to the external rule engine
pub trait RuleEngine {
    /// Evaluate one rule against one dataset
    ///
    /// # Errors
    ///
    /// Returns an [`EngineFailure`] when the engine could not run or its
    /// output could not be trusted; `Ok(vec![])` is a clean zero-findings
    /// run.
    fn evaluate(
        &self,
        rule_definition: &Path,
        dataset: &Path,
    ) -> std::result::Result<Vec<Finding>, EngineFailure>;

    /// Short identity string recorded in run results
    fn describe(&self) -> String;
}

/// Wire shape of one finding on the engine's stdout
#[derive(Debug, Deserialize)]
struct WireFinding {
    record: String,
    rule: RuleId,
    #[serde(default)]
    variable: Option<String>,
    #[serde(default)]
    message: String,
}

impl From<WireFinding> for Finding {
    fn from(w: WireFinding) -> Self {
        Self {
            record: w.record,
            rule: w.rule,
            variable: w.variable,
            message: w.message,
        }
    }
}

/// Engine adapter that shells out to the engine binary
///
/// Invocation shape:
/// `<binary> evaluate --rule <rule.yaml> --dataset <dataset.yaml> --format json`
#[derive(Debug, Clone)]
pub struct ProcessEngine {
    binary: String,
    timeout_ms: Option<u64>,
}

impl ProcessEngine {
    /// Create an adapter for the given engine binary
    #[must_use]
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            timeout_ms: None,
        }
    }

    /// Export a timeout to the engine process
    #[must_use]
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    /// The configured binary name or path
    #[must_use]
    pub fn binary(&self) -> &str {
        &self.binary
    }
}

impl RuleEngine for ProcessEngine {
    fn evaluate(
        &self,
        rule_definition: &Path,
        dataset: &Path,
    ) -> std::result::Result<Vec<Finding>, EngineFailure> {
        let mut cmd = Command::new(&self.binary);
        cmd.arg("evaluate")
            .arg("--rule")
            .arg(rule_definition)
            .arg("--dataset")
            .arg(dataset)
            .arg("--format")
            .arg("json");
        if let Some(ms) = self.timeout_ms {
            cmd.env(ENGINE_TIMEOUT_ENV, ms.to_string());
        }

        let output = cmd
            .output()
            .map_err(|e| EngineFailure::Spawn(format!("{}: {e}", self.binary)))?;

        if !output.status.success() {
            return Err(EngineFailure::Failed {
                exit_code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        parse_findings(&String::from_utf8_lossy(&output.stdout))
    }

    fn describe(&self) -> String {
        self.binary.clone()
    }
}

/// Parse the engine's stdout into findings
///
/// # Errors
///
/// Returns `EngineFailure::UnparsableOutput` when stdout is not a JSON
/// array of findings.
pub fn parse_findings(stdout: &str) -> std::result::Result<Vec<Finding>, EngineFailure> {
    let trimmed = stdout.trim();
    if trimmed.is_empty() {
        // An engine that prints nothing on success is reporting zero findings.
        return Ok(Vec::new());
    }
    let wire: Vec<WireFinding> = serde_json::from_str(trimmed)
        .map_err(|e| EngineFailure::UnparsableOutput(e.to_string()))?;
    Ok(wire.into_iter().map(Finding::from).collect())
}

/// Query the engine binary's version string, falling back to `"unknown"`
///
/// Mirrors how the harness records its own version: purely informational,
/// recorded into the run context for auditability.
#[must_use]
pub fn engine_version(binary: &str) -> String {
    Command::new(binary)
        .arg("--version")
        .output()
        .ok()
        .filter(|o| o.status.success())
        .map(|o| String::from_utf8_lossy(&o.stdout).trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Scripted engine for tests
///
/// Responds with a fixed outcome regardless of input, or per-rule outcomes
/// when configured with [`StubEngine::respond`].
#[derive(Debug, Clone, Default)]
pub struct StubEngine {
    default_findings: Vec<Finding>,
    failure: Option<EngineFailure>,
    per_rule: Vec<(RuleId, Vec<Finding>)>,
}

impl StubEngine {
    /// An engine that always reports zero findings
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// An engine that always reports the given findings
    #[must_use]
    pub fn with_findings(findings: Vec<Finding>) -> Self {
        Self {
            default_findings: findings,
            ..Self::default()
        }
    }

    /// An engine that always fails
    #[must_use]
    pub fn with_failure(failure: EngineFailure) -> Self {
        Self {
            failure: Some(failure),
            ..Self::default()
        }
    }

    /// Script findings for one rule; other rules get the default response
    #[must_use]
    pub fn respond(mut self, rule: RuleId, findings: Vec<Finding>) -> Self {
        self.per_rule.push((rule, findings));
        self
    }
}

impl RuleEngine for StubEngine {
    fn evaluate(
        &self,
        rule_definition: &Path,
        _dataset: &Path,
    ) -> std::result::Result<Vec<Finding>, EngineFailure> {
        if let Some(failure) = &self.failure {
            return Err(failure.clone());
        }
        // Rule definitions live at rules/<RULE>/rule.yaml, so the parent
        // directory name is the rule id.
        let rule_id = rule_definition
            .parent()
            .and_then(Path::file_name)
            .map(|n| n.to_string_lossy().into_owned());
        if let Some(id) = rule_id {
            for (rule, findings) in &self.per_rule {
                if rule.as_str() == id {
                    return Ok(findings.clone());
                }
            }
        }
        Ok(self.default_findings.clone())
    }

    fn describe(&self) -> String {
        "stub".to_string()
    }
}
