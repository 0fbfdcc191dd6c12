//! Run coordinator
//!
//! Resolves a selection of (rule, test case) targets, drives the engine and
//! comparator over each one in fixture enumeration order, hands every
//! result to the report sink, and aggregates the invocation's verdict.
//!
//! Selection is abstracted behind [`SelectionSource`] so flag-driven and
//! interactive invocations feed the same execution loop. Case-scoped
//! failures (malformed fixture, engine failure) become FAIL results and
//! never abort sibling cases; rule-scoped discovery failures in an
//! all-rules run are recorded and skipped.

use rqa_fixtures::{Error as FixtureError, FixtureStore, RuleId, TestCaseRef};

use crate::comparator::classify;
use crate::engine::RuleEngine;
use crate::error::Result;
use crate::result::{ReportSink, RunContext, RunResult, RunSummary};

/// What the operator asked to run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionMode {
    /// Every test case of one rule (`-r`)
    Rule(RuleId),
    /// One test case of one rule (`-r` + `-t category/name`)
    Case(RuleId, String),
    /// Every test case of every rule (`--all-rules`)
    AllRules,
}

/// A resolved selection
#[derive(Debug, Clone)]
pub enum Selection {
    /// The operator backed out; nothing runs, nothing is written
    Cancelled,
    /// Concrete targets plus any rules that failed to enumerate
    Targets {
        /// Test cases in execution order
        cases: Vec<TestCaseRef>,
        /// Rules whose case enumeration failed (all-rules mode only)
        rule_errors: Vec<(RuleId, String)>,
    },
}

/// Source of the target selection, pluggable per invocation
pub trait SelectionSource {
    /// Resolve the selection against the fixture store
    ///
    /// # Errors
    ///
    /// Returns an error for bad selections (unknown rule or case); the
    /// coordinator reports it before any execution is attempted.
    fn resolve(&mut self, store: &FixtureStore) -> Result<Selection>;
}

/// Selection derived from CLI flags
#[derive(Debug, Clone)]
pub struct FlagSelection {
    mode: SelectionMode,
}

impl FlagSelection {
    /// Create a flag-driven selection
    #[must_use]
    pub fn new(mode: SelectionMode) -> Self {
        Self { mode }
    }
}

impl SelectionSource for FlagSelection {
    fn resolve(&mut self, store: &FixtureStore) -> Result<Selection> {
        match &self.mode {
            SelectionMode::Rule(rule) => Ok(Selection::Targets {
                cases: store.list_test_cases(rule)?,
                rule_errors: Vec::new(),
            }),
            SelectionMode::Case(rule, case_path) => Ok(Selection::Targets {
                cases: vec![store.find_test_case(rule, case_path)?],
                rule_errors: Vec::new(),
            }),
            SelectionMode::AllRules => {
                let mut cases = Vec::new();
                let mut rule_errors = Vec::new();
                for rule in store.list_rules()? {
                    match store.list_test_cases(&rule) {
                        Ok(rule_cases) => cases.extend(rule_cases),
                        Err(e) => rule_errors.push((rule, e.to_string())),
                    }
                }
                Ok(Selection::Targets { cases, rule_errors })
            }
        }
    }
}

/// Drives one harness invocation
pub struct Coordinator<'a, E: RuleEngine> {
    store: &'a FixtureStore,
    engine: &'a E,
    context: RunContext,
}

impl<'a, E: RuleEngine> Coordinator<'a, E> {
    /// Create a coordinator over a store and an engine
    #[must_use]
    pub fn new(store: &'a FixtureStore, engine: &'a E, context: RunContext) -> Self {
        Self {
            store,
            engine,
            context,
        }
    }

    /// Resolve the selection and execute every target
    ///
    /// Returns `Ok(None)` when the selection source cancelled.
    ///
    /// # Errors
    ///
    /// Propagates selection errors (nothing was executed) and report-sink
    /// failures (already-recorded results stay on disk).
    pub fn run(
        &self,
        source: &mut dyn SelectionSource,
        sink: &mut dyn ReportSink,
    ) -> Result<Option<RunSummary>> {
        let (cases, rule_errors) = match source.resolve(self.store)? {
            Selection::Cancelled => return Ok(None),
            Selection::Targets { cases, rule_errors } => (cases, rule_errors),
        };

        let mut summary = RunSummary::new();
        for (rule, detail) in rule_errors {
            summary.push_rule_error(rule, detail);
        }

        for reference in cases {
            let result = self.execute_case(&reference);
            sink.record(&result, &self.store.results_dir(&reference))?;
            summary.push(result);
        }

        Ok(Some(summary))
    }

    /// Execute one test case; every failure mode folds into a RunResult
    fn execute_case(&self, reference: &TestCaseRef) -> RunResult {
        let case = match self.store.load_test_case(reference) {
            Ok(case) => case,
            Err(e) => return self.fixture_failure(reference, &e),
        };

        let rule_definition = match self.store.rule_definition(&reference.rule) {
            Ok(path) => path,
            Err(e) => return self.fixture_failure(reference, &e),
        };

        match self
            .engine
            .evaluate(&rule_definition, &case.dataset_path())
        {
            Ok(produced) => {
                let classification = classify(&case.expected, &produced, case.match_key);
                RunResult::classified(
                    reference,
                    case.expected,
                    produced,
                    classification,
                    self.context.clone(),
                )
            }
            Err(failure) => RunResult::engine_failed(
                reference,
                case.expected,
                &failure,
                self.context.clone(),
            ),
        }
    }

    fn fixture_failure(&self, reference: &TestCaseRef, error: &FixtureError) -> RunResult {
        RunResult::fixture_failed(reference, error.to_string(), self.context.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comparator::Verdict;
    use crate::engine::{EngineFailure, StubEngine};
    use crate::result::CaseFailure;
    use rqa_fixtures::Finding;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    /// Sink that remembers what it was asked to record.
    #[derive(Debug, Default)]
    struct MemorySink {
        recorded: Vec<(String, Verdict, PathBuf)>,
    }

    impl ReportSink for MemorySink {
        fn record(&mut self, result: &RunResult, results_dir: &Path) -> Result<()> {
            self.recorded
                .push((result.label(), result.verdict, results_dir.to_path_buf()));
            Ok(())
        }
    }

    fn seed(root: &Path, rule: &str, cases: &[(&str, &str, &str)]) {
        let rule_dir = root.join(rule);
        std::fs::create_dir_all(&rule_dir).unwrap();
        std::fs::write(rule_dir.join("rule.yaml"), "check: {}\n").unwrap();
        for (case, dataset, expected) in cases {
            let dir = rule_dir.join(case);
            std::fs::create_dir_all(&dir).unwrap();
            std::fs::write(dir.join("dataset.yaml"), dataset).unwrap();
            std::fs::write(dir.join("expected.yaml"), expected).unwrap();
        }
    }

    const THREE_RECORDS: &str = "records:\n  - id: R1\n  - id: R2\n  - id: R3\n";

    fn fixture_tree() -> (TempDir, FixtureStore) {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("rules");
        seed(
            &root,
            "CORE-000001",
            &[
                ("negative/01", THREE_RECORDS, "findings: []\n"),
                (
                    "positive/01",
                    THREE_RECORDS,
                    "findings:\n  - record: R2\n    message: crafted to fire\n",
                ),
            ],
        );
        let store = FixtureStore::new(root);
        (tmp, store)
    }

    fn rule() -> RuleId {
        RuleId::parse("CORE-000001").unwrap()
    }

    fn context() -> RunContext {
        RunContext {
            hostname: "host".to_string(),
            os: "linux".to_string(),
            engine: "stub".to_string(),
            harness_version: "0.0.0".to_string(),
        }
    }

    fn run_with(
        store: &FixtureStore,
        engine: &StubEngine,
        mode: SelectionMode,
    ) -> (RunSummary, MemorySink) {
        let coordinator = Coordinator::new(store, engine, context());
        let mut sink = MemorySink::default();
        let summary = coordinator
            .run(&mut FlagSelection::new(mode), &mut sink)
            .unwrap()
            .expect("not cancelled");
        (summary, sink)
    }

    #[test]
    fn test_negative_case_clean_engine_passes() {
        let (_tmp, store) = fixture_tree();
        let engine = StubEngine::new();
        let (summary, _) = run_with(
            &store,
            &engine,
            SelectionMode::Case(rule(), "negative/01".to_string()),
        );
        assert!(summary.success());
        assert_eq!(summary.results[0].verdict, Verdict::Pass);
        let c = summary.results[0].classification.as_ref().unwrap();
        assert_eq!(c.counts(), (0, 0, 0));
    }

    #[test]
    fn test_positive_case_expected_finding_passes() {
        let (_tmp, store) = fixture_tree();
        let engine = StubEngine::with_findings(vec![Finding::new("R2", rule(), "fired")]);
        let (summary, _) = run_with(
            &store,
            &engine,
            SelectionMode::Case(rule(), "positive/01".to_string()),
        );
        assert!(summary.success());
        let c = summary.results[0].classification.as_ref().unwrap();
        assert_eq!(c.counts(), (1, 0, 0));
        assert_eq!(c.true_positives[0].record, "R2");
    }

    #[test]
    fn test_extra_finding_fails_with_fp() {
        let (_tmp, store) = fixture_tree();
        let engine = StubEngine::with_findings(vec![
            Finding::new("R1", rule(), "unexpected"),
            Finding::new("R2", rule(), "fired"),
        ]);
        let (summary, _) = run_with(
            &store,
            &engine,
            SelectionMode::Case(rule(), "positive/01".to_string()),
        );
        assert!(!summary.success());
        let c = summary.results[0].classification.as_ref().unwrap();
        assert_eq!(c.counts(), (1, 1, 0));
        assert_eq!(c.false_positives[0].record, "R1");
        assert!(c.false_negatives.is_empty());
    }

    #[test]
    fn test_missing_finding_fails_with_fn() {
        let (_tmp, store) = fixture_tree();
        let engine = StubEngine::new();
        let (summary, _) = run_with(
            &store,
            &engine,
            SelectionMode::Case(rule(), "positive/01".to_string()),
        );
        assert!(!summary.success());
        let c = summary.results[0].classification.as_ref().unwrap();
        assert_eq!(c.counts(), (0, 0, 1));
        assert_eq!(c.false_negatives[0].record, "R2");
    }

    #[test]
    fn test_engine_failure_recorded_without_classification() {
        let (_tmp, store) = fixture_tree();
        let engine = StubEngine::with_failure(EngineFailure::Failed {
            exit_code: 2,
            stderr: "malformed rule definition".to_string(),
        });
        let (summary, _) = run_with(&store, &engine, SelectionMode::Rule(rule()));
        assert!(!summary.success());
        assert_eq!(summary.results.len(), 2);
        for result in &summary.results {
            assert_eq!(result.verdict, Verdict::Fail);
            assert!(result.classification.is_none());
            assert!(matches!(result.failure, Some(CaseFailure::Engine { .. })));
        }
    }

    #[test]
    fn test_malformed_fixture_does_not_abort_siblings() {
        let (tmp, store) = fixture_tree();
        // Break the positive case's annotation
        std::fs::write(
            tmp.path()
                .join("rules/CORE-000001/positive/01/expected.yaml"),
            "findings: []\n",
        )
        .unwrap();

        let engine = StubEngine::new();
        let (summary, sink) = run_with(&store, &engine, SelectionMode::Rule(rule()));

        // Both cases were driven: positive failed on its fixture, negative passed.
        assert_eq!(sink.recorded.len(), 2);
        assert_eq!(summary.passed(), 1);
        assert_eq!(summary.failed(), 1);
        let broken = summary
            .results
            .iter()
            .find(|r| r.case == "positive/01")
            .unwrap();
        assert!(matches!(broken.failure, Some(CaseFailure::Fixture { .. })));
    }

    #[test]
    fn test_all_rules_isolates_broken_rule() {
        let (tmp, store) = fixture_tree();
        // A rule directory with no cases at all
        std::fs::create_dir_all(tmp.path().join("rules/CG0009")).unwrap();

        let engine = StubEngine::with_findings(vec![Finding::new("R2", rule(), "fired")]);
        let (summary, _) = run_with(&store, &engine, SelectionMode::AllRules);

        assert_eq!(summary.rule_errors.len(), 1);
        assert_eq!(summary.rule_errors[0].rule.as_str(), "CG0009");
        // The healthy rule still ran both cases (negative gets the stub's
        // finding too, so it fails on an FP — but it ran).
        assert_eq!(summary.results.len(), 2);
        assert!(!summary.success());
    }

    #[test]
    fn test_unknown_rule_selection_reports_before_execution() {
        let (_tmp, store) = fixture_tree();
        let engine = StubEngine::new();
        let coordinator = Coordinator::new(&store, &engine, context());
        let mut sink = MemorySink::default();
        let err = coordinator
            .run(
                &mut FlagSelection::new(SelectionMode::Rule(RuleId::parse("CG9999").unwrap())),
                &mut sink,
            )
            .unwrap_err();
        assert!(err.to_string().contains("Unknown rule"));
        assert!(sink.recorded.is_empty());
    }

    #[test]
    fn test_unknown_case_selection() {
        let (_tmp, store) = fixture_tree();
        let engine = StubEngine::new();
        let coordinator = Coordinator::new(&store, &engine, context());
        let mut sink = MemorySink::default();
        let err = coordinator
            .run(
                &mut FlagSelection::new(SelectionMode::Case(rule(), "negative/99".to_string())),
                &mut sink,
            )
            .unwrap_err();
        assert!(err.to_string().contains("Unknown test case"));
        assert!(sink.recorded.is_empty());
    }

    #[test]
    fn test_cancelled_selection_runs_nothing() {
        struct AlwaysCancel;
        impl SelectionSource for AlwaysCancel {
            fn resolve(&mut self, _store: &FixtureStore) -> Result<Selection> {
                Ok(Selection::Cancelled)
            }
        }

        let (_tmp, store) = fixture_tree();
        let engine = StubEngine::new();
        let coordinator = Coordinator::new(&store, &engine, context());
        let mut sink = MemorySink::default();
        let outcome = coordinator.run(&mut AlwaysCancel, &mut sink).unwrap();
        assert!(outcome.is_none());
        assert!(sink.recorded.is_empty());
    }

    #[test]
    fn test_results_routed_to_isolated_dirs() {
        let (_tmp, store) = fixture_tree();
        let engine = StubEngine::new();
        let (_, sink) = run_with(&store, &engine, SelectionMode::Rule(rule()));
        assert_eq!(sink.recorded.len(), 2);
        assert_ne!(sink.recorded[0].2, sink.recorded[1].2);
        for (_, _, dir) in &sink.recorded {
            assert!(dir.ends_with("results"));
        }
    }

    #[test]
    fn test_execution_follows_enumeration_order() {
        let (_tmp, store) = fixture_tree();
        let engine = StubEngine::new();
        let (_, sink) = run_with(&store, &engine, SelectionMode::Rule(rule()));
        let labels: Vec<&str> = sink.recorded.iter().map(|(l, _, _)| l.as_str()).collect();
        assert_eq!(
            labels,
            vec!["CORE-000001/positive/01", "CORE-000001/negative/01"]
        );
    }
}
