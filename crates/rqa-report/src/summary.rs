//! Plain-text summary rendering
//!
//! The summary is a rendering of the structured document: verdict headline,
//! TP/FP/FN counts, then one line per discrepancy with the record id and
//! description a contributor needs to act.

use rqa_fixtures::Finding;
use rqa_harness::{CaseFailure, RunResult};

/// Render the human-readable summary for one result
#[must_use]
pub fn render_summary(result: &RunResult) -> String {
    let mut out = String::with_capacity(1024);

    out.push_str(&format!("{} {}\n", result.verdict, result.label()));
    out.push_str(&"=".repeat(60));
    out.push('\n');

    match (&result.classification, &result.failure) {
        (Some(c), _) => {
            let (tp, fp, fn_) = c.counts();
            out.push_str(&format!(
                "Expected findings: {}  Produced findings: {}\n",
                result.expected.len(),
                result.produced.len()
            ));
            out.push_str(&format!(
                "True positives: {tp}  False positives: {fp}  False negatives: {fn_}\n"
            ));

            push_findings(&mut out, "Matched (expected and produced)", &c.true_positives);
            push_findings(
                &mut out,
                "False positives (produced but not expected)",
                &c.false_positives,
            );
            push_findings(
                &mut out,
                "False negatives (expected but not produced)",
                &c.false_negatives,
            );
        }
        (None, Some(failure)) => {
            let kind = match failure {
                CaseFailure::Engine { .. } => "Engine invocation failed",
                CaseFailure::Fixture { .. } => "Fixture could not be loaded",
            };
            out.push_str(&format!("{kind}; findings were not classified.\n"));
            out.push_str(&format!("Detail: {}\n", failure.detail()));
        }
        (None, None) => {
            // Written results always carry one or the other; keep the
            // rendering total anyway.
            out.push_str("No classification recorded.\n");
        }
    }

    out.push_str(&format!(
        "\nEngine: {}  Host: {} ({})\nRecorded: {}\n",
        result.context.engine, result.context.hostname, result.context.os, result.timestamp
    ));

    out
}

fn push_findings(out: &mut String, title: &str, findings: &[Finding]) {
    if findings.is_empty() {
        return;
    }
    out.push_str(&format!("\n{title}:\n"));
    for finding in findings {
        match &finding.variable {
            Some(var) => out.push_str(&format!(
                "  - {} [{var}]: {}\n",
                finding.record,
                message_or_placeholder(finding)
            )),
            None => out.push_str(&format!(
                "  - {}: {}\n",
                finding.record,
                message_or_placeholder(finding)
            )),
        }
    }
}

fn message_or_placeholder(finding: &Finding) -> &str {
    if finding.message.is_empty() {
        "(no description)"
    } else {
        &finding.message
    }
}

/// One-line console rendering of a result, printed for every executed case
#[must_use]
pub fn console_line(result: &RunResult) -> String {
    let marker = if result.verdict.is_pass() {
        "[PASS]"
    } else {
        "[FAIL]"
    };
    match &result.failure {
        Some(failure) => format!("  {marker} {} ({})", result.label(), failure.detail()),
        None => {
            let (tp, fp, fn_) = result
                .classification
                .as_ref()
                .map_or((0, 0, 0), rqa_harness::Classification::counts);
            format!(
                "  {marker} {} (TP {tp}, FP {fp}, FN {fn_})",
                result.label()
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rqa_fixtures::{Category, RuleId, TestCaseRef};
    use rqa_harness::{classify, EngineFailure, RunContext, Verdict};
    use rqa_fixtures::MatchKeySchema;
    use std::path::PathBuf;

    fn rule() -> RuleId {
        RuleId::parse("CORE-000001").unwrap()
    }

    fn reference(category: Category) -> TestCaseRef {
        TestCaseRef {
            rule: rule(),
            category,
            name: "01".to_string(),
            dir: PathBuf::from("rules/CORE-000001"),
        }
    }

    fn context() -> RunContext {
        RunContext {
            hostname: "host".to_string(),
            os: "linux".to_string(),
            engine: "stub".to_string(),
            harness_version: "0.0.0".to_string(),
        }
    }

    #[test]
    fn test_pass_summary_headline() {
        let expected = vec![Finding::new("R2", rule(), "age out of range")];
        let c = classify(&expected, &expected, MatchKeySchema::Record);
        let result = rqa_harness::RunResult::classified(
            &reference(Category::Positive),
            expected.clone(),
            expected,
            c,
            context(),
        );

        let summary = render_summary(&result);
        assert!(summary.starts_with("PASS CORE-000001/positive/01"));
        assert!(summary.contains("True positives: 1  False positives: 0  False negatives: 0"));
        assert!(summary.contains("R2"));
    }

    #[test]
    fn test_fail_summary_lists_discrepancies() {
        let expected = vec![Finding::new("R2", rule(), "crafted to fire")];
        let produced = vec![Finding::new("R1", rule(), "spurious hit")];
        let c = classify(&expected, &produced, MatchKeySchema::Record);
        let result = rqa_harness::RunResult::classified(
            &reference(Category::Positive),
            expected,
            produced,
            c,
            context(),
        );

        let summary = render_summary(&result);
        assert!(summary.starts_with("FAIL"));
        assert!(summary.contains("False positives (produced but not expected):"));
        assert!(summary.contains("  - R1: spurious hit"));
        assert!(summary.contains("False negatives (expected but not produced):"));
        assert!(summary.contains("  - R2: crafted to fire"));
    }

    #[test]
    fn test_variable_rendered_when_present() {
        let produced = vec![Finding::new("R1", rule(), "bad value").with_variable("AGE")];
        let c = classify(&[], &produced, MatchKeySchema::Record);
        let result = rqa_harness::RunResult::classified(
            &reference(Category::Negative),
            Vec::new(),
            produced,
            c,
            context(),
        );
        assert!(render_summary(&result).contains("  - R1 [AGE]: bad value"));
    }

    #[test]
    fn test_engine_failure_summary() {
        let failure = EngineFailure::Failed {
            exit_code: 2,
            stderr: "malformed rule definition".to_string(),
        };
        let result = rqa_harness::RunResult::engine_failed(
            &reference(Category::Positive),
            Vec::new(),
            &failure,
            context(),
        );

        let summary = render_summary(&result);
        assert!(summary.starts_with("FAIL"));
        assert!(summary.contains("Engine invocation failed"));
        assert!(summary.contains("malformed rule definition"));
        assert!(!summary.contains("True positives"));
    }

    #[test]
    fn test_console_line_shapes() {
        let expected = vec![Finding::new("R2", rule(), "")];
        let c = classify(&expected, &expected, MatchKeySchema::Record);
        let pass = rqa_harness::RunResult::classified(
            &reference(Category::Positive),
            expected.clone(),
            expected,
            c,
            context(),
        );
        assert_eq!(pass.verdict, Verdict::Pass);
        assert_eq!(
            console_line(&pass),
            "  [PASS] CORE-000001/positive/01 (TP 1, FP 0, FN 0)"
        );

        let broken = rqa_harness::RunResult::fixture_failed(
            &reference(Category::Negative),
            "expected.yaml missing",
            context(),
        );
        let line = console_line(&broken);
        assert!(line.starts_with("  [FAIL] CORE-000001/negative/01"));
        assert!(line.contains("expected.yaml missing"));
    }
}
