//! Rule QA CLI Library
//!
//! Selection building and console flow for the `rqa` binary. The
//! interactive prompt is implemented as a [`SelectionSource`] over generic
//! reader/writer handles so it can be tested without a terminal.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::doc_markdown)]
// Allow common patterns in test code
#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

use std::io::{BufRead, Write};

use rqa_fixtures::{FixtureStore, RuleId, TestCaseRef};
use rqa_harness::{Result, Selection, SelectionMode, SelectionSource, RunSummary};

/// Build the selection mode implied by the CLI flags
///
/// Returns `Ok(None)` when no selection flag was given, which sends the
/// invocation down the interactive path. Flag conflicts are rejected by
/// clap before this runs; rule-id syntax is validated here.
///
/// # Errors
///
/// Returns a message for the operator when the rule id is malformed.
pub fn selection_from_flags(
    rule: Option<&str>,
    test_case: Option<&str>,
    all_rules: bool,
) -> std::result::Result<Option<SelectionMode>, String> {
    if all_rules {
        return Ok(Some(SelectionMode::AllRules));
    }
    let Some(rule) = rule else {
        return Ok(None);
    };
    let rule = RuleId::parse(rule).map_err(|e| e.to_string())?;
    Ok(Some(match test_case {
        Some(case_path) => SelectionMode::Case(rule, case_path.to_string()),
        None => SelectionMode::Rule(rule),
    }))
}

/// Interactive selection over arbitrary IO handles
///
/// Prompts for a rule (by number or id), then for a test case
/// (`category/name`, or empty for every case of the rule). Empty or
/// unrecognized input at either prompt cancels the invocation cleanly:
/// nothing executes and nothing is written.
pub struct PromptSelection<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> PromptSelection<R, W> {
    /// Create a prompt over the given handles
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn read_line(&mut self) -> Result<String> {
        let mut line = String::new();
        self.input
            .read_line(&mut line)
            .map_err(rqa_harness::Error::from)?;
        Ok(line.trim().to_string())
    }

    fn pick_rule(&mut self, rules: &[RuleId]) -> Result<Option<RuleId>> {
        writeln!(self.output, "\nAvailable rules:").map_err(rqa_harness::Error::from)?;
        for (i, rule) in rules.iter().enumerate() {
            writeln!(self.output, "  {}. {rule}", i + 1).map_err(rqa_harness::Error::from)?;
        }
        write!(
            self.output,
            "\nSelect a rule (number or id, empty to cancel): "
        )
        .map_err(rqa_harness::Error::from)?;
        self.output.flush().map_err(rqa_harness::Error::from)?;

        let choice = self.read_line()?;
        if choice.is_empty() {
            return Ok(None);
        }
        if let Ok(number) = choice.parse::<usize>() {
            if number >= 1 && number <= rules.len() {
                return Ok(Some(rules[number - 1].clone()));
            }
            writeln!(self.output, "No rule numbered {number}.")
                .map_err(rqa_harness::Error::from)?;
            return Ok(None);
        }
        if let Some(rule) = rules.iter().find(|r| r.as_str() == choice) {
            return Ok(Some(rule.clone()));
        }
        writeln!(self.output, "No rule named {choice}.").map_err(rqa_harness::Error::from)?;
        Ok(None)
    }

    fn pick_cases(&mut self, cases: Vec<TestCaseRef>) -> Result<Option<Vec<TestCaseRef>>> {
        writeln!(self.output, "\nTest cases:").map_err(rqa_harness::Error::from)?;
        for case in &cases {
            writeln!(self.output, "  {}", case.case_path()).map_err(rqa_harness::Error::from)?;
        }
        write!(
            self.output,
            "\nSelect a test case (category/name, empty for all): "
        )
        .map_err(rqa_harness::Error::from)?;
        self.output.flush().map_err(rqa_harness::Error::from)?;

        let choice = self.read_line()?;
        if choice.is_empty() {
            return Ok(Some(cases));
        }
        match cases.into_iter().find(|c| c.case_path() == choice) {
            Some(case) => Ok(Some(vec![case])),
            None => {
                writeln!(self.output, "No test case {choice}.")
                    .map_err(rqa_harness::Error::from)?;
                Ok(None)
            }
        }
    }
}

impl<R: BufRead, W: Write> SelectionSource for PromptSelection<R, W> {
    fn resolve(&mut self, store: &FixtureStore) -> Result<Selection> {
        let rules = store.list_rules()?;
        if rules.is_empty() {
            writeln!(
                self.output,
                "No rules found in {}.",
                store.root().display()
            )
            .map_err(rqa_harness::Error::from)?;
            return Ok(Selection::Cancelled);
        }

        let Some(rule) = self.pick_rule(&rules)? else {
            return Ok(Selection::Cancelled);
        };

        let cases = store.list_test_cases(&rule)?;
        match self.pick_cases(cases)? {
            Some(cases) => Ok(Selection::Targets {
                cases,
                rule_errors: Vec::new(),
            }),
            None => Ok(Selection::Cancelled),
        }
    }
}

/// Print the end-of-run summary block and return the process exit code
pub fn print_run_summary(summary: &RunSummary) -> i32 {
    println!("\n=== Run Summary ===");
    println!("  Cases executed: {}", summary.results.len());
    println!("  Passed: {}", summary.passed());
    println!("  Failed: {}", summary.failed());

    if !summary.rule_errors.is_empty() {
        println!("  Rules skipped (discovery errors): {}", summary.rule_errors.len());
        for err in &summary.rule_errors {
            println!("    {} - {}", err.rule, err.detail);
        }
    }

    if summary.success() {
        println!("\nOverall: PASS");
        0
    } else {
        println!("\nOverall: FAIL");
        1
    }
}
