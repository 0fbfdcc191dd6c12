//! Rule QA CLI
//!
//! Contributor-facing entry point: select rule/test-case targets (by flag
//! or interactively), drive the external engine over them, and persist
//! per-case verdicts. The process exits zero only when every selected
//! case passed.

#![forbid(unsafe_code)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::ptr_arg)]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use rqa_cli::{print_run_summary, selection_from_flags, PromptSelection};
use rqa_fixtures::{FixtureStore, RuleId};
use rqa_harness::{
    engine_version, Coordinator, FlagSelection, ProcessEngine, RunContext, SelectionSource,
};
use rqa_report::FileReporter;

#[derive(Parser)]
#[command(name = "rqa")]
#[command(about = "Regression harness for conformance rule fixtures", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute test cases and judge the engine's findings
    Run {
        /// Root of the rules fixture tree
        #[arg(long, default_value = "rules")]
        rules_dir: PathBuf,

        /// Rule to test (e.g. CORE-000123); prompts when omitted
        #[arg(short = 'r', long = "rule")]
        rule: Option<String>,

        /// Test case sub-path (e.g. negative/01); requires --rule
        #[arg(short = 't', long = "test-case", requires = "rule")]
        test_case: Option<String>,

        /// Run every test case of every rule
        #[arg(long, conflicts_with_all = ["rule", "test_case"])]
        all_rules: bool,

        /// Mirror full per-case summaries to the console
        #[arg(short, long)]
        verbose: bool,

        /// Engine binary to invoke
        #[arg(long, default_value = "conform")]
        engine: String,

        /// Timeout exported to the engine process, in milliseconds
        #[arg(long)]
        timeout_ms: Option<u64>,
    },

    /// List rules and test cases in the fixture tree
    List {
        /// Root of the rules fixture tree
        #[arg(long, default_value = "rules")]
        rules_dir: PathBuf,

        /// Show the test cases of one rule
        #[arg(short = 'r', long = "rule")]
        rule: Option<String>,
    },
}

/// Exit immediately on SIGINT; per-case atomic writes guarantee that
/// already-recorded results stay intact and the in-flight case leaves no
/// partial output behind.
fn setup_signal_handler() {
    if let Err(e) = ctrlc::set_handler(|| {
        eprintln!("\nInterrupted. Completed results are preserved.");
        std::process::exit(130); // 128 + SIGINT(2)
    }) {
        eprintln!("Warning: failed to set signal handler: {e}");
    }
}

fn main() {
    setup_signal_handler();

    let cli = Cli::parse();
    let code = match cli.command {
        Commands::Run {
            rules_dir,
            rule,
            test_case,
            all_rules,
            verbose,
            engine,
            timeout_ms,
        } => run(
            &rules_dir,
            rule.as_deref(),
            test_case.as_deref(),
            all_rules,
            verbose,
            &engine,
            timeout_ms,
        ),
        Commands::List { rules_dir, rule } => list(&rules_dir, rule.as_deref()),
    };
    std::process::exit(code);
}

#[allow(clippy::fn_params_excessive_bools)]
fn run(
    rules_dir: &PathBuf,
    rule: Option<&str>,
    test_case: Option<&str>,
    all_rules: bool,
    verbose: bool,
    engine_binary: &str,
    timeout_ms: Option<u64>,
) -> i32 {
    let mode = match selection_from_flags(rule, test_case, all_rules) {
        Ok(mode) => mode,
        Err(e) => {
            eprintln!("{e}");
            return 1;
        }
    };

    let store = FixtureStore::new(rules_dir);
    let mut engine = ProcessEngine::new(engine_binary);
    if let Some(ms) = timeout_ms {
        engine = engine.with_timeout_ms(ms);
    }

    let engine_label = match engine_version(engine_binary) {
        v if v == "unknown" => engine_binary.to_string(),
        v => v,
    };
    let context = RunContext::detect(engine_label);

    println!("Rules directory: {}", rules_dir.display());
    println!("Engine: {}", context.engine);
    if let Some(ms) = timeout_ms {
        println!("Engine timeout: {ms}ms");
    }

    let coordinator = Coordinator::new(&store, &engine, context);
    let mut reporter = if verbose {
        FileReporter::new().verbose()
    } else {
        FileReporter::new()
    };

    let outcome = match mode {
        Some(mode) => coordinator.run(&mut FlagSelection::new(mode), &mut reporter),
        None => {
            let stdin = std::io::stdin();
            let stdout = std::io::stdout();
            let mut prompt = PromptSelection::new(stdin.lock(), stdout.lock());
            // Resolve interactively first so the prompt releases stdout
            // before per-case reporting starts.
            match prompt.resolve(&store) {
                Ok(selection) => {
                    drop(prompt);
                    let mut resolved = Resolved(selection);
                    coordinator.run(&mut resolved, &mut reporter)
                }
                Err(e) => Err(e),
            }
        }
    };

    match outcome {
        Ok(Some(summary)) => print_run_summary(&summary),
        Ok(None) => {
            println!("Nothing selected.");
            0
        }
        Err(e) => {
            eprintln!("{e}");
            1
        }
    }
}

/// Adapter feeding an already-resolved selection back into the coordinator
struct Resolved(rqa_harness::Selection);

impl SelectionSource for Resolved {
    fn resolve(
        &mut self,
        _store: &FixtureStore,
    ) -> rqa_harness::Result<rqa_harness::Selection> {
        Ok(self.0.clone())
    }
}

fn list(rules_dir: &PathBuf, rule: Option<&str>) -> i32 {
    let store = FixtureStore::new(rules_dir);

    match rule {
        Some(rule) => {
            let rule = match RuleId::parse(rule) {
                Ok(rule) => rule,
                Err(e) => {
                    eprintln!("{e}");
                    return 1;
                }
            };
            match store.list_test_cases(&rule) {
                Ok(cases) => {
                    println!("Test cases for {rule}:");
                    for case in cases {
                        println!("  {}", case.case_path());
                    }
                    0
                }
                Err(e) => {
                    eprintln!("{e}");
                    1
                }
            }
        }
        None => match store.list_rules() {
            Ok(rules) => {
                println!("Rules in {}:", rules_dir.display());
                for rule in rules {
                    match store.list_test_cases(&rule) {
                        Ok(cases) => println!("  {rule} ({} case(s))", cases.len()),
                        Err(_) => println!("  {rule} (no test cases)"),
                    }
                }
                0
            }
            Err(e) => {
                eprintln!("{e}");
                1
            }
        },
    }
}
