//! File reporter
//!
//! Writes `results.json` and `summary.txt` into each test case's isolated
//! results directory. Writes go through a temp file followed by a rename,
//! so an interrupted run leaves prior results intact and never leaves a
//! half-written document behind.

use std::path::Path;

use rqa_harness::{Error, ReportSink, Result, RunResult};

use crate::summary::{console_line, render_summary};

/// Name of the canonical structured document
pub const RESULTS_FILE: &str = "results.json";
/// Name of the human-readable rendering
pub const SUMMARY_FILE: &str = "summary.txt";

/// Report sink that persists results per test case
#[derive(Debug, Clone, Default)]
pub struct FileReporter {
    verbose: bool,
    quiet: bool,
}

impl FileReporter {
    /// Create a reporter with default console output (one line per case)
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mirror the full text summary to the console per case
    #[must_use]
    pub fn verbose(mut self) -> Self {
        self.verbose = true;
        self
    }

    /// Suppress console output entirely (used by tests)
    #[must_use]
    pub fn quiet(mut self) -> Self {
        self.quiet = true;
        self
    }
}

impl ReportSink for FileReporter {
    fn record(&mut self, result: &RunResult, results_dir: &Path) -> Result<()> {
        let report_err = |detail: String| Error::Report {
            case: result.label(),
            detail,
        };

        std::fs::create_dir_all(results_dir).map_err(|e| report_err(e.to_string()))?;

        let json = serde_json::to_string_pretty(result)?;
        write_atomic(&results_dir.join(RESULTS_FILE), &json)
            .map_err(|e| report_err(e.to_string()))?;

        let summary = render_summary(result);
        write_atomic(&results_dir.join(SUMMARY_FILE), &summary)
            .map_err(|e| report_err(e.to_string()))?;

        if !self.quiet {
            if self.verbose {
                println!("{summary}");
            } else {
                println!("{}", console_line(result));
            }
        }

        Ok(())
    }
}

/// Write a file via temp-and-rename so readers never observe partial content
fn write_atomic(path: &Path, content: &str) -> std::io::Result<()> {
    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, content)?;
    std::fs::rename(&tmp, path)
}
