//! Rule QA Report
//!
//! Persists one structured result document and one plain-text summary per
//! test case, and mirrors summaries to the console when verbose mode is
//! requested. The structured document is the canonical, diffable record;
//! the text summary gives a contributor enough context to act without
//! opening it.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::doc_markdown)]
// Allow common patterns in test code
#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod summary;
pub mod writer;

pub use summary::{console_line, render_summary};
pub use writer::{FileReporter, RESULTS_FILE, SUMMARY_FILE};
