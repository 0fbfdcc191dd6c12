//! Rule QA Harness
//!
//! The decision core of the regression harness: drives the external rule
//! engine per test case, classifies produced findings against the author's
//! expectations, and aggregates verdicts for one invocation.
//!
//! The engine is strictly a black box behind [`engine::RuleEngine`]; the
//! harness only understands its input/output contract, never its
//! evaluation logic.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::doc_markdown)]
// Allow common patterns in test code
#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::redundant_clone))]

pub mod comparator;
pub mod coordinator;
pub mod engine;
pub mod error;
pub mod result;

pub use comparator::{classify, Classification, Verdict};
pub use coordinator::{Coordinator, FlagSelection, Selection, SelectionMode, SelectionSource};
pub use engine::{engine_version, EngineFailure, ProcessEngine, RuleEngine, StubEngine};
pub use error::{Error, Result};
pub use result::{CaseFailure, ReportSink, RuleError, RunContext, RunResult, RunSummary};
