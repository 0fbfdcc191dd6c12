//! Rule QA Fixtures
//!
//! Data model and on-disk store for rule regression fixtures: rules, their
//! positive/negative test cases, datasets, and expected-findings annotations.
//! The store is read-only; result directories are resolved here but written
//! by the reporter.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::doc_markdown)]
// Allow common patterns in test code
#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod dataset;
pub mod error;
pub mod finding;
pub mod rule;
pub mod store;
pub mod testcase;

pub use dataset::{Dataset, Record};
pub use error::{Error, Result};
pub use finding::{Finding, FindingKey, MatchKeySchema};
pub use rule::RuleId;
pub use store::FixtureStore;
pub use testcase::{Category, TestCase, TestCaseRef};
