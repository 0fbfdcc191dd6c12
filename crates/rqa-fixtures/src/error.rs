//! Error types for rqa-fixtures

use thiserror::Error;

/// Result type alias for fixture operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while enumerating or loading fixtures
#[derive(Debug, Error)]
pub enum Error {
    /// Fixture tree is structurally broken
    #[error("Discovery error: {0}")]
    Discovery(String),

    /// Selected rule has no fixtures
    #[error("Unknown rule: {0}")]
    UnknownRule(String),

    /// Selected test case does not exist under the rule
    #[error("Unknown test case: {rule}/{case}")]
    UnknownTestCase {
        /// Rule the case was looked up under
        rule: String,
        /// The `category/name` path that was requested
        case: String,
    },

    /// Test case contents are absent, unparsable, or inconsistent
    #[error("Malformed fixture {case}: {detail}")]
    MalformedFixture {
        /// `rule/category/name` label of the offending case
        case: String,
        /// What is wrong with it
        detail: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parse error outside of a test-case load
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    /// Shorthand for a malformed-fixture error on a labelled case
    pub fn malformed(case: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::MalformedFixture {
            case: case.into(),
            detail: detail.into(),
        }
    }
}
