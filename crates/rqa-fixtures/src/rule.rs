//! Rule identifiers
//!
//! Rule ids follow one of two conventions: `CORE-######` for library rules
//! and `CG####` for contributor-authored rules. Anything else in the fixture
//! tree is ignored during discovery and rejected when selected explicitly.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::error::{Error, Result};

static RULE_ID_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    // Verified pattern, unwrap is safe here
    #[allow(clippy::unwrap_used)]
    Regex::new(r"^(CORE-\d{6}|CG\d{4})$").unwrap()
});

/// Validated rule identifier
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleId(String);

impl RuleId {
    /// Parse and validate a rule id
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownRule` if the id does not match either naming
    /// convention.
    pub fn parse(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if RULE_ID_REGEX.is_match(&id) {
            Ok(Self(id))
        } else {
            Err(Error::UnknownRule(format!(
                "{id} (expected CORE-###### or CG####)"
            )))
        }
    }

    /// Whether a directory name looks like a rule id
    #[must_use]
    pub fn is_valid(id: &str) -> bool {
        RULE_ID_REGEX.is_match(id)
    }

    /// The id as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RuleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for RuleId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
