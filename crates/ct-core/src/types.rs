//! Core type definitions with validation.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors for core types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The provided value was empty.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    /// Invalid activity kind value.
    #[error("invalid activity kind: {value}")]
    InvalidActivityKind { value: String },
}

/// Generates a validated string ID newtype with common trait implementations.
macro_rules! define_string_id {
    (
        $(#[$meta:meta])*
        $name:ident, $field_name:literal
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Creates a new ID after validation.
            pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
                let id = id.into();
                if id.trim().is_empty() {
                    return Err(ValidationError::Empty { field: $field_name });
                }
                Ok(Self(id))
            }

            /// Returns the ID as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_string_id!(
    /// A validated git branch name.
    ///
    /// Branch resolution never fails loudly: anything that cannot be resolved
    /// collapses to [`BranchName::unknown`].
    BranchName, "branch name"
);

/// Sentinel used when the branch cannot be determined.
pub const UNKNOWN_BRANCH: &str = "unknown";

impl BranchName {
    /// The sentinel unknown-branch value.
    pub fn unknown() -> Self {
        Self(UNKNOWN_BRANCH.to_string())
    }

    /// Builds a branch name, falling back to the sentinel for missing or blank input.
    pub fn or_unknown(name: Option<&str>) -> Self {
        name.and_then(|n| Self::new(n.trim()).ok())
            .unwrap_or_else(Self::unknown)
    }

    /// Returns true for the sentinel value.
    pub fn is_unknown(&self) -> bool {
        self.0 == UNKNOWN_BRANCH
    }
}

impl Default for BranchName {
    fn default() -> Self {
        Self::unknown()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn branch_name_rejects_empty() {
        assert_eq!(
            BranchName::new("").unwrap_err(),
            ValidationError::Empty {
                field: "branch name"
            }
        );
        assert!(BranchName::new("   ").is_err());
    }

    #[test]
    fn branch_name_falls_back_to_unknown() {
        assert!(BranchName::or_unknown(None).is_unknown());
        assert!(BranchName::or_unknown(Some("")).is_unknown());
        assert_eq!(
            BranchName::or_unknown(Some(" feature/x ")).as_str(),
            "feature/x"
        );
    }

    #[test]
    fn branch_name_serde_rejects_empty() {
        let result: Result<BranchName, _> = serde_json::from_str(r#""""#);
        assert!(result.is_err());

        let parsed: BranchName = serde_json::from_str(r#""main""#).unwrap();
        assert_eq!(parsed.as_str(), "main");
    }
}
