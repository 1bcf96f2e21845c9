//! ## Errors
//!
//! User-visible errors for the M-tree. Everything else that can go wrong
//! during a mutation (an under-capacity node, a split or root replacement to
//! thread back up the recursion) is an internal signal modeled in
//! [`crate::node`] as a plain return value, never as an `Error` — it is
//! consumed one stack frame up and never reaches the caller.

use std::error::Error;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Errors that can be returned from the public `MTree` API.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MTreeError {
    /// Occurs when the tree is constructed with invalid capacity parameters.
    InvalidArgument {
        /// A human-readable description of the violated requirement.
        reason: String,
    },
    /// Occurs when `remove` is called with data that isn't currently indexed.
    NotFound,
}

impl fmt::Display for MTreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MTreeError::InvalidArgument { reason } => {
                write!(f, "invalid argument: {reason}")
            }
            MTreeError::NotFound => write!(f, "data not found in index"),
        }
    }
}

impl Error for MTreeError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_argument_display() {
        let err = MTreeError::InvalidArgument {
            reason: "min_node_capacity must be at least 2".to_string(),
        };
        assert_eq!(
            format!("{}", err),
            "invalid argument: min_node_capacity must be at least 2"
        );
    }

    #[test]
    fn test_not_found_display() {
        assert_eq!(format!("{}", MTreeError::NotFound), "data not found in index");
    }
}
