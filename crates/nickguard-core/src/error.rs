//! Error types for nickguard
//!
//! Three families, matching how failures are handled:
//! - [`ConfigError`]: fatal, the engine refuses to activate
//! - [`ConversionFailure`]: local to one handle, the comparison fails open
//! - [`GroupError`]: a single malformed equivalence group declaration

use crate::strength::CollationStrength;
use std::path::PathBuf;

/// Errors in a single equivalence group declaration
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GroupError {
    /// Group declares no members at all
    #[error("group has no members")]
    Empty,

    /// Group declares only one member, so it folds nothing
    #[error("group has a single member '{member}'; at least two are required")]
    SingleMember {
        /// The lone member
        member: String,
    },

    /// A member is the empty string
    #[error("group member must be non-empty")]
    EmptyMember,

    /// Same member listed twice in one group
    #[error("member '{member}' is listed more than once")]
    DuplicateMember {
        /// The repeated member
        member: String,
    },
}

/// Configuration errors, fatal to activation
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Strength literal is not one of the known values
    #[error("invalid collation strength '{value}' (expected off, primary, secondary, tertiary, quaternary or identical)")]
    InvalidStrength {
        /// Literal as written in the configuration
        value: String,
    },

    /// An equivalence group declaration is malformed
    #[error("mapping #{index}: {source}")]
    InvalidGroup {
        /// Position of the declaration, from 0
        index: usize,
        /// What is wrong with it
        #[source]
        source: GroupError,
    },

    /// A length limit is out of range
    #[error("invalid limit {field} = {value}")]
    InvalidLimit {
        /// Name of the limit
        field: &'static str,
        /// Rejected value
        value: usize,
    },

    /// Collator locale could not be parsed
    #[error("invalid collation locale '{locale}': {reason}")]
    InvalidLocale {
        /// Locale as configured
        locale: String,
        /// Parser message
        reason: String,
    },

    /// Collation service could not be initialized for the requested strength
    #[error("collator could not be initialized at strength {strength}: {reason}")]
    CollatorInit {
        /// Strength that was requested
        strength: CollationStrength,
        /// Data provider message
        reason: String,
    },

    /// Configuration text could not be parsed
    #[error("parse error: {0}")]
    Parse(String),

    /// IO error while reading a configuration file
    #[error("io error reading {path}: {source}")]
    Io {
        /// File being read
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

impl ConfigError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Wrap a group error with the position of the offending declaration
    #[must_use]
    pub fn group(index: usize, source: GroupError) -> Self {
        Self::InvalidGroup { index, source }
    }
}

/// A handle could not be brought into canonical form at all
///
/// Only the input itself can cause this; a single substitution that does
/// not fit is skipped instead. Never fatal. Callers treat the handle as equivalent to nothing but
/// itself, so a rename is allowed rather than blocked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ConversionFailure {
    /// Raw handle bytes are not UTF-8
    #[error("handle is not valid UTF-8 (valid up to byte {valid_up_to})")]
    InvalidUtf8 {
        /// Length of the valid prefix in bytes
        valid_up_to: usize,
    },

    /// Handle is longer than the configured maximum
    #[error("handle has {len} characters, limit is {max}")]
    HandleTooLong {
        /// Length of the handle in characters
        len: usize,
        /// Configured maximum
        max: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_error_names_index() {
        let err = ConfigError::group(3, GroupError::SingleMember { member: "x".into() });
        let msg = err.to_string();
        assert!(msg.starts_with("mapping #3:"), "{msg}");
        assert!(msg.contains("'x'"));
    }

    #[test]
    fn conversion_failure_reports_bounds() {
        let err = ConversionFailure::HandleTooLong { len: 140, max: 128 };
        assert_eq!(err.to_string(), "handle has 140 characters, limit is 128");
    }

    #[test]
    fn invalid_strength_lists_choices() {
        let err = ConfigError::InvalidStrength {
            value: "banana".into(),
        };
        assert!(err.to_string().contains("banana"));
        assert!(err.to_string().contains("quaternary"));
    }
}
