//! nickguard core
//!
//! Handle uniqueness judged modulo a configurable equivalence.
//!
//! # Overview
//!
//! Two handles collide when they fold to the same canonical form and that
//! form compares equal at the configured collation strength:
//! - **EquivalenceTable**: declared look-alike groups compiled into substitutions
//! - **Canonicalizer**: folds a handle to its fixed point under the table
//! - **CollationComparator**: ICU4X collation at a chosen strength, or exact equality
//! - **IdentityComparator**: the two stages composed into `equivalent(a, b)`
//! - **CollisionGuard**: checks a proposed handle against the live registry
//!
//! # Example
//!
//! ```rust
//! use nickguard_core::{CollisionGuard, GuardConfig, Verdict};
//!
//! let config = GuardConfig::from_toml_str(r#"
//!     collation_strength = "off"
//!     mappings = ["8, b"]
//! "#).unwrap();
//! let guard = CollisionGuard::from_config(&config).unwrap();
//!
//! let registry = vec!["Alice", "Bob"];
//! let verdict = guard.check("Bo8", "Charlie", &registry);
//! assert_eq!(verdict.rejection().unwrap().conflicting, "Bob");
//! assert_eq!(guard.check("Dave", "Charlie", &registry), Verdict::Accept);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod canonical;
pub mod collation;
pub mod config;
pub mod error;
pub mod guard;
pub mod identity;
pub mod registry;
pub mod strength;
pub mod table;

// Re-exports
pub use canonical::{decode_handle, Canonicalizer, MAX_FOLD_PASSES};
pub use collation::CollationComparator;
pub use config::{GuardConfig, Limits};
pub use error::{ConfigError, ConversionFailure, GroupError};
pub use guard::{CollisionGuard, GuardSnapshot, RejectReason, Rejection, Verdict};
pub use identity::IdentityComparator;
pub use registry::HandleRegistry;
pub use strength::CollationStrength;
pub use table::{EquivalenceGroup, EquivalenceTable};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for hosts embedding the guard
    pub use crate::{
        CollationStrength, CollisionGuard, ConfigError, EquivalenceGroup, GuardConfig,
        HandleRegistry, Rejection, Verdict,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
