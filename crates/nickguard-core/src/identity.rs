//! Handle equivalence: canonicalization followed by comparison

use crate::canonical::Canonicalizer;
use crate::collation::CollationComparator;
use crate::error::ConversionFailure;
use crate::strength::CollationStrength;

/// Decides whether two handles name the same identity
///
/// Both handles are folded through the [`Canonicalizer`]; the canonical
/// forms are then compared exactly (strength `off`) or by the collator.
/// Either stage can be disabled independently: an empty table leaves the
/// fold as identity, strength `off` leaves comparison exact.
#[derive(Debug)]
pub struct IdentityComparator {
    canonicalizer: Canonicalizer,
    collation: CollationComparator,
}

impl IdentityComparator {
    /// Compose the two stages
    #[inline]
    #[must_use]
    pub fn new(canonicalizer: Canonicalizer, collation: CollationComparator) -> Self {
        Self {
            canonicalizer,
            collation,
        }
    }

    /// Fold stage
    #[inline]
    #[must_use]
    pub fn canonicalizer(&self) -> &Canonicalizer {
        &self.canonicalizer
    }

    /// Comparison stage
    #[inline]
    #[must_use]
    pub fn collation(&self) -> &CollationComparator {
        &self.collation
    }

    /// Configured collation strength
    #[inline]
    #[must_use]
    pub fn strength(&self) -> CollationStrength {
        self.collation.strength()
    }

    /// Canonical form of one handle
    ///
    /// # Errors
    /// See [`Canonicalizer::canonicalize`].
    #[inline]
    pub fn canonicalize(&self, handle: &str) -> Result<String, ConversionFailure> {
        self.canonicalizer.canonicalize(handle)
    }

    /// Whether `a` and `b` are the same handle under the configured rules
    ///
    /// Identical strings are always equivalent. Otherwise a handle that
    /// cannot be canonicalized is equivalent to nothing: a conversion
    /// problem allows a rename rather than blocking it.
    #[must_use]
    pub fn equivalent(&self, a: &str, b: &str) -> bool {
        if a == b {
            return true;
        }

        let canonical_a = match self.canonicalize(a) {
            Ok(c) => c,
            Err(failure) => {
                tracing::debug!(handle = a, %failure, "treating handle as unique");
                return false;
            }
        };
        self.equivalent_to_canonical(&canonical_a, b)
    }

    /// Like [`IdentityComparator::equivalent`] with `a` already canonical
    ///
    /// Lets a registry scan fold the proposed handle once.
    #[must_use]
    pub fn equivalent_to_canonical(&self, canonical_a: &str, b: &str) -> bool {
        match self.canonicalize(b) {
            Ok(canonical_b) => self.collation.equal(canonical_a, &canonical_b),
            Err(failure) => {
                tracing::debug!(handle = b, %failure, "treating handle as unique");
                false
            }
        }
    }
}
