//! Locale-aware comparison stage
//!
//! Wraps an ICU4X [`Collator`] opened once per configuration generation at
//! the configured [`CollationStrength`]. With strength `off` no collator is
//! opened and comparison is plain code-point order.

use crate::error::ConfigError;
use crate::strength::CollationStrength;
use icu_collator::{Collator, CollatorOptions};
use icu_locid::Locale;
use icu_provider::DataLocale;
use std::cmp::Ordering;
use std::fmt::{self, Debug, Formatter};

/// Comparison after canonicalization
///
/// Read-only after construction and shared by every comparison of its
/// generation.
pub struct CollationComparator {
    strength: CollationStrength,
    locale: String,
    collator: Option<Collator>,
}

impl CollationComparator {
    /// Exact code-point comparison, no collator
    #[inline]
    #[must_use]
    pub fn off() -> Self {
        Self {
            strength: CollationStrength::Off,
            locale: String::new(),
            collator: None,
        }
    }

    /// Open a collator for `locale` at `strength`
    ///
    /// An empty `locale` selects the root collation. With
    /// [`CollationStrength::Off`] nothing is opened and the locale is
    /// ignored.
    ///
    /// # Errors
    /// - [`ConfigError::InvalidLocale`] if `locale` is not a valid BCP-47 tag
    /// - [`ConfigError::CollatorInit`] if the collation data cannot be loaded
    pub fn new(strength: CollationStrength, locale: &str) -> Result<Self, ConfigError> {
        let Some(icu_strength) = strength.to_icu() else {
            return Ok(Self::off());
        };

        let data_locale = if locale.is_empty() {
            DataLocale::default()
        } else {
            let parsed: Locale = locale.parse().map_err(|e| ConfigError::InvalidLocale {
                locale: locale.to_string(),
                reason: format!("{e}"),
            })?;
            DataLocale::from(&parsed)
        };

        let mut options = CollatorOptions::new();
        options.strength = Some(icu_strength);

        let collator =
            Collator::try_new(&data_locale, options).map_err(|e| ConfigError::CollatorInit {
                strength,
                reason: format!("{e}"),
            })?;

        tracing::debug!(%strength, locale, "collator opened");

        Ok(Self {
            strength,
            locale: locale.to_string(),
            collator: Some(collator),
        })
    }

    /// Configured strength
    #[inline]
    #[must_use]
    pub fn strength(&self) -> CollationStrength {
        self.strength
    }

    /// Configured locale, empty for root
    #[inline]
    #[must_use]
    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// Order `a` relative to `b`
    ///
    /// Uses the collator at the configured strength, or code-point order
    /// when strength is `off`.
    #[must_use]
    pub fn compare(&self, a: &str, b: &str) -> Ordering {
        match &self.collator {
            Some(collator) => collator.compare(a, b),
            // UTF-8 byte order is code-point order
            None => a.cmp(b),
        }
    }

    /// Whether `a` and `b` are equal under this comparator
    #[inline]
    #[must_use]
    pub fn equal(&self, a: &str, b: &str) -> bool {
        match &self.collator {
            Some(collator) => collator.compare(a, b) == Ordering::Equal,
            None => a == b,
        }
    }
}

impl Debug for CollationComparator {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollationComparator")
            .field("strength", &self.strength)
            .field("locale", &self.locale)
            .field("collator", &self.collator.is_some())
            .finish()
    }
}

impl Default for CollationComparator {
    fn default() -> Self {
        Self::off()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comparator(strength: CollationStrength) -> CollationComparator {
        CollationComparator::new(strength, "").unwrap()
    }

    #[test]
    fn off_is_exact_equality() {
        let c = comparator(CollationStrength::Off);
        assert!(c.equal("Alice", "Alice"));
        assert!(!c.equal("Alice", "alice"));
        assert!(!c.equal("café", "cafe"));
        assert_eq!(c.compare("a", "b"), Ordering::Less);
    }

    #[test]
    fn primary_ignores_case_and_accents() {
        let c = comparator(CollationStrength::Primary);
        assert!(c.equal("Alice", "alice"));
        assert!(c.equal("café", "CAFE"));
        assert!(!c.equal("alice", "alicia"));
    }

    #[test]
    fn secondary_ignores_case_only() {
        let c = comparator(CollationStrength::Secondary);
        assert!(c.equal("Alice", "alice"));
        assert!(!c.equal("café", "cafe"));
    }

    #[test]
    fn tertiary_distinguishes_case() {
        let c = comparator(CollationStrength::Tertiary);
        assert!(!c.equal("Alice", "alice"));
        assert!(c.equal("alice", "alice"));
    }

    #[test]
    fn identical_matches_only_same_text() {
        let c = comparator(CollationStrength::Identical);
        assert!(c.equal("Zoë", "Zoë"));
        assert!(!c.equal("Zoë", "Zoe"));
    }

    #[test]
    fn explicit_locale_is_accepted() {
        let c = CollationComparator::new(CollationStrength::Primary, "de").unwrap();
        assert_eq!(c.locale(), "de");
        assert!(c.equal("Müller", "muller"));
    }

    #[test]
    fn malformed_locale_is_config_error() {
        let result = CollationComparator::new(CollationStrength::Primary, "not a locale!");
        assert!(matches!(result, Err(ConfigError::InvalidLocale { .. })));
    }

    #[test]
    fn off_ignores_locale() {
        let c = CollationComparator::new(CollationStrength::Off, "not a locale!").unwrap();
        assert_eq!(c.strength(), CollationStrength::Off);
        assert_eq!(c.locale(), "");
    }
}
