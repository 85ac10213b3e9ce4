//! Guard configuration
//!
//! [`GuardConfig`] is the typed, validated input to the engine. It is
//! built programmatically or loaded from TOML:
//!
//! ```toml
//! collation_strength = "secondary"
//! locale = "en"
//! mappings = [
//!     ["0", "O", "o"],
//!     "1, l, I",
//! ]
//!
//! [limits]
//! max_handle_len = 64
//! max_member_len = 8
//! ```
//!
//! Mappings are either an array of members or one inline string whose
//! members are separated by commas and spaces.

use crate::canonical::Canonicalizer;
use crate::collation::CollationComparator;
use crate::error::ConfigError;
use crate::identity::IdentityComparator;
use crate::strength::CollationStrength;
use crate::table::{EquivalenceGroup, EquivalenceTable};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// Default bound on handle length, in characters
pub const DEFAULT_MAX_HANDLE_LEN: usize = 128;

/// Default bound on equivalence member length, in characters
pub const DEFAULT_MAX_MEMBER_LEN: usize = 16;

/// Length bounds applied while folding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Limits {
    /// Longest handle (and longest folded form) accepted for folding
    pub max_handle_len: usize,

    /// Longest equivalence member taking part in folding
    pub max_member_len: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_handle_len: DEFAULT_MAX_HANDLE_LEN,
            max_member_len: DEFAULT_MAX_MEMBER_LEN,
        }
    }
}

impl Limits {
    /// Check both bounds are usable
    ///
    /// # Errors
    /// [`ConfigError::InvalidLimit`] for a zero bound.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_handle_len == 0 {
            return Err(ConfigError::InvalidLimit {
                field: "max_handle_len",
                value: self.max_handle_len,
            });
        }
        if self.max_member_len == 0 {
            return Err(ConfigError::InvalidLimit {
                field: "max_member_len",
                value: self.max_member_len,
            });
        }
        Ok(())
    }
}

/// Complete configuration of one guard generation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GuardConfig {
    /// Comparison strength after canonicalization
    pub strength: CollationStrength,

    /// Collator locale (BCP-47), empty for root
    pub locale: String,

    /// Equivalence groups in declaration order
    pub groups: Vec<EquivalenceGroup>,

    /// Folding bounds
    pub limits: Limits,
}

impl GuardConfig {
    /// Default configuration: no groups, collation off
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With collation strength
    #[inline]
    #[must_use]
    pub fn with_strength(mut self, strength: CollationStrength) -> Self {
        self.strength = strength;
        self
    }

    /// With collator locale
    #[inline]
    #[must_use]
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    /// With one more equivalence group, appended after existing ones
    #[inline]
    #[must_use]
    pub fn with_group(mut self, group: EquivalenceGroup) -> Self {
        self.groups.push(group);
        self
    }

    /// With folding bounds
    #[inline]
    #[must_use]
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Parse TOML configuration text
    ///
    /// # Errors
    /// - [`ConfigError::Parse`] for malformed TOML or unknown keys
    /// - [`ConfigError::InvalidStrength`] for an unknown strength literal
    /// - [`ConfigError::InvalidGroup`] for a malformed mapping
    /// - [`ConfigError::InvalidLimit`] for a zero bound
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        raw.try_into()
    }

    /// Read and parse a TOML configuration file
    ///
    /// # Errors
    /// [`ConfigError::Io`] if the file cannot be read, otherwise as
    /// [`GuardConfig::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::io_error(path, e))?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(
            path = %path.display(),
            groups = config.groups.len(),
            strength = %config.strength,
            "configuration loaded"
        );
        Ok(config)
    }

    /// Build the comparator this configuration describes
    ///
    /// Opens the collator when strength is not `off`; failure to do so is
    /// an error, never a silent fallback to exact comparison.
    ///
    /// # Errors
    /// [`ConfigError::InvalidLimit`], [`ConfigError::InvalidLocale`] or
    /// [`ConfigError::CollatorInit`].
    pub fn build(&self) -> Result<IdentityComparator, ConfigError> {
        self.limits.validate()?;

        let collation = CollationComparator::new(self.strength, &self.locale)?;
        let table = EquivalenceTable::new(self.groups.clone(), self.limits.max_member_len);
        let canonicalizer = Canonicalizer::new(Arc::new(table), self.limits.max_handle_len);

        Ok(IdentityComparator::new(canonicalizer, collation))
    }
}

/// On-disk shape, converted into [`GuardConfig`] with validation
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawConfig {
    collation_strength: Option<String>,
    locale: String,
    mappings: Vec<RawMapping>,
    limits: Limits,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawMapping {
    Inline(String),
    List(Vec<String>),
}

impl TryFrom<RawConfig> for GuardConfig {
    type Error = ConfigError;

    fn try_from(raw: RawConfig) -> Result<Self, Self::Error> {
        let strength = match raw.collation_strength {
            Some(literal) => literal.parse()?,
            None => CollationStrength::Off,
        };

        let groups = raw
            .mappings
            .into_iter()
            .enumerate()
            .map(|(index, mapping)| {
                let group = match mapping {
                    RawMapping::Inline(spec) => EquivalenceGroup::parse(&spec),
                    RawMapping::List(members) => EquivalenceGroup::new(members),
                };
                group.map_err(|source| ConfigError::group(index, source))
            })
            .collect::<Result<Vec<_>, _>>()?;

        raw.limits.validate()?;

        Ok(Self {
            strength,
            locale: raw.locale,
            groups,
            limits: raw.limits,
        })
    }
}
