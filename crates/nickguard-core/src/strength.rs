//! Collation strength setting
//!
//! [`CollationStrength::Off`] disables locale-aware comparison entirely;
//! every other level selects how many distinctions the collator treats as
//! significant (base letters, accents, case, punctuation, code points).

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Strictness of the comparison stage that runs after canonicalization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CollationStrength {
    /// Exact code-point equality of the canonical forms
    #[default]
    Off,

    /// Base letters only; accents and case ignored
    Primary,

    /// Base letters and accents; case ignored
    Secondary,

    /// Base letters, accents and case
    Tertiary,

    /// Tertiary plus punctuation handling
    Quaternary,

    /// Every code point difference is significant
    Identical,
}

impl CollationStrength {
    /// All strengths, weakest comparison first
    pub const ALL: [Self; 6] = [
        Self::Off,
        Self::Primary,
        Self::Secondary,
        Self::Tertiary,
        Self::Quaternary,
        Self::Identical,
    ];

    /// Configuration literal for this strength
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Primary => "primary",
            Self::Secondary => "secondary",
            Self::Tertiary => "tertiary",
            Self::Quaternary => "quaternary",
            Self::Identical => "identical",
        }
    }

    /// Whether a collator is needed at all
    #[inline]
    #[must_use]
    pub fn is_off(self) -> bool {
        self == Self::Off
    }

    /// ICU4X strength, `None` for [`CollationStrength::Off`]
    #[must_use]
    pub(crate) fn to_icu(self) -> Option<icu_collator::Strength> {
        match self {
            Self::Off => None,
            Self::Primary => Some(icu_collator::Strength::Primary),
            Self::Secondary => Some(icu_collator::Strength::Secondary),
            Self::Tertiary => Some(icu_collator::Strength::Tertiary),
            Self::Quaternary => Some(icu_collator::Strength::Quaternary),
            Self::Identical => Some(icu_collator::Strength::Identical),
        }
    }
}

impl Display for CollationStrength {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CollationStrength {
    type Err = ConfigError;

    /// Case-insensitive parse of the configuration literal
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|strength| strength.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ConfigError::InvalidStrength {
                value: s.to_string(),
            })
    }
}

impl TryFrom<String> for CollationStrength {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CollationStrength> for String {
    fn from(value: CollationStrength) -> Self {
        value.as_str().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_literal_case_insensitively() {
        assert_eq!("off".parse::<CollationStrength>().unwrap(), CollationStrength::Off);
        assert_eq!("PRIMARY".parse::<CollationStrength>().unwrap(), CollationStrength::Primary);
        assert_eq!("Secondary".parse::<CollationStrength>().unwrap(), CollationStrength::Secondary);
        assert_eq!("tErTiArY".parse::<CollationStrength>().unwrap(), CollationStrength::Tertiary);
        assert_eq!("quaternary".parse::<CollationStrength>().unwrap(), CollationStrength::Quaternary);
        assert_eq!("IDENTICAL".parse::<CollationStrength>().unwrap(), CollationStrength::Identical);
    }

    #[test]
    fn rejects_unknown_literal() {
        let result = "banana".parse::<CollationStrength>();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidStrength { ref value }) if value == "banana"
        ));
    }

    #[test]
    fn rejects_padded_literal() {
        assert!(" primary".parse::<CollationStrength>().is_err());
        assert!("".parse::<CollationStrength>().is_err());
    }

    #[test]
    fn display_round_trips_through_parse() {
        for strength in CollationStrength::ALL {
            assert_eq!(strength.to_string().parse::<CollationStrength>().unwrap(), strength);
        }
    }

    #[test]
    fn only_off_has_no_icu_strength() {
        assert!(CollationStrength::Off.to_icu().is_none());
        assert!(CollationStrength::ALL[1..].iter().all(|s| s.to_icu().is_some()));
    }

    #[test]
    fn default_is_off() {
        assert!(CollationStrength::default().is_off());
    }
}
