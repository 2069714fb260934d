//! Strictness profiles.
//!
//! A profile scales the base threshold and bonus factor and fixes the
//! shortest n-gram that may count as a match:
//!
//! | strictness | threshold × | bonus_factor × | min_match_length |
//! |------------|-------------|----------------|------------------|
//! | lenient    | 0.7         | 1.3            | 2                |
//! | moderate   | 1.0         | 1.0            | 3                |
//! | strict     | 1.3         | 0.8            | 4                |
//!
//! Effective parameters are always derived from the base values. Deriving
//! from an already-derived set would compound the multipliers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::config::ConfigError;

/// Named strictness profile.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Strictness {
    Lenient,
    #[default]
    Moderate,
    Strict,
}

/// Multipliers and minimum match length for a profile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrictnessProfile {
    pub threshold_multiplier: f64,
    pub bonus_factor_multiplier: f64,
    pub min_match_length: usize,
}

impl Strictness {
    pub const ALL: [Strictness; 3] = [Strictness::Lenient, Strictness::Moderate, Strictness::Strict];

    pub fn profile(self) -> StrictnessProfile {
        match self {
            Strictness::Lenient => StrictnessProfile {
                threshold_multiplier: 0.7,
                bonus_factor_multiplier: 1.3,
                min_match_length: 2,
            },
            Strictness::Moderate => StrictnessProfile {
                threshold_multiplier: 1.0,
                bonus_factor_multiplier: 1.0,
                min_match_length: 3,
            },
            Strictness::Strict => StrictnessProfile {
                threshold_multiplier: 1.3,
                bonus_factor_multiplier: 0.8,
                min_match_length: 4,
            },
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Strictness::Lenient => "lenient",
            Strictness::Moderate => "moderate",
            Strictness::Strict => "strict",
        }
    }

    /// Parse a profile name, falling back to `Moderate` for unknown names.
    pub fn parse_or_default(name: &str) -> Self {
        name.parse().unwrap_or_else(|_| {
            tracing::warn!(strictness = %name, "Unknown strictness, using moderate");
            Strictness::Moderate
        })
    }
}

impl FromStr for Strictness {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lenient" => Ok(Strictness::Lenient),
            "moderate" => Ok(Strictness::Moderate),
            "strict" => Ok(Strictness::Strict),
            _ => Err(ConfigError::UnknownStrictness(s.to_string())),
        }
    }
}

impl fmt::Display for Strictness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Config files are allowed to carry unknown names; they degrade to moderate.
impl<'de> Deserialize<'de> for Strictness {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Strictness::parse_or_default(&name))
    }
}

/// Base parameters as configured, before any strictness adjustment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BaseParams {
    pub threshold: f64,
    pub bonus_factor: f64,
}

/// Parameters actually used for scoring and classification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EffectiveParams {
    pub threshold: f64,
    pub bonus_factor: f64,
    pub min_match_length: usize,
}

impl EffectiveParams {
    /// Apply a strictness profile to base parameters.
    pub fn derive(base: BaseParams, strictness: Strictness) -> Self {
        let profile = strictness.profile();
        Self {
            threshold: (base.threshold * profile.threshold_multiplier).min(1.0),
            bonus_factor: base.bonus_factor * profile.bonus_factor_multiplier,
            min_match_length: profile.min_match_length,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: BaseParams = BaseParams {
        threshold: 0.5,
        bonus_factor: 0.5,
    };

    #[test]
    fn test_profile_table() {
        let lenient = EffectiveParams::derive(BASE, Strictness::Lenient);
        assert!((lenient.threshold - 0.35).abs() < 1e-12);
        assert!((lenient.bonus_factor - 0.65).abs() < 1e-12);
        assert_eq!(lenient.min_match_length, 2);

        let moderate = EffectiveParams::derive(BASE, Strictness::Moderate);
        assert_eq!(moderate.threshold, 0.5);
        assert_eq!(moderate.bonus_factor, 0.5);
        assert_eq!(moderate.min_match_length, 3);

        let strict = EffectiveParams::derive(BASE, Strictness::Strict);
        assert!((strict.threshold - 0.65).abs() < 1e-12);
        assert!((strict.bonus_factor - 0.4).abs() < 1e-12);
        assert_eq!(strict.min_match_length, 4);
    }

    #[test]
    fn test_threshold_capped_at_one() {
        let base = BaseParams {
            threshold: 0.9,
            bonus_factor: 0.5,
        };
        let strict = EffectiveParams::derive(base, Strictness::Strict);
        assert_eq!(strict.threshold, 1.0);
    }

    #[test]
    fn test_derivation_does_not_compound() {
        let first = EffectiveParams::derive(BASE, Strictness::Strict);
        let second = EffectiveParams::derive(BASE, Strictness::Strict);
        assert_eq!(first, second);
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("lenient".parse::<Strictness>().unwrap(), Strictness::Lenient);
        assert_eq!(" Strict ".parse::<Strictness>().unwrap(), Strictness::Strict);
        assert!(matches!(
            "paranoid".parse::<Strictness>(),
            Err(ConfigError::UnknownStrictness(_))
        ));
    }

    #[test]
    fn test_unknown_name_falls_back_to_moderate() {
        assert_eq!(Strictness::parse_or_default("paranoid"), Strictness::Moderate);

        let parsed: Strictness = serde_json::from_str("\"paranoid\"").unwrap();
        assert_eq!(parsed, Strictness::Moderate);
    }

    #[test]
    fn test_display_roundtrips_through_parse() {
        for strictness in Strictness::ALL {
            assert_eq!(strictness.to_string().parse::<Strictness>().unwrap(), strictness);
        }
    }
}
