use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Qualitative energy tier assigned to an application category.
///
/// The set is closed: taxonomy files naming any other tier fail to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EnergyTier {
    #[serde(rename = "low-energy-level")]
    Low,
    #[serde(rename = "middle-energy-level")]
    Middle,
    /// Canonical fallback for unknown categories and degraded results.
    #[default]
    #[serde(rename = "moderate-energy-level")]
    Moderate,
    #[serde(rename = "high-energy-level")]
    High,
}

impl EnergyTier {
    /// Every tier, lowest label first.
    pub const ALL: [EnergyTier; 4] = [Self::Low, Self::Middle, Self::Moderate, Self::High];

    /// Returns the wire string printed by the CLI.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low-energy-level",
            Self::Middle => "middle-energy-level",
            Self::Moderate => "moderate-energy-level",
            Self::High => "high-energy-level",
        }
    }
}

impl fmt::Display for EnergyTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown tier string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown energy tier: {0}")]
pub struct UnknownEnergyTier(pub String);

impl FromStr for EnergyTier {
    type Err = UnknownEnergyTier;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|tier| tier.as_str() == s.trim())
            .ok_or_else(|| UnknownEnergyTier(s.to_string()))
    }
}
