//! Relay model tier definitions and metadata.
//!
//! The relay runs a Whisper engine in one of two sizes. The tier is sent as
//! the `model` field of the multipart upload; the vendor backend always uses
//! `whisper-1` and does not take a tier.

use serde::{Deserialize, Serialize};

/// Model tier accepted by the relay backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelayModelTier {
    /// Faster, lighter model
    #[default]
    Small,
    /// Slower, more accurate model
    Medium,
}

impl RelayModelTier {
    /// Returns the tier identifier as sent to the relay API
    pub fn id(&self) -> &'static str {
        match self {
            RelayModelTier::Small => "small",
            RelayModelTier::Medium => "medium",
        }
    }

    /// Returns a human-readable description of the tier
    pub fn description(&self) -> &'static str {
        match self {
            RelayModelTier::Small => "Small (faster, lighter)",
            RelayModelTier::Medium => "Medium (slower, more accurate)",
        }
    }

    /// Parses a tier ID string into a RelayModelTier
    pub fn from_id(id: &str) -> Option<Self> {
        match id {
            "small" => Some(RelayModelTier::Small),
            "medium" => Some(RelayModelTier::Medium),
            _ => None,
        }
    }

    /// Returns all available tiers
    pub fn all() -> &'static [Self] {
        &[RelayModelTier::Small, RelayModelTier::Medium]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_id_roundtrip() {
        for tier in RelayModelTier::all() {
            assert_eq!(RelayModelTier::from_id(tier.id()), Some(*tier));
        }
        assert_eq!(RelayModelTier::from_id("large"), None);
    }
}
