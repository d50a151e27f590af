//! Configuration types for mining-target computation

use crate::error::{ExplorerError, Result};
use serde::Deserialize;
use shared_crypto::HASH_BITS;

/// Bounds and starting point for the PoW target (leading zero bits).
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TargetConfig {
    /// Target used until the first adjustment boundary.
    pub initial_target: u32,

    /// Lower clamp for adjusted targets.
    pub minimum_target: u32,

    /// Upper clamp for adjusted targets. Must stay below the hash width.
    pub maximum_target: u32,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            initial_target: crate::INITIAL_TARGET,
            minimum_target: crate::MINIMUM_TARGET,
            maximum_target: crate::MAXIMUM_TARGET,
        }
    }
}

impl TargetConfig {
    /// Reject bounds that could produce an unusable target.
    pub fn validate(&self) -> Result<()> {
        if self.minimum_target > self.maximum_target {
            return Err(ExplorerError::InvalidConfig(format!(
                "minimum_target {} exceeds maximum_target {}",
                self.minimum_target, self.maximum_target
            )));
        }
        if self.maximum_target >= HASH_BITS {
            return Err(ExplorerError::InvalidConfig(format!(
                "maximum_target {} must be below {HASH_BITS}",
                self.maximum_target
            )));
        }
        if !(self.minimum_target..=self.maximum_target).contains(&self.initial_target) {
            return Err(ExplorerError::InvalidConfig(format!(
                "initial_target {} outside [{}, {}]",
                self.initial_target, self.minimum_target, self.maximum_target
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(TargetConfig::default().validate().is_ok());
    }

    #[test]
    fn test_inverted_bounds_rejected() {
        let config = TargetConfig {
            minimum_target: 30,
            maximum_target: 10,
            initial_target: 20,
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_maximum_must_fit_hash() {
        let config = TargetConfig {
            maximum_target: 256,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_initial_outside_bounds_rejected() {
        let config = TargetConfig {
            initial_target: 4,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
