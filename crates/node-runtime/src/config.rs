//! # Node Configuration
//!
//! Defaults, overridden by environment variables:
//!
//! | Variable | Effect |
//! |----------|--------|
//! | `CHAIN_BENEFICIARY_SEED` | 64 hex chars; Ed25519 seed of the coinbase key |
//! | `CHAIN_POW_WORKERS` | pinned PoW worker count |
//! | `CHAIN_INITIAL_TARGET` | initial target (leading zero bits) |
//! | `CHAIN_MAX_BLOCKS` | stop after mining this many blocks |
//!
//! Without a seed the node generates a throwaway key at startup.

use block_producer::BlockProducerConfig;
use serde::Deserialize;
use shared_crypto::HashAlgorithm;
use thiserror::Error;
use tracing::{info, warn};

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A variable is set but cannot be used.
    #[error("Invalid value for {var}: {reason}")]
    InvalidEnv {
        /// Variable name.
        var: &'static str,
        /// What was wrong.
        reason: String,
    },

    /// Component configuration rejected the values.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Complete node configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Block production settings. The beneficiary is filled from the node key.
    pub producer: BlockProducerConfig,
    /// Chain hash algorithm.
    pub hash_algorithm: HashAlgorithm,
    /// Seed of the node's Ed25519 key.
    pub beneficiary_seed: Option<[u8; 32]>,
    /// Stop the mining loop after this many blocks.
    pub max_blocks: Option<u64>,
    /// Event bus capacity per subscriber.
    pub event_capacity: usize,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            producer: BlockProducerConfig::default(),
            hash_algorithm: HashAlgorithm::default(),
            beneficiary_seed: None,
            max_blocks: None,
            event_capacity: shared_bus::DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

impl NodeConfig {
    /// Defaults plus process environment overrides.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env(|var| std::env::var(var).ok())?;
        Ok(config)
    }

    /// Apply overrides from `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(seed_hex) = lookup("CHAIN_BENEFICIARY_SEED") {
            let bytes = hex::decode(seed_hex.trim()).map_err(|e| ConfigError::InvalidEnv {
                var: "CHAIN_BENEFICIARY_SEED",
                reason: e.to_string(),
            })?;
            let seed: [u8; 32] = bytes.try_into().map_err(|b: Vec<u8>| {
                ConfigError::InvalidEnv {
                    var: "CHAIN_BENEFICIARY_SEED",
                    reason: format!("expected 32 bytes, got {}", b.len()),
                }
            })?;
            self.beneficiary_seed = Some(seed);
            info!("Loaded beneficiary seed from environment");
        }

        if let Some(workers) = parse_var::<usize, _>(&lookup, "CHAIN_POW_WORKERS")? {
            self.producer.pow.workers = Some(workers);
        }
        if let Some(target) = parse_var::<u32, _>(&lookup, "CHAIN_INITIAL_TARGET")? {
            self.producer.target.initial_target = target;
            if target < self.producer.target.minimum_target {
                warn!(
                    target,
                    minimum = self.producer.target.minimum_target,
                    "Initial target below minimum, lowering minimum"
                );
                self.producer.target.minimum_target = target;
            }
        }
        if let Some(max_blocks) = parse_var::<u64, _>(&lookup, "CHAIN_MAX_BLOCKS")? {
            self.max_blocks = Some(max_blocks);
        }

        Ok(())
    }

    /// Validate everything except the beneficiary, which is derived later.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.event_capacity == 0 {
            return Err(ConfigError::Invalid("event_capacity must be positive".into()));
        }
        let mut producer = self.producer.clone();
        if producer.beneficiary.is_empty() {
            producer.beneficiary = vec![0; 32];
        }
        producer
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }
}

fn parse_var<T, F>(lookup: &F, var: &'static str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    lookup(var)
        .map(|raw| {
            raw.trim().parse::<T>().map_err(|e| ConfigError::InvalidEnv {
                var,
                reason: e.to_string(),
            })
        })
        .transpose()
}
