//! Configuration for the nonce search

use crate::error::{PowError, Result};
use serde::Deserialize;

/// Worker pool and search-space settings.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PowConfig {
    /// Number of worker threads. `None` uses half the available cores (at least one).
    pub workers: Option<usize>,

    /// Exclusive upper bound of the nonce space.
    pub max_nonce: u64,
}

impl Default for PowConfig {
    fn default() -> Self {
        Self {
            workers: None,
            max_nonce: u64::MAX,
        }
    }
}

impl PowConfig {
    /// Pin the worker count.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }

    /// Shrink the nonce space (tests force exhaustion with this).
    pub fn with_max_nonce(mut self, max_nonce: u64) -> Self {
        self.max_nonce = max_nonce;
        self
    }

    /// Workers actually launched per attempt.
    pub fn effective_workers(&self) -> usize {
        self.workers
            .unwrap_or_else(|| num_cpus::get() / 2)
            .max(1)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.workers == Some(0) {
            return Err(PowError::InvalidConfig("workers must be at least 1".into()));
        }
        if self.max_nonce == 0 {
            return Err(PowError::InvalidConfig("max_nonce must be positive".into()));
        }
        Ok(())
    }
}
