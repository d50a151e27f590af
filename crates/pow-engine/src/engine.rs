//! Parallel nonce search.

use crate::config::PowConfig;
use crate::error::{PowError, Result};
use crate::partition::partition_nonce_space;
use shared_crypto::{meets_target, Hash, HasherFactory, HASH_BITS};
use shared_types::BlockHeader;
use std::ops::Range;
use std::sync::{Arc, OnceLock};
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// Searches a header's nonce space on a pool of worker threads.
#[derive(Clone)]
pub struct PowEngine {
    hashers: Arc<dyn HasherFactory>,
    config: PowConfig,
}

impl PowEngine {
    /// Create an engine hashing with `hashers`.
    pub fn new(hashers: Arc<dyn HasherFactory>, config: PowConfig) -> Self {
        Self { hashers, config }
    }

    /// The engine's configuration.
    pub fn config(&self) -> &PowConfig {
        &self.config
    }

    /// Workers launched per search.
    pub fn worker_count(&self) -> usize {
        self.config.effective_workers()
    }

    /// Find a nonce whose header hash has `header.target` leading zero bits.
    ///
    /// Blocks the calling thread until a worker succeeds, every range is
    /// exhausted, or `cancel` fires. The first reported `(hash, nonce)` wins.
    /// The header's own nonce is ignored.
    #[instrument(skip_all, fields(height = header.height, target = header.target))]
    pub fn search(&self, header: &BlockHeader, cancel: &CancellationToken) -> Result<(Hash, u64)> {
        if header.target >= HASH_BITS {
            return Err(PowError::InvalidTarget {
                target: header.target,
                max: HASH_BITS,
            });
        }
        if cancel.is_cancelled() {
            return Err(PowError::Cancelled);
        }

        let ranges = partition_nonce_space(self.config.max_nonce, self.worker_count());
        let template = header.pow_bytes();
        let target = header.target;

        // Fires on outer cancellation or on the first success.
        let stop = cancel.child_token();
        let winner: OnceLock<(Hash, u64)> = OnceLock::new();
        let mut failure: Option<PowError> = None;
        let mut panicked = false;

        let started = Instant::now();
        debug!(workers = ranges.len(), "Starting nonce search");

        std::thread::scope(|scope| {
            let handles: Vec<_> = ranges
                .into_iter()
                .map(|range| {
                    let worker = Worker {
                        buf: template.clone(),
                        target,
                        stop: &stop,
                        winner: &winner,
                    };
                    let hashers = &self.hashers;
                    scope.spawn(move || worker.run(hashers.as_ref(), range))
                })
                .collect();

            for handle in handles {
                match handle.join() {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => {
                        failure.get_or_insert(e);
                    }
                    Err(_) => panicked = true,
                }
            }
        });

        let elapsed_ms = started.elapsed().as_millis() as u64;

        if let Some((hash, nonce)) = winner.into_inner() {
            info!(nonce, elapsed_ms, "Nonce found");
            return Ok((hash, nonce));
        }
        if let Some(e) = failure {
            warn!(error = %e, "Nonce search aborted by hashing failure");
            return Err(e);
        }
        if panicked {
            return Err(PowError::WorkerPanicked);
        }
        if cancel.is_cancelled() {
            debug!(elapsed_ms, "Nonce search cancelled");
            return Err(PowError::Cancelled);
        }

        debug!(elapsed_ms, max_nonce = self.config.max_nonce, "Nonce space exhausted");
        Err(PowError::NonceSpaceExhausted)
    }
}

/// One worker's private state: its own copy of the header bytes plus read
/// access to the shared stop signal and result slot.
struct Worker<'a> {
    buf: Vec<u8>,
    target: u32,
    stop: &'a CancellationToken,
    winner: &'a OnceLock<(Hash, u64)>,
}

impl Worker<'_> {
    fn run(mut self, hashers: &dyn HasherFactory, range: Range<u64>) -> Result<()> {
        let mut hasher = hashers.create();

        for nonce in range {
            if self.stop.is_cancelled() {
                return Ok(());
            }

            BlockHeader::write_nonce(&mut self.buf, nonce);
            let hash = match hasher.hash(&self.buf) {
                Ok(hash) => hash,
                Err(e) => {
                    self.stop.cancel();
                    return Err(e.into());
                }
            };

            if meets_target(&hash, self.target) {
                let _ = self.winner.set((hash, nonce));
                self.stop.cancel();
                return Ok(());
            }
        }
        Ok(())
    }
}
