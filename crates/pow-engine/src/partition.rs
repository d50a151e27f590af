//! Nonce space partitioning.

use std::ops::Range;

/// Split `[0, max_nonce)` into `workers` contiguous ranges of equal size.
///
/// The last range absorbs the remainder. When `max_nonce < workers` the
/// leading ranges are empty.
pub fn partition_nonce_space(max_nonce: u64, workers: usize) -> Vec<Range<u64>> {
    let workers = workers.max(1) as u64;
    let chunk = max_nonce / workers;

    (0..workers)
        .map(|i| {
            let start = i * chunk;
            let end = if i == workers - 1 {
                max_nonce
            } else {
                start + chunk
            };
            start..end
        })
        .collect()
}
