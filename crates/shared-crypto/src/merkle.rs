//! Merkle root over transaction ids.
//!
//! Leaves are hashed pairwise level by level. An odd node at the end of a
//! level is carried up unchanged.

use crate::{CryptoError, Hash, Hasher};

/// Root of an empty leaf set.
pub const EMPTY_MERKLE_ROOT: Hash = [0u8; 32];

/// Compute the Merkle root of `leaves` with the caller's hasher.
pub fn merkle_root(hasher: &mut dyn Hasher, leaves: &[Hash]) -> Result<Hash, CryptoError> {
    if leaves.is_empty() {
        return Ok(EMPTY_MERKLE_ROOT);
    }

    let mut level: Vec<Hash> = leaves.to_vec();
    let mut buf = [0u8; 64];

    while level.len() > 1 {
        let mut next_level = Vec::with_capacity(level.len().div_ceil(2));

        for chunk in level.chunks(2) {
            let node = if let [left, right] = chunk {
                buf[..32].copy_from_slice(left);
                buf[32..].copy_from_slice(right);
                hasher.hash(&buf)?
            } else {
                chunk[0]
            };
            next_level.push(node);
        }

        level = next_level;
    }

    Ok(level[0])
}
