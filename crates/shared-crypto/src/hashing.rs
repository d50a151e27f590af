//! # Hashing Capability
//!
//! The chain core never hashes through a global function. Every consumer
//! receives a [`HasherFactory`] and creates its own [`Hasher`] instance,
//! because hasher state is not assumed to be shareable across threads.
//! The PoW engine creates one hasher per worker.
//!
//! ## Algorithms
//!
//! | Algorithm | Construction | Use Case |
//! |-----------|--------------|----------|
//! | `Sha256d` | sha256(sha256(data)) | Default chain hash |
//! | `Blake3`  | blake3(data) | Fast dev/test chains |

use crate::CryptoError;
use serde::Deserialize;
use sha2::{Digest, Sha256};

/// 256-bit digest.
pub type Hash = [u8; 32];

/// Width of a [`Hash`] in bits. A PoW target must be strictly below this.
pub const HASH_BITS: u32 = 256;

/// A stateful hashing capability.
///
/// Implementations may keep internal buffers between calls, so a single
/// instance must not be shared by concurrent workers.
pub trait Hasher {
    /// Hash `data` and return the digest.
    fn hash(&mut self, data: &[u8]) -> Result<Hash, CryptoError>;
}

/// Creates fresh [`Hasher`] instances.
pub trait HasherFactory: Send + Sync {
    /// Create a hasher owned by the caller.
    fn create(&self) -> Box<dyn Hasher + Send>;
}

/// Hash algorithm selection, usable from configuration.
#[derive(Copy, Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub enum HashAlgorithm {
    /// SHA-256d (Bitcoin-style): sha256(sha256(data))
    #[default]
    #[serde(rename = "sha256d")]
    Sha256d,

    /// BLAKE3: blake3(data)
    #[serde(rename = "blake3")]
    Blake3,
}

impl HasherFactory for HashAlgorithm {
    fn create(&self) -> Box<dyn Hasher + Send> {
        match self {
            Self::Sha256d => Box::new(Sha256dHasher::new()),
            Self::Blake3 => Box::new(Blake3Hasher::new()),
        }
    }
}

/// Double SHA-256 hasher that reuses its digest state between calls.
#[derive(Clone, Default)]
pub struct Sha256dHasher {
    inner: Sha256,
}

impl Sha256dHasher {
    /// Create new hasher.
    pub fn new() -> Self {
        Self {
            inner: Sha256::new(),
        }
    }
}

impl Hasher for Sha256dHasher {
    fn hash(&mut self, data: &[u8]) -> Result<Hash, CryptoError> {
        self.inner.update(data);
        let first = self.inner.finalize_reset();
        self.inner.update(first);
        Ok(self.inner.finalize_reset().into())
    }
}

/// Stateful BLAKE3 hasher.
pub struct Blake3Hasher {
    inner: blake3::Hasher,
}

impl Blake3Hasher {
    /// Create new hasher.
    pub fn new() -> Self {
        Self {
            inner: blake3::Hasher::new(),
        }
    }
}

impl Default for Blake3Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher for Blake3Hasher {
    fn hash(&mut self, data: &[u8]) -> Result<Hash, CryptoError> {
        self.inner.reset();
        self.inner.update(data);
        Ok(*self.inner.finalize().as_bytes())
    }
}

/// Hash data with BLAKE3 (one-shot).
pub fn blake3_hash(data: &[u8]) -> Hash {
    *blake3::hash(data).as_bytes()
}

/// Count the leading zero bits of a digest.
pub fn leading_zero_bits(hash: &[u8]) -> u32 {
    let mut bits = 0;
    for byte in hash {
        if *byte == 0 {
            bits += 8;
        } else {
            bits += byte.leading_zeros();
            break;
        }
    }
    bits
}

/// True when the first `target` bits of `hash` are all zero.
#[inline]
pub fn meets_target(hash: &[u8], target: u32) -> bool {
    leading_zero_bits(hash) >= target
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256d_known_vector() {
        // sha256d("hello")
        let mut hasher = Sha256dHasher::new();
        let hash = hasher.hash(b"hello").unwrap();
        assert_eq!(
            hex::encode(hash),
            "9595c9df90075148eb06860365df33584b75bff782a510c6cd4883a419833d50"
        );
    }

    #[test]
    fn test_hasher_reuse_is_stateless() {
        let mut hasher = Sha256dHasher::new();
        let h1 = hasher.hash(b"input").unwrap();
        let _ = hasher.hash(b"something else").unwrap();
        let h2 = hasher.hash(b"input").unwrap();
        assert_eq!(h1, h2);

        let mut hasher = Blake3Hasher::new();
        let h1 = hasher.hash(b"input").unwrap();
        let _ = hasher.hash(b"something else").unwrap();
        let h2 = hasher.hash(b"input").unwrap();
        assert_eq!(h1, h2);
    }

    #[test]
    fn test_blake3_matches_one_shot() {
        let mut hasher = Blake3Hasher::new();
        assert_eq!(hasher.hash(b"hello world").unwrap(), blake3_hash(b"hello world"));
    }

    #[test]
    fn test_factory_selects_algorithm() {
        let mut sha = HashAlgorithm::Sha256d.create();
        let mut b3 = HashAlgorithm::Blake3.create();
        assert_ne!(sha.hash(b"x").unwrap(), b3.hash(b"x").unwrap());
    }

    #[test]
    fn test_leading_zero_bits() {
        let mut hash = [0xFFu8; 32];
        assert_eq!(leading_zero_bits(&hash), 0);

        hash[0] = 0x00;
        hash[1] = 0x1F;
        assert_eq!(leading_zero_bits(&hash), 11);

        assert_eq!(leading_zero_bits(&[0u8; 32]), 256);
    }

    #[test]
    fn test_meets_target() {
        let mut hash = [0xFFu8; 32];
        hash[0] = 0x00;
        hash[1] = 0x0F;

        assert!(meets_target(&hash, 0));
        assert!(meets_target(&hash, 12));
        assert!(!meets_target(&hash, 13));
    }
}
