//! # Core Domain Entities
//!
//! ## Clusters
//!
//! - **Chain**: `Block`, `BlockHeader`
//! - **Ledger**: `Transaction`, `TxInput`, `TxOutput`, `OutPoint`, `Utxo`
//!
//! Blocks are immutable once appended. A `Utxo` is never persisted; it is
//! a view derived by walking the chain.

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, Bytes};
use shared_crypto::{CryptoError, Hasher};

// =============================================================================
// PRIMITIVES
// =============================================================================

/// A 32-byte hash (SHA-256d or BLAKE3 depending on the configured hasher).
pub type Hash = shared_crypto::Hash;

/// Raw public key bytes. Outputs are locked to, and inputs declare, one of these.
pub type PublicKey = Vec<u8>;

/// The empty hash. Marks the genesis parent and the coinbase predecessor.
pub const ZERO_HASH: Hash = [0u8; 32];

/// Output index carried by the synthetic coinbase input.
pub const COINBASE_VOUT: u32 = u32::MAX;

/// True when `hash` is the empty hash.
#[inline]
pub fn is_empty_hash(hash: &Hash) -> bool {
    *hash == ZERO_HASH
}

/// Short hex prefix of a hash for log lines.
pub fn short_hex(hash: &Hash) -> String {
    hex::encode(&hash[..8])
}

// =============================================================================
// CLUSTER A: THE CHAIN
// =============================================================================

/// Serialized length of [`BlockHeader::pow_bytes`].
pub const HEADER_BYTES_LEN: usize = 4 + 32 + 32 + 8 + 8 + 4 + 8;

/// Offset of the nonce inside [`BlockHeader::pow_bytes`]. The nonce is last so
/// miners can rewrite it in place.
pub const NONCE_OFFSET: usize = HEADER_BYTES_LEN - 8;

/// The header of a block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct BlockHeader {
    /// Protocol version for this block.
    pub version: u32,
    /// Hash of the parent block. Empty for genesis.
    pub prev_block_hash: Hash,
    /// Merkle root of the block's transaction ids.
    pub merkle_root: Hash,
    /// Block height in the chain (genesis is 0).
    pub height: u64,
    /// Unix timestamp (seconds) when the header was assembled.
    pub timestamp: u64,
    /// Required number of leading zero bits in the block hash.
    pub target: u32,
    /// PoW nonce.
    pub nonce: u64,
}

impl BlockHeader {
    /// Canonical byte assembly hashed for the block id and PoW.
    pub fn pow_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(HEADER_BYTES_LEN);
        buf.extend_from_slice(&self.version.to_le_bytes());
        buf.extend_from_slice(&self.prev_block_hash);
        buf.extend_from_slice(&self.merkle_root);
        buf.extend_from_slice(&self.height.to_le_bytes());
        buf.extend_from_slice(&self.timestamp.to_le_bytes());
        buf.extend_from_slice(&self.target.to_le_bytes());
        buf.extend_from_slice(&self.nonce.to_le_bytes());
        buf
    }

    /// Overwrite the nonce field of a buffer produced by [`Self::pow_bytes`].
    #[inline]
    pub fn write_nonce(buf: &mut [u8], nonce: u64) {
        buf[NONCE_OFFSET..HEADER_BYTES_LEN].copy_from_slice(&nonce.to_le_bytes());
    }

    /// Hash this header with the caller's hasher.
    pub fn compute_hash(&self, hasher: &mut dyn Hasher) -> Result<Hash, CryptoError> {
        hasher.hash(&self.pow_bytes())
    }

    /// True for the height-0 block.
    pub fn is_genesis(&self) -> bool {
        self.height == 0
    }
}

/// A block: header, ordered transactions and the header's hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// The block header.
    pub header: BlockHeader,
    /// Transactions, coinbase first.
    pub transactions: Vec<Transaction>,
    /// Hash of `header`.
    pub hash: Hash,
}

impl Block {
    /// Block height.
    pub fn height(&self) -> u64 {
        self.header.height
    }

    /// Ids of all transactions in block order.
    pub fn transaction_ids(&self) -> Vec<Hash> {
        self.transactions.iter().map(|tx| tx.id).collect()
    }

    /// Number of coinbase transactions in this block.
    pub fn coinbase_count(&self) -> usize {
        self.transactions.iter().filter(|tx| tx.is_coinbase()).count()
    }
}

// =============================================================================
// CLUSTER B: THE LEDGER
// =============================================================================

/// Reference to a specific output of a prior transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OutPoint {
    /// Transaction id.
    pub txid: Hash,
    /// Output index within that transaction.
    pub vout: u32,
}

/// A transaction input.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxInput {
    /// Id of the transaction whose output is spent.
    pub txid: Hash,
    /// Index of the spent output.
    pub vout: u32,
    /// Unlocking data. A signature for regular inputs, a height tag for the coinbase.
    #[serde_as(as = "Bytes")]
    pub script_sig: Vec<u8>,
    /// Key the spender claims owns the referenced output.
    #[serde_as(as = "Bytes")]
    pub pub_key: PublicKey,
}

impl TxInput {
    /// Unsigned input spending `txid:vout` with `pub_key`.
    pub fn new(txid: Hash, vout: u32, pub_key: PublicKey) -> Self {
        Self {
            txid,
            vout,
            script_sig: Vec::new(),
            pub_key,
        }
    }

    /// The output this input spends.
    pub fn outpoint(&self) -> OutPoint {
        OutPoint {
            txid: self.txid,
            vout: self.vout,
        }
    }

    /// True for the synthetic input of a coinbase transaction.
    pub fn is_coinbase_marker(&self) -> bool {
        is_empty_hash(&self.txid) && self.vout == COINBASE_VOUT
    }
}

/// A transaction output.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxOutput {
    /// Value in base units. Never zero in a valid transaction.
    pub amount: u64,
    /// Opaque locking script.
    #[serde_as(as = "Bytes")]
    pub script_pub_key: Vec<u8>,
    /// Key that may unlock this output.
    #[serde_as(as = "Bytes")]
    pub pub_key: PublicKey,
}

impl TxOutput {
    /// Pay-to-public-key output.
    pub fn new(amount: u64, pub_key: PublicKey) -> Self {
        Self {
            amount,
            script_pub_key: pub_key.clone(),
            pub_key,
        }
    }

    /// True if `pub_key` can unlock this output.
    pub fn is_locked_with(&self, pub_key: &[u8]) -> bool {
        self.pub_key == pub_key
    }
}

/// A transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Hash of [`Transaction::signable_bytes`].
    pub id: Hash,
    /// Inputs, in order.
    pub vin: Vec<TxInput>,
    /// Outputs, in order.
    pub vout: Vec<TxOutput>,
}

impl Transaction {
    /// Build a transaction and compute its id.
    pub fn new(
        vin: Vec<TxInput>,
        vout: Vec<TxOutput>,
        hasher: &mut dyn Hasher,
    ) -> Result<Self, CryptoError> {
        let mut tx = Self {
            id: [0u8; 32],
            vin,
            vout,
        };
        tx.id = tx.compute_id(hasher)?;
        Ok(tx)
    }

    /// Coinbase paying `amount` to `to` at `height`.
    ///
    /// The height tag makes coinbases at different heights distinct even when
    /// they pay the same key the same amount.
    pub fn coinbase(
        to: PublicKey,
        amount: u64,
        height: u64,
        hasher: &mut dyn Hasher,
    ) -> Result<Self, CryptoError> {
        let input = TxInput {
            txid: ZERO_HASH,
            vout: COINBASE_VOUT,
            script_sig: format!("COINBASE:HEIGHT:{height}").into_bytes(),
            pub_key: Vec::new(),
        };
        Self::new(vec![input], vec![TxOutput::new(amount, to)], hasher)
    }

    /// A coinbase has exactly one synthetic input with no predecessor.
    pub fn is_coinbase(&self) -> bool {
        self.vin.len() == 1 && self.vin[0].is_coinbase_marker()
    }

    /// Bytes covered by the id and by input signatures.
    ///
    /// Regular inputs contribute everything except `script_sig`, so that
    /// signatures never cover themselves. The coinbase input keeps its
    /// `script_sig` because it holds the height tag, not a signature.
    pub fn signable_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::new();

        buf.extend_from_slice(&(self.vin.len() as u32).to_le_bytes());
        for input in &self.vin {
            buf.extend_from_slice(&input.txid);
            buf.extend_from_slice(&input.vout.to_le_bytes());
            if input.is_coinbase_marker() {
                put_bytes(&mut buf, &input.script_sig);
            }
            put_bytes(&mut buf, &input.pub_key);
        }

        buf.extend_from_slice(&(self.vout.len() as u32).to_le_bytes());
        for output in &self.vout {
            buf.extend_from_slice(&output.amount.to_le_bytes());
            put_bytes(&mut buf, &output.script_pub_key);
            put_bytes(&mut buf, &output.pub_key);
        }

        buf
    }

    /// Recompute the id from the current contents.
    pub fn compute_id(&self, hasher: &mut dyn Hasher) -> Result<Hash, CryptoError> {
        hasher.hash(&self.signable_bytes())
    }

    /// Sum of output amounts, `None` on overflow.
    pub fn output_total(&self) -> Option<u64> {
        self.vout
            .iter()
            .try_fold(0u64, |acc, out| acc.checked_add(out.amount))
    }
}

fn put_bytes(buf: &mut Vec<u8>, bytes: &[u8]) {
    buf.extend_from_slice(&(bytes.len() as u32).to_le_bytes());
    buf.extend_from_slice(bytes);
}

/// An unspent output, derived by chain traversal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utxo {
    /// Id of the transaction that created the output.
    pub txid: Hash,
    /// Index of the output within that transaction.
    pub out_idx: u32,
    /// The output itself.
    pub output: TxOutput,
}

impl Utxo {
    /// The outpoint identifying this UTXO.
    pub fn outpoint(&self) -> OutPoint {
        OutPoint {
            txid: self.txid,
            vout: self.out_idx,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_crypto::Sha256dHasher;

    fn sample_tx(hasher: &mut Sha256dHasher) -> Transaction {
        Transaction::new(
            vec![TxInput::new([1u8; 32], 0, b"alice".to_vec())],
            vec![
                TxOutput::new(70, b"bob".to_vec()),
                TxOutput::new(30, b"alice".to_vec()),
            ],
            hasher,
        )
        .unwrap()
    }

    #[test]
    fn test_header_bytes_layout() {
        let header = BlockHeader {
            version: 1,
            height: 7,
            nonce: 0xAABB,
            ..Default::default()
        };
        let bytes = header.pow_bytes();
        assert_eq!(bytes.len(), HEADER_BYTES_LEN);
        assert_eq!(&bytes[NONCE_OFFSET..], &0xAABBu64.to_le_bytes());
    }

    #[test]
    fn test_write_nonce_matches_field() {
        let mut header = BlockHeader::default();
        let mut bytes = header.pow_bytes();

        BlockHeader::write_nonce(&mut bytes, 42);
        header.nonce = 42;

        assert_eq!(bytes, header.pow_bytes());
    }

    #[test]
    fn test_header_hash_depends_on_nonce() {
        let mut hasher = Sha256dHasher::new();
        let mut header = BlockHeader::default();
        let h1 = header.compute_hash(&mut hasher).unwrap();
        header.nonce = 1;
        let h2 = header.compute_hash(&mut hasher).unwrap();
        assert_ne!(h1, h2);
    }

    #[test]
    fn test_id_ignores_signature() {
        let mut hasher = Sha256dHasher::new();
        let mut tx = sample_tx(&mut hasher);
        let id = tx.id;

        tx.vin[0].script_sig = vec![9u8; 64];
        assert_eq!(tx.compute_id(&mut hasher).unwrap(), id);
    }

    #[test]
    fn test_id_covers_outputs() {
        let mut hasher = Sha256dHasher::new();
        let mut tx = sample_tx(&mut hasher);
        tx.vout[0].amount += 1;
        assert_ne!(tx.compute_id(&mut hasher).unwrap(), tx.id);
    }

    #[test]
    fn test_coinbase_shape() {
        let mut hasher = Sha256dHasher::new();
        let cb = Transaction::coinbase(b"miner".to_vec(), 50, 3, &mut hasher).unwrap();

        assert!(cb.is_coinbase());
        assert_eq!(cb.vout.len(), 1);
        assert_eq!(cb.vout[0].amount, 50);
        assert!(cb.vout[0].is_locked_with(b"miner"));
        assert!(!sample_tx(&mut hasher).is_coinbase());
    }

    #[test]
    fn test_coinbase_ids_differ_by_height() {
        let mut hasher = Sha256dHasher::new();
        let a = Transaction::coinbase(b"miner".to_vec(), 50, 1, &mut hasher).unwrap();
        let b = Transaction::coinbase(b"miner".to_vec(), 50, 2, &mut hasher).unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_output_total_overflow() {
        let mut hasher = Sha256dHasher::new();
        let mut tx = sample_tx(&mut hasher);
        assert_eq!(tx.output_total(), Some(100));

        tx.vout[0].amount = u64::MAX;
        assert_eq!(tx.output_total(), None);
    }

    #[test]
    fn test_block_serde_roundtrip() {
        let mut hasher = Sha256dHasher::new();
        let block = Block {
            header: BlockHeader::default(),
            transactions: vec![sample_tx(&mut hasher)],
            hash: [3u8; 32],
        };
        let json = serde_json::to_string(&block).unwrap();
        let back: Block = serde_json::from_str(&json).unwrap();
        assert_eq!(block, back);
    }
}
