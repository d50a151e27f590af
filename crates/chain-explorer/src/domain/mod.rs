//! Domain layer: traversal, UTXO derivation and target adjustment.

pub mod cursor;
pub mod target;
pub mod utxo;

pub use cursor::{BlockCursor, ChainCursor, ChainItem, HeaderCursor};
pub use target::calculate_mining_target;
pub use utxo::{scan_unspent, select_spendable, UnspentScan};
