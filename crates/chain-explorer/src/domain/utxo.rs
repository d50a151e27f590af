//! Unspent-output derivation.
//!
//! Blocks are visited tip first and genesis is skipped. Inside a block,
//! transactions are visited last to first. For each transaction its outputs
//! are checked against the spent set before its own inputs are added to it,
//! so a spend is always recorded before the output it consumes is reached.

use crate::error::Result;
use shared_types::{Block, Hash, Transaction, Utxo};
use std::collections::{HashMap, HashSet};

/// Outcome of one traversal for one key.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct UnspentScan {
    /// Unspent outputs locked to the key, in traversal order.
    pub outputs: Vec<Utxo>,
    /// Transactions holding at least one of those outputs, in traversal order.
    pub transactions: Vec<Transaction>,
}

/// Walk `blocks` (tip first) and collect everything `pub_key` can spend.
pub fn scan_unspent<I>(blocks: I, pub_key: &[u8]) -> Result<UnspentScan>
where
    I: IntoIterator<Item = Result<Block>>,
{
    let mut spent: HashMap<Hash, HashSet<u32>> = HashMap::new();
    let mut scan = UnspentScan::default();

    for block in blocks {
        let block = block?;
        if block.header.is_genesis() {
            continue;
        }

        for tx in block.transactions.iter().rev() {
            let spent_here = spent.get(&tx.id);
            let mut holds_unspent = false;

            for (idx, output) in tx.vout.iter().enumerate() {
                let idx = idx as u32;
                if spent_here.is_some_and(|set| set.contains(&idx)) {
                    continue;
                }
                if output.is_locked_with(pub_key) {
                    scan.outputs.push(Utxo {
                        txid: tx.id,
                        out_idx: idx,
                        output: output.clone(),
                    });
                    holds_unspent = true;
                }
            }

            if holds_unspent {
                scan.transactions.push(tx.clone());
            }

            if !tx.is_coinbase() {
                for input in &tx.vin {
                    spent.entry(input.txid).or_default().insert(input.vout);
                }
            }
        }
    }

    Ok(scan)
}

/// Pick unspent outputs in order until `amount` is covered.
///
/// Returns the accumulated total, which is below `amount` when the key
/// cannot afford it, and the chosen output indices per transaction.
pub fn select_spendable(outputs: &[Utxo], amount: u64) -> (u64, HashMap<Hash, Vec<u32>>) {
    let mut accumulated = 0u64;
    let mut selected: HashMap<Hash, Vec<u32>> = HashMap::new();

    for utxo in outputs {
        if accumulated >= amount {
            break;
        }
        accumulated = accumulated.saturating_add(utxo.output.amount);
        selected.entry(utxo.txid).or_default().push(utxo.out_idx);
    }

    (accumulated, selected)
}
