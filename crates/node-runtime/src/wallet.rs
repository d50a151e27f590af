//! # Payment Construction
//!
//! Builds a signed transfer from one Ed25519 key:
//!
//! 1. select unspent outputs covering `amount + fee`, most recent first
//! 2. pay `amount` to the recipient and return any surplus over the fee as change
//! 3. sign the signable bytes once and attach the signature to every input
//!
//! The signature does not cover `script_sig`, so attaching it leaves the id intact.

use crate::error::{NodeError, Result};
use chain_explorer::ChainExplorer;
use shared_crypto::{Ed25519KeyPair, Hasher};
use shared_types::{PublicKey, Transaction, TxInput, TxOutput};
use tracing::debug;

/// A transfer request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payment {
    /// Recipient key.
    pub to: PublicKey,
    /// Value delivered to the recipient.
    pub amount: u64,
    /// Value left for the miner.
    pub fee: u64,
}

/// Build and sign a transaction spending `keypair`'s outputs.
pub fn build_payment(
    explorer: &ChainExplorer,
    keypair: &Ed25519KeyPair,
    payment: &Payment,
    hasher: &mut dyn Hasher,
) -> Result<Transaction> {
    if payment.amount == 0 {
        return Err(NodeError::InvalidPayment("amount must be positive".into()));
    }
    if payment.to.is_empty() {
        return Err(NodeError::InvalidPayment("recipient key is empty".into()));
    }
    let required = payment
        .amount
        .checked_add(payment.fee)
        .ok_or_else(|| NodeError::InvalidPayment("amount plus fee overflows".into()))?;

    let from = keypair.public_key().to_vec();
    let (available, selected) = explorer.find_amount_spendable_outputs(&from, required)?;
    if available < required {
        return Err(NodeError::InsufficientFunds {
            available,
            required,
        });
    }

    let mut spends: Vec<_> = selected
        .into_iter()
        .flat_map(|(txid, indices)| indices.into_iter().map(move |idx| (txid, idx)))
        .collect();
    spends.sort_unstable();

    let vin = spends
        .iter()
        .map(|(txid, idx)| TxInput::new(*txid, *idx, from.clone()))
        .collect();
    let mut vout = vec![TxOutput::new(payment.amount, payment.to.clone())];
    let change = available - required;
    if change > 0 {
        vout.push(TxOutput::new(change, from));
    }

    let mut tx = Transaction::new(vin, vout, hasher)?;
    let signature = keypair.sign(&tx.signable_bytes());
    for input in &mut tx.vin {
        input.script_sig = signature.to_vec();
    }

    debug!(
        inputs = tx.vin.len(),
        amount = payment.amount,
        fee = payment.fee,
        change,
        "Built payment"
    );
    Ok(tx)
}
