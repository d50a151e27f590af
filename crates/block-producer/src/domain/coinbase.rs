//! Coinbase construction.

use crate::error::{BlockProductionError, Result};
use shared_crypto::Hasher;
use shared_types::{PublicKey, Transaction};

/// Coinbase paying `reward + fees` to `beneficiary` at `height`.
///
/// A zero total still pays one base unit so the output is never empty.
pub fn build_coinbase(
    beneficiary: &PublicKey,
    reward: u64,
    fees: u64,
    height: u64,
    hasher: &mut dyn Hasher,
) -> Result<Transaction> {
    let total = reward
        .checked_add(fees)
        .ok_or(BlockProductionError::RewardOverflow { reward, fees })?;
    let amount = total.max(1);
    Ok(Transaction::coinbase(
        beneficiary.clone(),
        amount,
        height,
        hasher,
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_crypto::Sha256dHasher;

    #[test]
    fn test_pays_reward_plus_fees() {
        let tx = build_coinbase(&vec![7; 32], 50, 12, 3, &mut Sha256dHasher::new()).unwrap();
        assert!(tx.is_coinbase());
        assert_eq!(tx.vout.len(), 1);
        assert_eq!(tx.vout[0].amount, 62);
        assert!(tx.vout[0].is_locked_with(&[7; 32]));
    }

    #[test]
    fn test_zero_total_pays_one_unit() {
        let tx = build_coinbase(&vec![7; 32], 0, 0, 3, &mut Sha256dHasher::new()).unwrap();
        assert_eq!(tx.vout[0].amount, 1);
    }

    #[test]
    fn test_overflow_rejected() {
        let err = build_coinbase(&vec![7; 32], u64::MAX, 1, 3, &mut Sha256dHasher::new())
            .unwrap_err();
        assert!(matches!(err, BlockProductionError::RewardOverflow { .. }));
    }

    #[test]
    fn test_heights_give_distinct_ids() {
        let mut hasher = Sha256dHasher::new();
        let a = build_coinbase(&vec![7; 32], 50, 0, 1, &mut hasher).unwrap();
        let b = build_coinbase(&vec![7; 32], 50, 0, 2, &mut hasher).unwrap();
        assert_ne!(a.id, b.id);
    }
}
