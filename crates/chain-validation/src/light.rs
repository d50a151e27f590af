//! Light validation: rules that need no chain context.

use crate::error::{violation, Result, ValidationRule};
use shared_crypto::{meets_target, HasherFactory};
use shared_types::{is_empty_hash, short_hex, BlockHeader, OutPoint, Transaction};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::instrument;

/// Structural checks on transactions and headers.
#[derive(Clone)]
pub struct LightValidator {
    hashers: Arc<dyn HasherFactory>,
}

impl LightValidator {
    /// Create a validator hashing with `hashers`.
    pub fn new(hashers: Arc<dyn HasherFactory>) -> Self {
        Self { hashers }
    }

    /// Reject empty, duplicated, mis-identified or zero-valued transactions.
    #[instrument(skip_all, fields(txid = %short_hex(&tx.id)))]
    pub fn validate_tx_light(&self, tx: &Transaction) -> Result<()> {
        if tx.vin.is_empty() {
            return Err(violation(ValidationRule::EmptyInputs, "transaction has no inputs"));
        }
        if tx.vout.is_empty() {
            return Err(violation(ValidationRule::EmptyOutputs, "transaction has no outputs"));
        }

        let mut seen: HashSet<OutPoint> = HashSet::with_capacity(tx.vin.len());
        for (idx, input) in tx.vin.iter().enumerate() {
            if !seen.insert(input.outpoint()) {
                return Err(violation(
                    ValidationRule::DuplicateInput,
                    format!(
                        "input {idx} spends {}:{} twice",
                        short_hex(&input.txid),
                        input.vout
                    ),
                ));
            }
        }

        let mut hasher = self.hashers.create();
        let id = tx.compute_id(hasher.as_mut())?;
        if id != tx.id {
            return Err(violation(
                ValidationRule::IdMismatch,
                format!("declared {}, computed {}", short_hex(&tx.id), short_hex(&id)),
            ));
        }

        if let Some(idx) = tx.vout.iter().position(|out| out.amount == 0) {
            return Err(violation(
                ValidationRule::ZeroAmount,
                format!("output {idx} has zero amount"),
            ));
        }

        Ok(())
    }

    /// Reject headers with broken linkage fields or insufficient work.
    #[instrument(skip_all, fields(height = header.height))]
    pub fn validate_header(&self, header: &BlockHeader) -> Result<()> {
        if header.height > 0 && is_empty_hash(&header.prev_block_hash) {
            return Err(violation(
                ValidationRule::MissingParentHash,
                format!("height {} has no parent", header.height),
            ));
        }
        if is_empty_hash(&header.merkle_root) {
            return Err(violation(ValidationRule::EmptyMerkleRoot, "merkle root is empty"));
        }

        let mut hasher = self.hashers.create();
        let hash = header.compute_hash(hasher.as_mut())?;
        if !meets_target(&hash, header.target) {
            return Err(violation(
                ValidationRule::InsufficientWork,
                format!(
                    "hash {} lacks {} leading zero bits",
                    short_hex(&hash),
                    header.target
                ),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chain_explorer::test_utils::ChainBuilder;
    use proptest::prelude::*;
    use shared_crypto::{HashAlgorithm, Sha256dHasher};
    use shared_types::{Transaction, TxInput, TxOutput};

    fn validator() -> LightValidator {
        LightValidator::new(Arc::new(HashAlgorithm::Sha256d))
    }

    fn tx(inputs: &[([u8; 32], u32)], amounts: &[u64]) -> Transaction {
        let vin = inputs
            .iter()
            .map(|(txid, vout)| TxInput::new(*txid, *vout, b"owner".to_vec()))
            .collect();
        let vout = amounts
            .iter()
            .map(|a| TxOutput::new(*a, b"payee".to_vec()))
            .collect();
        Transaction::new(vin, vout, &mut Sha256dHasher::new()).unwrap()
    }

    #[test]
    fn test_valid_transaction() {
        assert!(validator().validate_tx_light(&tx(&[([1; 32], 0)], &[10])).is_ok());
    }

    #[test]
    fn test_empty_inputs_and_outputs() {
        let err = validator().validate_tx_light(&tx(&[], &[10])).unwrap_err();
        assert_eq!(err.rule(), Some(ValidationRule::EmptyInputs));

        let err = validator().validate_tx_light(&tx(&[([1; 32], 0)], &[])).unwrap_err();
        assert_eq!(err.rule(), Some(ValidationRule::EmptyOutputs));
    }

    #[test]
    fn test_duplicate_inputs() {
        let err = validator()
            .validate_tx_light(&tx(&[([1; 32], 0), ([1; 32], 0)], &[10]))
            .unwrap_err();
        assert_eq!(err.rule(), Some(ValidationRule::DuplicateInput));

        // Same txid, different index is fine.
        assert!(validator()
            .validate_tx_light(&tx(&[([1; 32], 0), ([1; 32], 1)], &[10]))
            .is_ok());
    }

    #[test]
    fn test_tampered_id() {
        let mut t = tx(&[([1; 32], 0)], &[10]);
        t.vout[0].amount = 11;
        let err = validator().validate_tx_light(&t).unwrap_err();
        assert_eq!(err.rule(), Some(ValidationRule::IdMismatch));
    }

    #[test]
    fn test_zero_amount() {
        let err = validator()
            .validate_tx_light(&tx(&[([1; 32], 0)], &[5, 0]))
            .unwrap_err();
        assert_eq!(err.rule(), Some(ValidationRule::ZeroAmount));
    }

    #[test]
    fn test_header_rules() {
        let mut builder = ChainBuilder::new();
        builder.set_target(6);
        builder.push(b"m", vec![]);
        let block = builder.next_block(b"m", vec![]);
        let validator = validator();

        assert!(validator.validate_header(&block.header).is_ok());

        let mut orphan = block.header.clone();
        orphan.prev_block_hash = [0; 32];
        assert_eq!(
            validator.validate_header(&orphan).unwrap_err().rule(),
            Some(ValidationRule::MissingParentHash)
        );

        let mut no_root = block.header.clone();
        no_root.merkle_root = [0; 32];
        assert_eq!(
            validator.validate_header(&no_root).unwrap_err().rule(),
            Some(ValidationRule::EmptyMerkleRoot)
        );

        let mut harder = block.header.clone();
        harder.target = 200;
        assert_eq!(
            validator.validate_header(&harder).unwrap_err().rule(),
            Some(ValidationRule::InsufficientWork)
        );
    }

    #[test]
    fn test_genesis_header_needs_no_parent() {
        let mut builder = ChainBuilder::new();
        let genesis = builder.push(b"m", vec![]);
        assert!(validator().validate_header(&genesis.header).is_ok());
    }

    proptest! {
        #[test]
        fn prop_well_formed_transactions_pass(
            vouts in proptest::collection::hash_set(0u32..1000, 1..8),
            amounts in proptest::collection::vec(1u64..1_000_000, 1..8),
            txid in any::<[u8; 32]>(),
        ) {
            let inputs: Vec<_> = vouts.into_iter().map(|v| (txid, v)).collect();
            prop_assert!(validator().validate_tx_light(&tx(&inputs, &amounts)).is_ok());
        }

        #[test]
        fn prop_repeated_input_fails(
            vout in 0u32..1000,
            txid in any::<[u8; 32]>(),
            amount in 1u64..1_000_000,
        ) {
            let err = validator()
                .validate_tx_light(&tx(&[(txid, vout), ([9; 32], 0), (txid, vout)], &[amount]))
                .unwrap_err();
            prop_assert_eq!(err.rule(), Some(ValidationRule::DuplicateInput));
        }
    }
}
