//! Pure block-assembly rules: coinbase construction.
//!
//! The subsidy schedule is shared with validation and lives in
//! [`chain_validation::reward`].

pub mod coinbase;

pub use coinbase::build_coinbase;
