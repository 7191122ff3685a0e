//! Module for waiting-store local types

use bitcoin::{
    consensus::{self, deserialize, serialize},
    Transaction,
};
use borsh::{BorshDeserialize, BorshSerialize};

/// A claimed bitcoin deposit together with the SPV material backing the
/// claim.
///
/// This is both the unit that travels through the voting queue and the
/// entry persisted in the waiting store while confirmations accumulate.
/// Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct DepositProof {
    /// Raw serialized transaction. This is basically `consensus::serialize()`
    /// of [`Transaction`]
    tx_raw: Vec<u8>,

    /// Raw serialized merkle block proving the transaction's inclusion.
    proof_raw: Vec<u8>,

    /// Height of the block the transaction is claimed to be included in.
    height: u32,

    /// Number of confirmations the submitter asks the relay to wait for.
    blocks_to_wait: u32,
}

impl DepositProof {
    pub fn new(tx_raw: Vec<u8>, proof_raw: Vec<u8>, height: u32, blocks_to_wait: u32) -> Self {
        Self {
            tx_raw,
            proof_raw,
            height,
            blocks_to_wait,
        }
    }

    /// Create a new [`DepositProof`] from an already-decoded [`Transaction`].
    pub fn from_tx(
        tx: &Transaction,
        proof_raw: Vec<u8>,
        height: u32,
        blocks_to_wait: u32,
    ) -> Self {
        Self::new(serialize(tx), proof_raw, height, blocks_to_wait)
    }

    /// Returns the raw serialized transaction.
    ///
    /// # Note
    ///
    /// Whenever possible use [`try_to_tx()`](DepositProof::try_to_tx) to
    /// deserialize the transaction. This imposes more strict type checks.
    pub fn tx_raw(&self) -> &[u8] {
        &self.tx_raw
    }

    /// Returns the raw serialized merkle-block proof.
    pub fn proof_raw(&self) -> &[u8] {
        &self.proof_raw
    }

    /// Height the transaction is claimed to be included at.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Confirmation requirement the submitter attached to the proof.
    pub fn blocks_to_wait(&self) -> u32 {
        self.blocks_to_wait
    }

    /// Deserializes the raw transaction into a [`Transaction`].
    pub fn try_to_tx(&self) -> Result<Transaction, consensus::encode::Error> {
        deserialize(&self.tx_raw)
    }

    /// First chain height at which the proof's own confirmation requirement
    /// is met. Derived once from the submitted fields, never recomputed.
    pub fn eligible_height(&self) -> u32 {
        self.height
            .saturating_add(self.blocks_to_wait.saturating_sub(1))
    }
}
