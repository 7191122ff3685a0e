//! Trait definitions for the waiting-store interface.

use bitcoin::Txid;

use crate::{types::DepositProof, DbResult};

/// Persistence backing the voting pipeline: proofs parked until the chain
/// grows past their confirmation requirement, plus the permanent record of
/// txids this relay has voted for.
///
/// Implementations must make each individual operation atomic; the two
/// pipeline loops and detached writer tasks call in concurrently with no
/// external locking.
pub trait WaitingDatabase: Send + Sync + 'static {
    /// Inserts a proof waiting for more confirmations, keyed by txid.
    /// Idempotent; re-inserting an existing txid is not an error.
    fn put_waiting(&self, txid: Txid, proof: DepositProof) -> DbResult<()>;

    /// Returns whether a waiting entry exists for the txid.
    fn is_waiting(&self, txid: &Txid) -> DbResult<bool>;

    /// Returns whether the txid has already been voted for.
    fn is_voted(&self, txid: &Txid) -> DbResult<bool>;

    /// Permanently marks the txid as voted. Idempotent; the marker is never
    /// deleted.
    fn mark_voted(&self, txid: &Txid) -> DbResult<()>;

    /// Tries to delete a waiting entry, returning if it really existed.
    fn del_waiting(&self, txid: &Txid) -> DbResult<bool>;

    /// Atomically removes and returns every waiting entry whose claimed
    /// block height is `<= max_height`. No entry may be both returned and
    /// left behind, and no entry is ever returned twice.
    fn take_waiting_under_height(&self, max_height: u32) -> DbResult<Vec<(Txid, DepositProof)>>;
}
