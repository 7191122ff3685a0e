//! Interfaces of the collaborators the voting pipeline consumes.

use async_trait::async_trait;
use bitcoin::{block::Header, Txid};
use thiserror::Error;

/// Read access to the locally synced, trusted header chain.
///
/// Served by the SPV header-sync collaborator; the verifier treats whatever
/// this store returns as ground truth.
#[cfg_attr(test, mockall::automock)]
pub trait HeaderStore: Send + Sync + 'static {
    /// Current best height of the trusted chain.
    fn best_height(&self) -> Result<u32, HeaderStoreError>;

    /// The trusted header at exactly `height`, if the store has one.
    fn header_at(&self, height: u32) -> Result<Option<Header>, HeaderStoreError>;
}

/// Errors from header-store lookups.
#[derive(Debug, Error)]
pub enum HeaderStoreError {
    #[error("header store unavailable: {0}")]
    Unavailable(String),

    #[error("{0}")]
    Other(String),
}

/// Receipt the alliance chain returns for an accepted vote submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteReceipt {
    /// Hash of the alliance-chain transaction carrying the vote.
    pub tx_hash: String,
}

/// Client interface for casting deposit votes on the alliance chain.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AllianceClient: Send + Sync + 'static {
    /// Votes that the deposit `txid` on chain `chain_id` is real, signed by
    /// this relay's `voter_address`.
    async fn vote(
        &self,
        chain_id: u64,
        voter_address: &str,
        txid: Txid,
    ) -> Result<VoteReceipt, VoteError>;
}

/// Errors from vote submission, split by how the vote loop reacts to them.
#[derive(Debug, Error)]
pub enum VoteError {
    /// The submission never reached the chain; the proof is requeued and the
    /// loop cools down before consuming more.
    #[error("transport error: {0}")]
    Transport(String),

    /// The chain took the submission and refused it; the proof is dropped.
    #[error("rejected by alliance chain: {0}")]
    Rejected(String),

    /// Any other submission failure; treated as non-retryable.
    #[error("{0}")]
    Other(String),
}
