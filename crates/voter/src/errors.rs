//! Error taxonomy of the verification pipeline.

use bitcoin::{consensus::encode, merkle_tree::MerkleBlockError, TxMerkleNode, Txid};
use relayer_db::DbError;
use thiserror::Error;

use crate::traits::HeaderStoreError;

/// Terminal reasons a claimed deposit proof is refused.
///
/// Every variant is final for the submitted proof: it is logged and dropped,
/// never parked or retried. Callers needing resilience against transient
/// store outages must resubmit externally.
#[derive(Debug, Error)]
pub enum RejectReason {
    #[error("failed to decode transaction: {0}")]
    TxDecode(encode::Error),

    /// The duplicate-vote guard fired; not a fault, the system working.
    #[error("{0} already voted")]
    AlreadyVoted(Txid),

    #[error("waiting store: {0}")]
    Store(#[from] DbError),

    #[error("failed to get current height from header store: {0}")]
    HeightUnavailable(HeaderStoreError),

    #[error("failed to decode proof: {0}")]
    ProofDecode(encode::Error),

    #[error("bad merkle tree: {0}")]
    BadMerkleTree(MerkleBlockError),

    #[error("no matched transactions in proof")]
    NoMatchedTransactions,

    #[error("transaction {0} not found in proof")]
    TxNotInProof(Txid),

    #[error("wrong outputs: {0}")]
    Output(#[from] OutputError),

    #[error("failed to resolve parameter: {0}")]
    Payload(#[from] PayloadError),

    #[error("failed to get header from header store: {0}")]
    HeaderLookup(HeaderStoreError),

    #[error("no trusted header at height {0}")]
    MissingHeader(u32),

    /// The proof is internally consistent but rooted outside the chain this
    /// relay trusts.
    #[error("merkle root not equal, should be {expected} not {computed}")]
    MerkleRootMismatch {
        /// Root of the trusted header at the claimed height.
        expected: TxMerkleNode,
        /// Root implied by the submitted partial tree.
        computed: TxMerkleNode,
    },
}

/// Failures of the deposit transaction's output structure.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OutputError {
    #[error("number of transaction outputs must be at least 2, got {0}")]
    TooFewOutputs(usize),

    #[error("value of crosschain transaction must be bigger than 0")]
    ZeroValue,

    #[error("wrong script: \"{got}\" is not same as our \"{want}\"")]
    RedeemMismatch { got: String, want: String },

    #[error("wrong script: \"{got}\" is not same as our \"{want}\"")]
    ScriptHashMismatch { got: String, want: String },

    #[error("failed to derive script-hash output: {0}")]
    DeriveScriptHash(String),

    #[error("first output's script class is not supported")]
    UnsupportedScript,

    #[error("second output's script is not null-data")]
    NotNullData,
}

/// Failures of the cross-chain request payload carried in the null-data
/// output.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PayloadError {
    #[error("second output carries no data push")]
    MissingPayload,

    #[error("malformed cross-chain request: {0}")]
    Malformed(String),

    #[error("declared amount {declared} does not match deposited value {deposited}")]
    AmountMismatch { declared: u64, deposited: u64 },
}
