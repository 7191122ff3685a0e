//! Deposit verification and voting core of the cross-chain relay.
//!
//! A claimed bitcoin deposit arrives as a [`DepositProof`]: the raw
//! transaction, a merkle-block proof of its inclusion, the claimed block
//! height and a confirmation requirement. The vote loop re-verifies every
//! claim against the locally trusted header chain and, only when every gate
//! passes, casts a vote on the alliance chain that the deposit is real.
//! Under-confirmed proofs are parked in the waiting store; the retry loop
//! releases them back onto the queue as new tip heights arrive.
//!
//! [`DepositProof`]: relayer_db::types::DepositProof

pub mod errors;
pub mod handle;
pub mod params;
pub mod payload;
pub mod status;
pub(crate) mod task;
#[cfg(test)]
pub(crate) mod test_utils;
pub mod traits;
pub mod verify;

pub use errors::{OutputError, PayloadError, RejectReason};
pub use handle::{SubmitError, Voter, VoterHandle};
pub use params::{ParamsError, VoterParams};
pub use status::VoterStatus;
pub use traits::{AllianceClient, HeaderStore, HeaderStoreError, VoteError, VoteReceipt};
pub use verify::{verify_deposit_proof, VerificationOutcome};

/// Chain id the alliance chain files bitcoin deposit votes under.
pub const BTC_CHAIN_ID: u64 = 1;
