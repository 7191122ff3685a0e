//! Voting pipeline status reporting.

/// Counters describing what the voting pipeline has done so far.
///
/// Published on a watch channel by the vote loop; see
/// [`VoterHandle::status_watcher`](crate::handle::VoterHandle::status_watcher).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VoterStatus {
    /// Proofs pulled off the voting queue, including retries.
    pub proofs_received: u64,

    /// Votes the alliance chain accepted.
    pub votes_submitted: u64,

    /// Proofs terminally rejected.
    pub rejected: u64,

    /// Proofs parked in the waiting store for more confirmations.
    pub parked: u64,
}
