//! Static parameters of the voting pipeline.

use std::time::Duration;

use bitcoin::{Network, ScriptBuf};
use relayer_config::RelayerConfig;
use thiserror::Error;

/// Parameters the pipeline is instantiated with, derived from
/// [`RelayerConfig`] at startup.
#[derive(Debug, Clone)]
pub struct VoterParams {
    /// Redeem script whose deposits this relay watches, used directly for
    /// bare-multisig outputs and hashed for script-hash outputs.
    pub watch_script: ScriptBuf,

    /// Network the watched chain runs on.
    pub network: Network,

    /// Address this relay casts votes from on the alliance chain.
    pub voter_address: String,

    /// Confirmation depth this relay requires before releasing parked
    /// proofs. Distinct from the per-proof requirement used by the depth
    /// gate in `verify`.
    pub blocks_to_wait: u32,

    /// Pause applied to the vote loop after a failed submission.
    pub vote_cooldown: Duration,

    /// Capacity of the voting queue.
    pub queue_capacity: usize,
}

impl VoterParams {
    pub fn from_config(config: &RelayerConfig) -> Result<Self, ParamsError> {
        let watch_script = ScriptBuf::from_bytes(hex::decode(&config.voter.redeem_script)?);
        Ok(Self {
            watch_script,
            network: config.network,
            voter_address: config.voter.voter_address.clone(),
            blocks_to_wait: config.voter.blocks_to_wait,
            vote_cooldown: Duration::from_millis(config.voter.vote_cooldown_ms),
            queue_capacity: config.voter.queue_capacity,
        })
    }
}

/// Errors building [`VoterParams`] from configuration.
#[derive(Debug, Error)]
pub enum ParamsError {
    #[error("redeem_script is not valid hex: {0}")]
    BadRedeemScript(#[from] hex::FromHexError),
}
