use bitcoin::Network;
use serde::{Deserialize, Serialize};

/// Default confirmation depth required before releasing a waiting proof.
const DEFAULT_BLOCKS_TO_WAIT: u32 = 6;

/// Default cooldown after a failed vote submission, in ms.
const DEFAULT_VOTE_COOLDOWN_MS: u64 = 10_000;

/// Default capacity of the voting queue.
const DEFAULT_QUEUE_CAPACITY: usize = 256;

/// Voting pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoterConfig {
    /// Hex-encoded redeem script whose deposits this relay watches.
    pub redeem_script: String,

    /// Address this relay casts votes from on the alliance chain.
    pub voter_address: String,

    /// How many blocks a deposit must be buried under before this relay
    /// re-feeds it from the waiting store.
    #[serde(default = "default_blocks_to_wait")]
    pub blocks_to_wait: u32,

    /// How long to pause the vote loop after a failed submission, in ms.
    #[serde(default = "default_vote_cooldown")]
    pub vote_cooldown_ms: u64,

    /// Capacity of the voting queue.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

fn default_blocks_to_wait() -> u32 {
    DEFAULT_BLOCKS_TO_WAIT
}

fn default_vote_cooldown() -> u64 {
    DEFAULT_VOTE_COOLDOWN_MS
}

fn default_queue_capacity() -> usize {
    DEFAULT_QUEUE_CAPACITY
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayerConfig {
    /// Network the watched bitcoin chain runs on.
    pub network: Network,

    pub voter: VoterConfig,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_config_load() {
        let config_string = r#"
            network = "regtest"

            [voter]
            redeem_script = "522102ab52ae"
            voter_address = "AdzZ2ckh2AGnDzJiqU4WzXmjuHIVMCCA2p"
            blocks_to_wait = 10
            vote_cooldown_ms = 5000
            queue_capacity = 64
        "#;

        let config = toml::from_str::<RelayerConfig>(config_string);
        assert!(
            config.is_ok(),
            "should be able to load TOML config but got: {:?}",
            config.err()
        );
        let config = config.unwrap();
        assert_eq!(config.network, Network::Regtest);
        assert_eq!(config.voter.blocks_to_wait, 10);
        assert_eq!(config.voter.vote_cooldown_ms, 5000);
        assert_eq!(config.voter.queue_capacity, 64);
    }

    #[test]
    fn test_config_defaults() {
        let config_string = r#"
            network = "testnet"

            [voter]
            redeem_script = "522102ab52ae"
            voter_address = "AdzZ2ckh2AGnDzJiqU4WzXmjuHIVMCCA2p"
        "#;

        let config = toml::from_str::<RelayerConfig>(config_string).unwrap();
        assert_eq!(config.voter.blocks_to_wait, DEFAULT_BLOCKS_TO_WAIT);
        assert_eq!(config.voter.vote_cooldown_ms, DEFAULT_VOTE_COOLDOWN_MS);
        assert_eq!(config.voter.queue_capacity, DEFAULT_QUEUE_CAPACITY);
    }
}
