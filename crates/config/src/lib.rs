//! Configuration types for the deposit-voting relay.

mod config;

pub use config::{RelayerConfig, VoterConfig};
