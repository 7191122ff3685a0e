//! Helpers shared by the crate's unit tests.

use std::time::Duration;

use bitcoin::{
    absolute::LockTime,
    block::{self, Header},
    consensus::serialize,
    hashes::Hash,
    merkle_tree::PartialMerkleTree,
    opcodes::all::{OP_CHECKMULTISIG, OP_PUSHNUM_2, OP_PUSHNUM_3},
    script::{Builder, PushBytesBuf},
    transaction::Version,
    Amount, BlockHash, CompactTarget, MerkleBlock, Network, OutPoint, ScriptBuf, Sequence,
    Transaction, TxIn, TxMerkleNode, TxOut, Txid, Witness,
};
use relayer_db::types::DepositProof;
use tokio::time::sleep;

use crate::{params::VoterParams, payload::CrossChainRequest};

pub(crate) const CLAIMED_HEIGHT: u32 = 100;
pub(crate) const BLOCKS_TO_WAIT: u32 = 6;
pub(crate) const DEPOSIT_SATS: u64 = 40_000;
pub(crate) const VOTER_ADDRESS: &str = "AdzZ2ckh2AGnDzJiqU4WzXmjuHIVMCCA2p";

/// A 2-of-3 bare multisig script standing in for the bridge's redeem script.
pub(crate) fn test_redeem_script() -> ScriptBuf {
    Builder::new()
        .push_opcode(OP_PUSHNUM_2)
        .push_slice([0x02; 33])
        .push_slice([0x03; 33])
        .push_slice([0x02; 33])
        .push_opcode(OP_PUSHNUM_3)
        .push_opcode(OP_CHECKMULTISIG)
        .into_script()
}

pub(crate) fn test_params() -> VoterParams {
    VoterParams {
        watch_script: test_redeem_script(),
        network: Network::Regtest,
        voter_address: VOTER_ADDRESS.to_owned(),
        blocks_to_wait: BLOCKS_TO_WAIT,
        vote_cooldown: Duration::from_millis(10),
        queue_capacity: 16,
    }
}

pub(crate) fn request_script(amount: u64) -> ScriptBuf {
    let request = CrossChainRequest {
        dest_chain_id: 3,
        dest_address: vec![7u8; 20],
        amount,
    };
    let push = PushBytesBuf::try_from(borsh::to_vec(&request).unwrap()).unwrap();
    ScriptBuf::new_op_return(push)
}

pub(crate) fn deposit_tx(
    value: Amount,
    deposit_script: ScriptBuf,
    data_script: ScriptBuf,
) -> Transaction {
    Transaction {
        version: Version::TWO,
        lock_time: LockTime::ZERO,
        input: vec![TxIn {
            previous_output: OutPoint::null(),
            script_sig: ScriptBuf::new(),
            sequence: Sequence::MAX,
            witness: Witness::new(),
        }],
        output: vec![
            TxOut {
                value,
                script_pubkey: deposit_script,
            },
            TxOut {
                value: Amount::ZERO,
                script_pubkey: data_script,
            },
        ],
    }
}

/// A deposit transaction that passes every output and payload gate.
pub(crate) fn standard_deposit_tx() -> Transaction {
    deposit_tx(
        Amount::from_sat(DEPOSIT_SATS),
        test_redeem_script(),
        request_script(DEPOSIT_SATS),
    )
}

pub(crate) fn header_with_root(merkle_root: TxMerkleNode) -> Header {
    Header {
        version: block::Version::TWO,
        prev_blockhash: BlockHash::all_zeros(),
        merkle_root,
        time: 0,
        bits: CompactTarget::from_consensus(0x1d00ffff),
        nonce: 0,
    }
}

/// Builds a merkle-block proof containing `tx` plus one unrelated leaf,
/// and the header the proof's tree actually commits to.
pub(crate) fn proof_for(tx: &Transaction) -> (DepositProof, Header) {
    let txid = tx.compute_txid();
    let other = Txid::from_byte_array([0xab; 32]);
    let tree = PartialMerkleTree::from_txids(&[txid, other], &[true, false]);

    let mut matches = Vec::new();
    let mut indexes = Vec::new();
    let root = tree.extract_matches(&mut matches, &mut indexes).unwrap();
    let header = header_with_root(root);

    let merkle_block = MerkleBlock { header, txn: tree };
    let proof = DepositProof::from_tx(tx, serialize(&merkle_block), CLAIMED_HEIGHT, BLOCKS_TO_WAIT);
    (proof, header)
}

/// Polls `cond` until it holds, panicking after a bounded wait.
pub(crate) async fn wait_for(mut cond: impl FnMut() -> bool, what: &str) {
    for _ in 0..200 {
        if cond() {
            return;
        }
        sleep(Duration::from_millis(5)).await;
    }
    panic!("timed out waiting for {what}");
}
