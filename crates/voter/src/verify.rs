//! Re-verification of claimed deposit proofs against the trusted chain.

use bitcoin::{consensus::deserialize, Address, Amount, MerkleBlock, Transaction, Txid};
use relayer_db::{traits::WaitingDatabase, types::DepositProof};

use crate::{
    errors::{OutputError, RejectReason},
    params::VoterParams,
    payload::resolve_request,
    traits::HeaderStore,
};

/// Outcome of checking one claimed deposit proof.
#[derive(Debug)]
pub enum VerificationOutcome {
    /// Every gate passed; the deposit should be voted for.
    Confirmed(Transaction),

    /// The claimed block is not buried deeply enough yet. Retryable; the
    /// proof belongs in the waiting store.
    NeedsMoreConfirmations {
        tx: Transaction,
        /// Best height the header store reported.
        best_height: u32,
        /// Height the proof claims inclusion at.
        claimed_height: u32,
    },

    /// A hard gate failed; the proof is dropped for good.
    Rejected {
        /// The decoded transaction, when decoding got that far.
        tx: Option<Transaction>,
        reason: RejectReason,
    },
}

enum GateFailure {
    NotConfirmed { best_height: u32 },
    Reject(RejectReason),
}

/// Checks a claimed proof against the waiting store, the trusted header
/// chain and the bridge's expected output shape.
///
/// Read-only and deterministic for a given header-store state. The gates
/// run in a fixed order and every failure is final except an insufficient
/// confirmation depth.
pub fn verify_deposit_proof<H, D>(
    proof: &DepositProof,
    headers: &H,
    db: &D,
    params: &VoterParams,
) -> VerificationOutcome
where
    H: HeaderStore,
    D: WaitingDatabase,
{
    let tx = match proof.try_to_tx() {
        Ok(tx) => tx,
        Err(e) => {
            return VerificationOutcome::Rejected {
                tx: None,
                reason: RejectReason::TxDecode(e),
            }
        }
    };
    let txid = tx.compute_txid();

    match check_claim(&tx, txid, proof, headers, db, params) {
        Ok(()) => VerificationOutcome::Confirmed(tx),
        Err(GateFailure::NotConfirmed { best_height }) => {
            VerificationOutcome::NeedsMoreConfirmations {
                tx,
                best_height,
                claimed_height: proof.height(),
            }
        }
        Err(GateFailure::Reject(reason)) => VerificationOutcome::Rejected {
            tx: Some(tx),
            reason,
        },
    }
}

fn check_claim<H, D>(
    tx: &Transaction,
    txid: Txid,
    proof: &DepositProof,
    headers: &H,
    db: &D,
    params: &VoterParams,
) -> Result<(), GateFailure>
where
    H: HeaderStore,
    D: WaitingDatabase,
{
    use GateFailure::Reject;

    // The primary duplicate-vote guard; nothing else runs for a marked txid.
    if db
        .is_voted(&txid)
        .map_err(|e| Reject(RejectReason::Store(e)))?
    {
        return Err(Reject(RejectReason::AlreadyVoted(txid)));
    }

    let best_height = headers
        .best_height()
        .map_err(|e| Reject(RejectReason::HeightUnavailable(e)))?;

    // Depth gate, in unsigned arithmetic: a zero requirement can never be
    // satisfied.
    let have = best_height.checked_sub(proof.height());
    let need = proof.blocks_to_wait().checked_sub(1);
    match (have, need) {
        (Some(have), Some(need)) if have >= need => {}
        _ => return Err(GateFailure::NotConfirmed { best_height }),
    }

    let merkle_block: MerkleBlock =
        deserialize(proof.proof_raw()).map_err(|e| Reject(RejectReason::ProofDecode(e)))?;
    let mut matches = Vec::new();
    let mut indexes = Vec::new();
    let computed_root = merkle_block
        .txn
        .extract_matches(&mut matches, &mut indexes)
        .map_err(|e| Reject(RejectReason::BadMerkleTree(e)))?;
    if matches.is_empty() {
        return Err(Reject(RejectReason::NoMatchedTransactions));
    }
    if !matches.contains(&txid) {
        return Err(Reject(RejectReason::TxNotInProof(txid)));
    }

    check_tx_outs(tx, params).map_err(|e| Reject(e.into()))?;

    resolve_request(&tx.output[1], tx.output[0].value).map_err(|e| Reject(e.into()))?;

    let header = headers
        .header_at(proof.height())
        .map_err(|e| Reject(RejectReason::HeaderLookup(e)))?
        .ok_or(Reject(RejectReason::MissingHeader(proof.height())))?;

    // The trust anchor: the proof's root must be the one this relay's own
    // header chain committed to at the claimed height.
    if header.merkle_root != computed_root {
        return Err(Reject(RejectReason::MerkleRootMismatch {
            expected: header.merkle_root,
            computed: computed_root,
        }));
    }

    Ok(())
}

/// Validates the deposit transaction's output structure.
///
/// Output 0 carries the bridged value and must pay to the watched redeem
/// script, either bare or wrapped in a script hash. Output 1 must be the
/// null-data output carrying the cross-chain request.
fn check_tx_outs(tx: &Transaction, params: &VoterParams) -> Result<(), OutputError> {
    if tx.output.len() < 2 {
        return Err(OutputError::TooFewOutputs(tx.output.len()));
    }

    let deposit = &tx.output[0];
    if deposit.value == Amount::ZERO {
        return Err(OutputError::ZeroValue);
    }

    let script = deposit.script_pubkey.as_script();
    if script.is_multisig() {
        if script.as_bytes() != params.watch_script.as_bytes() {
            return Err(OutputError::RedeemMismatch {
                got: hex::encode(script.as_bytes()),
                want: hex::encode(params.watch_script.as_bytes()),
            });
        }
    } else if script.is_p2sh() {
        let address = Address::p2sh(&params.watch_script, params.network)
            .map_err(|e| OutputError::DeriveScriptHash(e.to_string()))?;
        let expected = address.script_pubkey();
        if script.as_bytes() != expected.as_bytes() {
            return Err(OutputError::ScriptHashMismatch {
                got: hex::encode(script.as_bytes()),
                want: hex::encode(expected.as_bytes()),
            });
        }
    } else {
        return Err(OutputError::UnsupportedScript);
    }

    if !tx.output[1].script_pubkey.is_op_return() {
        return Err(OutputError::NotNullData);
    }

    Ok(())
}
