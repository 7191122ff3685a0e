//! The two long-lived tasks of the voting pipeline.

use std::sync::Arc;

use bitcoin::Txid;
use relayer_db::{traits::WaitingDatabase, types::DepositProof};
use tokio::sync::{mpsc, watch, Mutex};
use tracing::{debug, error, info, warn};

use crate::{
    params::VoterParams,
    status::VoterStatus,
    traits::{AllianceClient, HeaderStore, VoteError},
    verify::{verify_deposit_proof, VerificationOutcome},
    BTC_CHAIN_ID,
};

/// Shared context of the vote and retry tasks.
pub(crate) struct VoterCtx<A, H, D> {
    pub(crate) alliance: Arc<A>,
    pub(crate) headers: Arc<H>,
    pub(crate) waiting_db: Arc<D>,
    pub(crate) params: Arc<VoterParams>,

    /// Producer side of the voting queue, for requeues and retry feeds.
    pub(crate) proof_tx: mpsc::Sender<DepositProof>,

    pub(crate) status_tx: Arc<watch::Sender<VoterStatus>>,
}

/// Consumes the voting queue, verifies each proof and acts on the outcome.
///
/// Runs until the shutdown signal fires or the queue closes, whichever the
/// loop observes first at its next wait point.
pub(crate) async fn vote_task<A, H, D>(
    ctx: Arc<VoterCtx<A, H, D>>,
    queue: Arc<Mutex<mpsc::Receiver<DepositProof>>>,
    mut shutdown_rx: watch::Receiver<bool>,
) where
    A: AllianceClient,
    H: HeaderStore,
    D: WaitingDatabase,
{
    info!("start voting");
    let mut proof_rx = queue.lock().await;

    loop {
        tokio::select! {
            res = shutdown_rx.changed() => {
                if res.is_err() || *shutdown_rx.borrow() {
                    info!("stopping voting");
                    return;
                }
            }
            maybe_proof = proof_rx.recv() => {
                let Some(proof) = maybe_proof else {
                    warn!("voting queue closed; exiting");
                    return;
                };
                process_proof(&ctx, proof).await;
            }
        }
    }
}

async fn process_proof<A, H, D>(ctx: &Arc<VoterCtx<A, H, D>>, proof: DepositProof)
where
    A: AllianceClient,
    H: HeaderStore,
    D: WaitingDatabase,
{
    ctx.status_tx.send_modify(|s| s.proofs_received += 1);

    let outcome = verify_deposit_proof(
        &proof,
        ctx.headers.as_ref(),
        ctx.waiting_db.as_ref(),
        &ctx.params,
    );

    match outcome {
        VerificationOutcome::NeedsMoreConfirmations {
            tx,
            best_height,
            claimed_height,
        } => {
            let txid = tx.compute_txid();
            debug!(
                %txid,
                %best_height,
                %claimed_height,
                "transaction is not confirmed yet"
            );
            ctx.status_tx.send_modify(|s| s.parked += 1);

            // Fire-and-forget; the loop keeps consuming while this lands.
            let db = ctx.waiting_db.clone();
            tokio::spawn(async move {
                park_proof(db.as_ref(), txid, proof);
            });
        }
        VerificationOutcome::Rejected { tx, reason } => {
            ctx.status_tx.send_modify(|s| s.rejected += 1);
            match tx {
                Some(tx) => {
                    error!(txid = %tx.compute_txid(), err = %reason, "failed to verify proof")
                }
                None => error!(err = %reason, "failed to verify proof"),
            }
        }
        VerificationOutcome::Confirmed(tx) => {
            let txid = tx.compute_txid();
            info!(%txid, "transaction passed the verify, next vote for it");
            submit_vote(ctx, txid, proof).await;
        }
    }
}

/// Parks an under-confirmed proof in the waiting store, skipping the write
/// if a concurrent delivery already parked it.
fn park_proof<D: WaitingDatabase>(db: &D, txid: Txid, proof: DepositProof) {
    match db.is_waiting(&txid) {
        Ok(true) => {
            info!(%txid, "already in waiting");
            return;
        }
        Ok(false) => {}
        Err(e) => {
            error!(%txid, err = %e, "failed to check waiting store");
            return;
        }
    }
    match db.put_waiting(txid, proof) {
        Ok(()) => info!(%txid, "wrote into waiting store"),
        Err(e) => error!(%txid, err = %e, "failed to write into waiting store"),
    }
}

async fn submit_vote<A, H, D>(ctx: &Arc<VoterCtx<A, H, D>>, txid: Txid, proof: DepositProof)
where
    A: AllianceClient,
    H: HeaderStore,
    D: WaitingDatabase,
{
    match ctx
        .alliance
        .vote(BTC_CHAIN_ID, &ctx.params.voter_address, txid)
        .await
    {
        Ok(receipt) => {
            ctx.status_tx.send_modify(|s| s.votes_submitted += 1);

            // Bookkeeping is best-effort: a failed mark or delete must not
            // keep this relay from voting on further deposits.
            if let Err(e) = ctx.waiting_db.mark_voted(&txid) {
                error!(%txid, err = %e, "failed to mark tx as voted");
            }
            info!(%txid, alliance_tx = %receipt.tx_hash, "vote yes and marked");
            match ctx.waiting_db.del_waiting(&txid) {
                Ok(true) => info!(%txid, "deleted tx from waiting store"),
                Ok(false) => {}
                Err(e) => error!(%txid, err = %e, "failed to clean up waiting store"),
            }
        }
        Err(VoteError::Transport(e)) => {
            error!(%txid, err = %e, "failed to vote and post, requeueing");
            let proof_tx = ctx.proof_tx.clone();
            tokio::spawn(async move {
                if proof_tx.send(proof).await.is_err() {
                    warn!(%txid, "voting queue closed before requeue");
                }
            });
            // Global throttle so a failing endpoint is not hammered.
            tokio::time::sleep(ctx.params.vote_cooldown).await;
        }
        Err(e) => {
            ctx.status_tx.send_modify(|s| s.rejected += 1);
            error!(%txid, err = %e, "vote submission failed");
        }
    }
}

/// Releases parked proofs back onto the voting queue as the chain grows.
pub(crate) async fn retry_task<A, H, D>(
    ctx: Arc<VoterCtx<A, H, D>>,
    mut tip_rx: watch::Receiver<u32>,
    mut shutdown_rx: watch::Receiver<bool>,
) where
    A: AllianceClient,
    H: HeaderStore,
    D: WaitingDatabase,
{
    info!("start retrying");

    loop {
        tokio::select! {
            res = shutdown_rx.changed() => {
                if res.is_err() || *shutdown_rx.borrow() {
                    info!("stopping retrying");
                    return;
                }
            }
            res = tip_rx.changed() => {
                if res.is_err() {
                    warn!("header update stream closed; exiting");
                    return;
                }
                let new_height = *tip_rx.borrow_and_update();
                release_eligible(&ctx, new_height).await;
            }
        }
    }
}

async fn release_eligible<A, H, D>(ctx: &Arc<VoterCtx<A, H, D>>, new_height: u32)
where
    A: AllianceClient,
    H: HeaderStore,
    D: WaitingDatabase,
{
    debug!(%new_height, "retry loop once");

    // Everything claimed at or below this height now has the configured
    // number of confirmations on top of it.
    let depth = ctx.params.blocks_to_wait.max(1);
    let threshold = new_height.saturating_sub(depth - 1);

    match ctx.waiting_db.take_waiting_under_height(threshold) {
        Err(e) => {
            error!(%new_height, err = %e, "failed to get proofs under height from waiting store")
        }
        Ok(released) => {
            for (txid, proof) in released {
                info!(%txid, "send txid to vote");
                if ctx.proof_tx.send(proof).await.is_err() {
                    warn!(%txid, "voting queue closed; dropping released proof");
                    return;
                }
            }
        }
    }
}
