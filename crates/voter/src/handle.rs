//! Lifecycle owner and submission handle for the voting pipeline.

use std::{fmt, sync::Arc};

use relayer_db::{traits::WaitingDatabase, types::DepositProof};
use thiserror::Error;
use tokio::sync::{mpsc, watch, Mutex};

use crate::{
    params::VoterParams,
    status::VoterStatus,
    task::{retry_task, vote_task, VoterCtx},
    traits::{AllianceClient, HeaderStore},
};

/// Handle for feeding proofs into the voting pipeline and watching its
/// status. Cheap to clone; outlives restarts.
#[derive(Debug, Clone)]
pub struct VoterHandle {
    proof_tx: mpsc::Sender<DepositProof>,
    status_rx: watch::Receiver<VoterStatus>,
}

impl VoterHandle {
    /// Queues a claimed proof for verification and voting. Waits for queue
    /// capacity; errors only once the pipeline is gone for good.
    pub async fn submit_proof(&self, proof: DepositProof) -> Result<(), SubmitError> {
        self.proof_tx
            .send(proof)
            .await
            .map_err(|_| SubmitError::Closed)
    }

    /// Watch channel carrying the pipeline's counters.
    pub fn status_watcher(&self) -> watch::Receiver<VoterStatus> {
        self.status_rx.clone()
    }

    /// Current snapshot of the pipeline's counters.
    pub fn status(&self) -> VoterStatus {
        *self.status_rx.borrow()
    }
}

/// Error submitting a proof to the pipeline.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("voting pipeline is not running")]
    Closed,
}

/// Owns the voting pipeline: the collaborator handles, both ends of the
/// voting queue and the shutdown signal for the two loops.
pub struct Voter<A, H, D> {
    alliance: Arc<A>,
    headers: Arc<H>,
    waiting_db: Arc<D>,
    params: Arc<VoterParams>,
    proof_tx: mpsc::Sender<DepositProof>,

    /// Receiver side of the voting queue. Behind an async mutex so a
    /// restarted vote loop can reclaim it once the previous loop exits.
    proof_rx: Arc<Mutex<mpsc::Receiver<DepositProof>>>,

    tip_rx: watch::Receiver<u32>,
    status_tx: Arc<watch::Sender<VoterStatus>>,
    shutdown_tx: watch::Sender<bool>,
}

impl<A, H, D> Voter<A, H, D>
where
    A: AllianceClient,
    H: HeaderStore,
    D: WaitingDatabase,
{
    /// Creates a stopped voter and its submission handle. `tip_rx` is the
    /// header-sync collaborator's stream of newly adopted tip heights.
    pub fn new(
        alliance: Arc<A>,
        headers: Arc<H>,
        waiting_db: Arc<D>,
        params: VoterParams,
        tip_rx: watch::Receiver<u32>,
    ) -> (Self, VoterHandle) {
        let (proof_tx, proof_rx) = mpsc::channel(params.queue_capacity.max(1));
        let (status_tx, status_rx) = watch::channel(VoterStatus::default());
        let (shutdown_tx, _) = watch::channel(false);

        let handle = VoterHandle {
            proof_tx: proof_tx.clone(),
            status_rx,
        };
        let voter = Self {
            alliance,
            headers,
            waiting_db,
            params: Arc::new(params),
            proof_tx,
            proof_rx: Arc::new(Mutex::new(proof_rx)),
            tip_rx,
            status_tx: Arc::new(status_tx),
            shutdown_tx,
        };
        (voter, handle)
    }

    /// Launches the vote and retry loops. Must be called inside a tokio
    /// runtime, and only on a stopped voter.
    pub fn start(&self) {
        let ctx = Arc::new(VoterCtx {
            alliance: self.alliance.clone(),
            headers: self.headers.clone(),
            waiting_db: self.waiting_db.clone(),
            params: self.params.clone(),
            proof_tx: self.proof_tx.clone(),
            status_tx: self.status_tx.clone(),
        });

        tokio::spawn(vote_task(
            ctx.clone(),
            self.proof_rx.clone(),
            self.shutdown_tx.subscribe(),
        ));
        tokio::spawn(retry_task(
            ctx,
            self.tip_rx.clone(),
            self.shutdown_tx.subscribe(),
        ));
    }

    /// Signals both loops to stop at their next wait point. Detached
    /// waiting-store writes already in flight are left to finish.
    pub fn stop(&self) {
        let _ = self.shutdown_tx.send(true);
    }

    /// Rebinds the header-store handle and tip stream after the underlying
    /// chain connection is replaced, then relaunches both loops with a
    /// fresh shutdown signal. The running instance must be stopped first;
    /// there is no guard against a double start.
    pub fn restart(&mut self, headers: Arc<H>, tip_rx: watch::Receiver<u32>) {
        let (shutdown_tx, _) = watch::channel(false);
        self.shutdown_tx = shutdown_tx;
        self.headers = headers;
        self.tip_rx = tip_rx;
        self.start();
    }
}

impl<A, H, D> fmt::Debug for Voter<A, H, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Voter")
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use relayer_db::stubs::StubWaitingDb;
    use tokio::time::sleep;

    use super::*;
    use crate::{
        test_utils::{test_params, wait_for},
        traits::{MockAllianceClient, MockHeaderStore},
    };

    /// A proof that fails transaction decoding; it is rejected without any
    /// collaborator being consulted.
    fn garbage_proof() -> DepositProof {
        DepositProof::new(vec![0x00], vec![], 1, 1)
    }

    #[tokio::test]
    async fn stop_and_restart_rebinds_and_resumes() {
        let (tip_tx, tip_rx) = watch::channel(0u32);
        let (mut voter, handle) = Voter::new(
            Arc::new(MockAllianceClient::new()),
            Arc::new(MockHeaderStore::new()),
            Arc::new(StubWaitingDb::new()),
            test_params(),
            tip_rx,
        );
        voter.start();

        let status_rx = handle.status_watcher();
        handle.submit_proof(garbage_proof()).await.unwrap();
        wait_for(|| status_rx.borrow().rejected == 1, "first proof processed").await;

        voter.stop();
        sleep(Duration::from_millis(50)).await;

        // A proof submitted while stopped stays queued.
        handle.submit_proof(garbage_proof()).await.unwrap();
        sleep(Duration::from_millis(50)).await;
        assert_eq!(status_rx.borrow().rejected, 1);

        // Relaunch against a rebound header store and a fresh tip stream;
        // the queued proof is consumed by the new loop.
        let (tip_tx2, tip_rx2) = watch::channel(0u32);
        voter.restart(Arc::new(MockHeaderStore::new()), tip_rx2);
        wait_for(
            || status_rx.borrow().rejected == 2,
            "queued proof processed after restart",
        )
        .await;

        voter.stop();
        drop((tip_tx, tip_tx2));
    }

    #[tokio::test]
    async fn handle_reports_closed_pipeline() {
        let (_tip_tx, tip_rx) = watch::channel(0u32);
        let (voter, handle) = Voter::new(
            Arc::new(MockAllianceClient::new()),
            Arc::new(MockHeaderStore::new()),
            Arc::new(StubWaitingDb::new()),
            test_params(),
            tip_rx,
        );

        // Dropping the voter drops the queue's receiver for good.
        drop(voter);
        assert!(matches!(
            handle.submit_proof(garbage_proof()).await,
            Err(SubmitError::Closed)
        ));
    }
}
