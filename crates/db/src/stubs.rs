//! In-process waiting-store implementation.

use std::collections::{HashMap, HashSet};

use bitcoin::Txid;
use parking_lot::Mutex;

use crate::{traits::WaitingDatabase, types::DepositProof, DbResult};

/// Waiting store over mutex-guarded maps.
///
/// Single-process only. The voted set does not survive a restart, so the
/// duplicate-vote guard only holds across restarts once a durable backend
/// implements [`WaitingDatabase`].
#[derive(Debug, Default)]
pub struct StubWaitingDb {
    state: Mutex<StubState>,
}

#[derive(Debug, Default)]
struct StubState {
    waiting: HashMap<Txid, DepositProof>,
    voted: HashSet<Txid>,
}

impl StubWaitingDb {
    pub fn new() -> Self {
        Self::default()
    }
}

impl WaitingDatabase for StubWaitingDb {
    fn put_waiting(&self, txid: Txid, proof: DepositProof) -> DbResult<()> {
        self.state.lock().waiting.insert(txid, proof);
        Ok(())
    }

    fn is_waiting(&self, txid: &Txid) -> DbResult<bool> {
        Ok(self.state.lock().waiting.contains_key(txid))
    }

    fn is_voted(&self, txid: &Txid) -> DbResult<bool> {
        Ok(self.state.lock().voted.contains(txid))
    }

    fn mark_voted(&self, txid: &Txid) -> DbResult<()> {
        self.state.lock().voted.insert(*txid);
        Ok(())
    }

    fn del_waiting(&self, txid: &Txid) -> DbResult<bool> {
        Ok(self.state.lock().waiting.remove(txid).is_some())
    }

    fn take_waiting_under_height(&self, max_height: u32) -> DbResult<Vec<(Txid, DepositProof)>> {
        let mut state = self.state.lock();
        let picked: Vec<Txid> = state
            .waiting
            .iter()
            .filter(|(_, proof)| proof.height() <= max_height)
            .map(|(txid, _)| *txid)
            .collect();

        let mut released = Vec::with_capacity(picked.len());
        for txid in picked {
            if let Some(proof) = state.waiting.remove(&txid) {
                released.push((txid, proof));
            }
        }
        Ok(released)
    }
}
