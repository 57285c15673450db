// Single-threaded request serializer that owns both the Lock Table and
// Transaction Table, plus the background Deadlock Thread.
//
// One dedicated thread handling a request queue means the tables never need
// fine-grained locking of their own. Here a single `Mutex` around the
// combined state stands in for that thread boundary, and a real
// `std::thread::spawn` loop plays the role of the Deadlock Thread, signaling
// across the boundary rather than reaching into the tables directly.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use parking_lot::{Condvar, Mutex};

use crate::common::TransactionId;
use crate::transaction::deadlock::{DeadlockDetector, DeadlockDetectorConfig};
use crate::transaction::error::TransactionError;
use crate::transaction::lock::AccessMode;
use crate::transaction::lock_table::{GrantOutcome, LockTable};
use crate::transaction::resource_id::ResourceId;
use crate::transaction::transaction_table::TransactionTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Acquire,
    Release,
    /// Drops the submitting transaction's own pending requests, leaving any
    /// locks it already holds untouched.
    Cancel,
}

#[derive(Debug, Clone, Copy)]
pub struct LockRequestMsg {
    pub txn: TransactionId,
    pub resource: ResourceId,
    pub mode: AccessMode,
    pub kind: RequestKind,
}

/// Delivered to a transaction's reply queue. Acquire requests that queue
/// receive no reply until promoted or the transaction is aborted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockReply {
    Granted(ResourceId, AccessMode),
    Released(ResourceId, AccessMode),
    Aborted,
}

#[derive(Debug, Clone)]
pub struct LockManagerConfig {
    pub deadlock: DeadlockDetectorConfig,
}

impl Default for LockManagerConfig {
    fn default() -> Self {
        Self {
            deadlock: DeadlockDetectorConfig::default(),
        }
    }
}

struct State {
    lock_table: LockTable,
    transaction_table: TransactionTable,
    reply_queues: HashMap<TransactionId, VecDeque<LockReply>>,
}

impl State {
    fn reply_to(&mut self, txn: TransactionId, reply: LockReply) {
        self.reply_queues.entry(txn).or_default().push_back(reply);
    }
}

pub struct LockManager {
    state: Mutex<State>,
    detector: DeadlockDetector,
    shutdown: AtomicBool,
    wake: Condvar,
}

impl LockManager {
    pub fn new(config: LockManagerConfig) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(State {
                lock_table: LockTable::new(),
                transaction_table: TransactionTable::new(),
                reply_queues: HashMap::new(),
            }),
            detector: DeadlockDetector::new(config.deadlock),
            shutdown: AtomicBool::new(false),
            wake: Condvar::new(),
        })
    }

    /// Spawns the background Deadlock Thread. Call once per manager
    /// instance; `shutdown` wakes and joins it.
    pub fn spawn_deadlock_thread(self: &Arc<Self>) -> JoinHandle<()> {
        let manager = Arc::clone(self);
        let interval = manager.detector.config().detection_interval;
        std::thread::spawn(move || {
            let mut guard = manager.state.lock();
            loop {
                manager.wake.wait_for(&mut guard, interval);
                if manager.shutdown.load(Ordering::Acquire) {
                    return;
                }
                manager.run_detection_pass(&mut guard);
            }
        })
    }

    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Release);
        self.wake.notify_all();
    }

    /// Acquire semantics: on `try_grant`, if granted, record in the
    /// Transaction Table's `owned` and reply immediately; if queued, record
    /// in `pending` and suspend (no reply) until promotion or abort.
    pub fn acquire(&self, txn: TransactionId, resource: ResourceId, mode: AccessMode) {
        let mut state = self.state.lock();
        match state.lock_table.try_grant(txn, resource, mode) {
            GrantOutcome::Granted => {
                state.transaction_table.insert_owned(txn, resource, mode);
                state.reply_to(txn, LockReply::Granted(resource, mode));
            }
            GrantOutcome::Queued => {
                state.transaction_table.insert_pending(txn, resource, mode);
            }
        }
    }

    /// Releases a held lock; promotes the resulting resource and wakes
    /// every promoted waiter by recording it in `owned` and emitting a
    /// success reply. Releasing a lock the transaction doesn't hold is a
    /// caller bug: logged as `LockTableInconsistency`, state unchanged.
    pub fn release(
        &self,
        txn: TransactionId,
        resource: ResourceId,
        mode: AccessMode,
    ) -> Result<(), TransactionError> {
        let mut state = self.state.lock();
        let table_outcome = state.lock_table.release(txn, resource, mode);
        if !table_outcome.released {
            tracing::warn!(?txn, ?resource, ?mode, "release of non-held lock");
            return Err(TransactionError::LockTableInconsistency {
                txn,
                resource: resource.to_display_string(),
            });
        }
        let _ = state.transaction_table.remove_owned(txn, resource, mode);
        state.reply_to(txn, LockReply::Released(resource, mode));

        for (promoted_txn, promoted_mode) in table_outcome.promoted {
            state
                .transaction_table
                .remove_pending(promoted_txn, resource, promoted_mode)
                .ok();
            state
                .transaction_table
                .insert_owned(promoted_txn, resource, promoted_mode);
            state.reply_to(promoted_txn, LockReply::Granted(resource, promoted_mode));
        }
        Ok(())
    }

    /// Drops every lock the transaction owns or is waiting on; used both
    /// for ordinary commit/abort and for deadlock-victim cleanup.
    pub fn release_all(&self, txn: TransactionId) {
        let mut state = self.state.lock();
        self.release_all_locked(&mut state, txn);
    }

    fn release_all_locked(&self, state: &mut State, txn: TransactionId) {
        let promotions = state.lock_table.remove_transaction(txn);
        for (resource, promoted_txn, promoted_mode) in promotions {
            state
                .transaction_table
                .remove_pending(promoted_txn, resource, promoted_mode)
                .ok();
            state
                .transaction_table
                .insert_owned(promoted_txn, resource, promoted_mode);
            state.reply_to(promoted_txn, LockReply::Granted(resource, promoted_mode));
        }
        let _ = state.transaction_table.forget(txn);
    }

    /// Drops the transaction's own pending requests, leaving any locks it
    /// already holds untouched. Unconditional: a pure waiter with no owned
    /// locks is the primary case this exists for, not one to skip.
    pub fn cancel(&self, txn: TransactionId) {
        let mut state = self.state.lock();
        for (resource, mode) in state.transaction_table.pending_of(txn) {
            state.lock_table.remove_pending(txn, resource, mode);
            let _ = state.transaction_table.remove_pending(txn, resource, mode);
        }
    }

    pub fn drain_replies(&self, txn: TransactionId) -> Vec<LockReply> {
        let mut state = self.state.lock();
        state
            .reply_queues
            .get_mut(&txn)
            .map(|q| q.drain(..).collect())
            .unwrap_or_default()
    }

    /// Invoked by the Deadlock Thread (or directly, via `force_detection_pass`
    /// in tests): runs the detector, aborts every victim, and re-promotes
    /// every resource whose granted prefix shrank.
    fn run_detection_pass(&self, state: &mut State) -> Vec<TransactionId> {
        let victims = self.detector.detect(&state.lock_table);
        for &victim in &victims {
            self.release_all_locked(state, victim);
            state.reply_to(victim, LockReply::Aborted);
        }
        victims
    }

    /// Test/direct-call entry point equivalent to the background thread
    /// waking the loop between requests.
    pub fn force_detection_pass(&self) -> Vec<TransactionId> {
        let mut state = self.state.lock();
        self.run_detection_pass(&mut state)
    }
}
