// Transaction lifecycle coordination: begin, commit, abort. No MVCC
// read/write-set bookkeeping; that belongs to a layer this core doesn't
// implement. Commit/abort simply releases everything held through the
// hierarchical `LockManager`.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::common::TransactionId;

use super::error::{TransactionError, TransactionResult};
use super::lock_manager::{LockManager, LockReply};
use super::types::{Transaction, TransactionState};

pub struct TransactionManager {
    next_txn_id: Mutex<TransactionId>,
    active_txns: RwLock<HashMap<TransactionId, Transaction>>,
    lock_manager: Arc<LockManager>,
}

impl TransactionManager {
    pub fn new(lock_manager: Arc<LockManager>) -> Self {
        Self {
            next_txn_id: Mutex::new(1),
            active_txns: RwLock::new(HashMap::new()),
            lock_manager,
        }
    }

    pub fn begin(&self) -> TransactionId {
        let txn_id = {
            let mut next_id = self.next_txn_id.lock();
            let id = *next_id;
            *next_id += 1;
            id
        };
        self.active_txns.write().insert(txn_id, Transaction::new(txn_id));
        txn_id
    }

    pub fn commit(&self, txn_id: TransactionId) -> TransactionResult<()> {
        self.finish(txn_id, TransactionState::Committing, TransactionState::Committed)
    }

    pub fn abort(&self, txn_id: TransactionId) -> TransactionResult<()> {
        self.finish(txn_id, TransactionState::Aborting, TransactionState::Aborted)
    }

    fn finish(
        &self,
        txn_id: TransactionId,
        transitional: TransactionState,
        terminal: TransactionState,
    ) -> TransactionResult<()> {
        {
            let mut active = self.active_txns.write();
            let txn = active
                .get_mut(&txn_id)
                .ok_or(TransactionError::TransactionNotFound(txn_id))?;
            if txn.state == TransactionState::Committed {
                return Err(TransactionError::AlreadyCommitted(txn_id));
            }
            if txn.state == TransactionState::Aborted {
                return Err(TransactionError::AlreadyAborted(txn_id));
            }
            txn.state = transitional;
        }

        self.lock_manager.release_all(txn_id);

        let mut active = self.active_txns.write();
        if let Some(txn) = active.get_mut(&txn_id) {
            txn.state = terminal;
        }
        active.remove(&txn_id);
        Ok(())
    }

    pub fn get_lock_manager(&self) -> Arc<LockManager> {
        Arc::clone(&self.lock_manager)
    }

    pub fn is_active(&self, txn_id: TransactionId) -> bool {
        self.active_txns.read().contains_key(&txn_id)
    }

    /// Surfaces a deadlock-victim abort the Deadlock Thread delivered to
    /// `txn_id`'s reply queue since the caller last checked. A transaction
    /// that's never been picked as a victim returns `Ok(())` unchanged;
    /// otherwise its entry is torn down and the abort is handed back as an
    /// error the caller can propagate instead of it being lost silently.
    pub fn check_deadlock_abort(&self, txn_id: TransactionId) -> TransactionResult<()> {
        let replies = self.lock_manager.drain_replies(txn_id);
        if !replies.contains(&LockReply::Aborted) {
            return Ok(());
        }
        let mut active = self.active_txns.write();
        if let Some(txn) = active.get_mut(&txn_id) {
            txn.state = TransactionState::Aborted;
        }
        active.remove(&txn_id);
        Err(TransactionError::DeadlockAbort(txn_id))
    }

    pub fn active_count(&self) -> usize {
        self.active_txns.read().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::lock::AccessMode;
    use crate::transaction::lock_manager::LockManagerConfig;
    use crate::transaction::resource_id::ResourceId;

    #[test]
    fn begin_commit_releases_locks() {
        let lm = LockManager::new(LockManagerConfig::default());
        let tm = TransactionManager::new(Arc::clone(&lm));

        let txn = tm.begin();
        assert!(tm.is_active(txn));

        lm.acquire(txn, ResourceId::make_rel(1, 1), AccessMode::Shared);
        lm.drain_replies(txn);
        tm.commit(txn).unwrap();
        assert!(!tm.is_active(txn));
        assert!(lm.drain_replies(txn).is_empty());
    }

    #[test]
    fn double_commit_fails() {
        let lm = LockManager::new(LockManagerConfig::default());
        let tm = TransactionManager::new(lm);
        let txn = tm.begin();
        tm.commit(txn).unwrap();
        assert_eq!(
            tm.commit(txn),
            Err(TransactionError::TransactionNotFound(txn))
        );
    }

    #[test]
    fn deadlock_victim_surfaces_as_error() {
        let lm = LockManager::new(LockManagerConfig::default());
        let tm = TransactionManager::new(Arc::clone(&lm));

        let t1 = tm.begin();
        let t2 = tm.begin();

        let r1 = ResourceId::make_rel(1, 1);
        let r2 = ResourceId::make_rel(1, 2);
        lm.acquire(t1, r1, AccessMode::Exclusive);
        lm.acquire(t2, r2, AccessMode::Exclusive);
        lm.acquire(t1, r2, AccessMode::Exclusive);
        lm.acquire(t2, r1, AccessMode::Exclusive);

        let victims = lm.force_detection_pass();
        assert_eq!(victims, vec![t2]);

        assert_eq!(tm.check_deadlock_abort(t1), Ok(()));
        assert_eq!(
            tm.check_deadlock_abort(t2),
            Err(TransactionError::DeadlockAbort(t2))
        );
        assert!(!tm.is_active(t2));
    }
}
