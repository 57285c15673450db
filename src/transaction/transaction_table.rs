// Per-transaction lists of owned locks and pending lock requests,
// grounded on `original_source/transaction/TransactionTable.cpp`: entries
// are appended with `putOwnEntry`/`putPendingEntry`, removed by matching
// (resource, mode) with a distinguished error when the entry isn't present,
// and `deleteTransaction` (here `forget`) drops a transaction's record
// wholesale.

use std::collections::HashMap;

use crate::common::TransactionId;
use crate::transaction::lock::{AccessMode, Lock};
use crate::transaction::resource_id::ResourceId;

/// Returned by `remove_owned`/`remove_pending` when asked to remove an
/// entry that isn't present; the table reports this without mutating
/// state, matching `kDEL_ERROR` in the original.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryNotFound;

#[derive(Default, Clone)]
struct TransactionEntry {
    owned: Vec<Lock>,
    pending: Vec<(ResourceId, AccessMode)>,
}

/// Mirrors the Lock Table; the Lock Manager keeps the two consistent by
/// centralizing all mutation in its single-threaded loop.
#[derive(Default)]
pub struct TransactionTable {
    transactions: HashMap<TransactionId, TransactionEntry>,
}

impl TransactionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_owned(&mut self, txn: TransactionId, resource: ResourceId, mode: AccessMode) {
        self.transactions
            .entry(txn)
            .or_default()
            .owned
            .push(Lock::new(resource, mode));
    }

    pub fn insert_pending(&mut self, txn: TransactionId, resource: ResourceId, mode: AccessMode) {
        self.transactions
            .entry(txn)
            .or_default()
            .pending
            .push((resource, mode));
    }

    pub fn remove_owned(
        &mut self,
        txn: TransactionId,
        resource: ResourceId,
        mode: AccessMode,
    ) -> Result<(), EntryNotFound> {
        let Some(entry) = self.transactions.get_mut(&txn) else {
            return Err(EntryNotFound);
        };
        let before = entry.owned.len();
        entry.owned.retain(|l| !(l.resource == resource && l.mode == mode));
        if entry.owned.len() == before {
            Err(EntryNotFound)
        } else {
            Ok(())
        }
    }

    pub fn remove_pending(
        &mut self,
        txn: TransactionId,
        resource: ResourceId,
        mode: AccessMode,
    ) -> Result<(), EntryNotFound> {
        let Some(entry) = self.transactions.get_mut(&txn) else {
            return Err(EntryNotFound);
        };
        let before = entry.pending.len();
        entry.pending.retain(|&(r, m)| !(r == resource && m == mode));
        if entry.pending.len() == before {
            Err(EntryNotFound)
        } else {
            Ok(())
        }
    }

    /// Concatenation of `owned` and `pending` resources for `txn`.
    pub fn resources_of(&self, txn: TransactionId) -> Vec<ResourceId> {
        match self.transactions.get(&txn) {
            None => Vec::new(),
            Some(entry) => entry
                .owned
                .iter()
                .map(|l| l.resource)
                .chain(entry.pending.iter().map(|(r, _)| *r))
                .collect(),
        }
    }

    pub fn owned_of(&self, txn: TransactionId) -> Vec<Lock> {
        self.transactions
            .get(&txn)
            .map(|e| e.owned.clone())
            .unwrap_or_default()
    }

    pub fn pending_of(&self, txn: TransactionId) -> Vec<(ResourceId, AccessMode)> {
        self.transactions
            .get(&txn)
            .map(|e| e.pending.clone())
            .unwrap_or_default()
    }

    /// Drops the transaction's record wholesale; used after abort/commit.
    /// Returns `Err` if the transaction had no record.
    pub fn forget(&mut self, txn: TransactionId) -> Result<(), EntryNotFound> {
        self.transactions.remove(&txn).map(|_| ()).ok_or(EntryNotFound)
    }

    pub fn contains(&self, txn: TransactionId) -> bool {
        self.transactions.contains_key(&txn)
    }
}
