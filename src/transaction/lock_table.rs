// Per-resource FIFO of granted and pending lock holders over the
// hierarchical (ResourceId, AccessMode) model: a later-arriving compatible
// request still refuses to jump ahead of an earlier incompatible pending
// request, to prevent writer starvation.

use std::collections::{HashMap, VecDeque};

use crate::common::TransactionId;
use crate::transaction::lock::{compatible, AccessMode};
use crate::transaction::resource_id::ResourceId;

/// Outcome of `try_grant`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrantOutcome {
    Granted,
    Queued,
}

#[derive(Default)]
struct ResourceEntry {
    granted: Vec<(TransactionId, AccessMode)>,
    pending: VecDeque<(TransactionId, AccessMode)>,
}

impl ResourceEntry {
    fn compatible_with_granted(&self, mode: AccessMode) -> bool {
        self.granted.iter().all(|(_, held)| compatible(*held, mode))
    }
}

/// Not thread-safe; the Lock Manager serializes all access from its single
/// request-processing thread.
#[derive(Default)]
pub struct LockTable {
    resources: HashMap<ResourceId, ResourceEntry>,
}

impl LockTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// If every entry in the granted prefix is compatible with `mode` and
    /// the pending suffix is empty, append to the granted prefix and return
    /// `Granted`; otherwise append to the pending suffix and return
    /// `Queued`.
    pub fn try_grant(
        &mut self,
        txn: TransactionId,
        resource: ResourceId,
        mode: AccessMode,
    ) -> GrantOutcome {
        let entry = self.resources.entry(resource).or_default();
        if entry.pending.is_empty() && entry.compatible_with_granted(mode) {
            entry.granted.push((txn, mode));
            GrantOutcome::Granted
        } else {
            entry.pending.push_back((txn, mode));
            GrantOutcome::Queued
        }
    }

    /// Removes the matching pair from the granted prefix, then promotes:
    /// while the first pending entry is compatible with every remaining
    /// granted entry, moves it to the end of the granted prefix. Returns the
    /// transactions promoted, in order, so the Lock Manager can wake them.
    ///
    /// Releasing an absent lock is a caller bug: the table reports it via
    /// `false` and leaves state untouched.
    pub fn release(
        &mut self,
        txn: TransactionId,
        resource: ResourceId,
        mode: AccessMode,
    ) -> ReleaseOutcome {
        let Some(entry) = self.resources.get_mut(&resource) else {
            return ReleaseOutcome {
                released: false,
                promoted: Vec::new(),
            };
        };

        let before = entry.granted.len();
        entry.granted.retain(|pair| *pair != (txn, mode));
        if entry.granted.len() == before {
            return ReleaseOutcome {
                released: false,
                promoted: Vec::new(),
            };
        }

        let mut promoted = Vec::new();
        while let Some(&(waiter, waiter_mode)) = entry.pending.front() {
            if entry.compatible_with_granted(waiter_mode) {
                entry.pending.pop_front();
                entry.granted.push((waiter, waiter_mode));
                promoted.push((waiter, waiter_mode));
            } else {
                break;
            }
        }

        ReleaseOutcome {
            released: true,
            promoted,
        }
    }

    /// Drops every owned and pending entry for `txn` across every resource,
    /// used when the Lock Manager aborts a deadlock victim. Returns, per
    /// resource whose granted prefix shrank, the transactions subsequently
    /// promoted.
    pub fn remove_transaction(&mut self, txn: TransactionId) -> Vec<(ResourceId, TransactionId, AccessMode)> {
        let mut all_promoted = Vec::new();
        for (&resource, entry) in self.resources.iter_mut() {
            let had_granted = entry.granted.iter().any(|(t, _)| *t == txn);
            entry.granted.retain(|(t, _)| *t != txn);
            entry.pending.retain(|(t, _)| *t != txn);

            if had_granted {
                while let Some(&(waiter, waiter_mode)) = entry.pending.front() {
                    if entry.compatible_with_granted(waiter_mode) {
                        entry.pending.pop_front();
                        entry.granted.push((waiter, waiter_mode));
                        all_promoted.push((resource, waiter, waiter_mode));
                    } else {
                        break;
                    }
                }
            }
        }
        all_promoted
    }

    /// Drops `txn`'s pending entry for `resource`, if any. Never touches the
    /// granted prefix and never promotes, since removing a waiter can't free
    /// up capacity another waiter was blocked on; used by `cancel`, which by
    /// contract only withdraws requests that haven't been granted yet.
    pub fn remove_pending(&mut self, txn: TransactionId, resource: ResourceId, mode: AccessMode) {
        if let Some(entry) = self.resources.get_mut(&resource) {
            entry.pending.retain(|pair| *pair != (txn, mode));
        }
    }

    pub fn waiters(&self, resource: ResourceId) -> Vec<(TransactionId, AccessMode)> {
        self.resources
            .get(&resource)
            .map(|e| e.pending.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn holders(&self, resource: ResourceId) -> Vec<(TransactionId, AccessMode)> {
        self.resources
            .get(&resource)
            .map(|e| e.granted.clone())
            .unwrap_or_default()
    }

    /// Every resource currently tracked (granted or pending non-empty).
    /// Used by the deadlock detector to build the wait-for graph.
    pub fn resources(&self) -> Vec<ResourceId> {
        self.resources.keys().copied().collect()
    }
}

#[derive(Debug, Clone)]
pub struct ReleaseOutcome {
    pub released: bool,
    pub promoted: Vec<(TransactionId, AccessMode)>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::resource_id::ResourceId;

    fn r() -> ResourceId {
        ResourceId::make_rel(1, 1)
    }

    #[test]
    fn scenario_s4_no_starvation_and_promotion() {
        let mut table = LockTable::new();
        let resource = r();

        assert_eq!(
            table.try_grant(1, resource, AccessMode::Shared),
            GrantOutcome::Granted
        );
        assert_eq!(
            table.try_grant(2, resource, AccessMode::Exclusive),
            GrantOutcome::Queued
        );
        // T3's Shared would be compatible with T1's Shared, but T2 is
        // pending ahead of it, so T3 must queue behind T2 (property 3).
        assert_eq!(
            table.try_grant(3, resource, AccessMode::Shared),
            GrantOutcome::Queued
        );

        let outcome = table.release(1, resource, AccessMode::Shared);
        assert!(outcome.released);
        assert_eq!(outcome.promoted, vec![(2, AccessMode::Exclusive)]);

        assert_eq!(table.holders(resource), vec![(2, AccessMode::Exclusive)]);
        assert_eq!(table.waiters(resource), vec![(3, AccessMode::Shared)]);
    }

    #[test]
    fn release_of_absent_lock_is_noop() {
        let mut table = LockTable::new();
        let resource = r();
        let outcome = table.release(1, resource, AccessMode::Shared);
        assert!(!outcome.released);
        assert!(outcome.promoted.is_empty());
    }

    #[test]
    fn promotion_preserves_pairwise_compatibility() {
        let mut table = LockTable::new();
        let resource = r();

        table.try_grant(1, resource, AccessMode::IntentShared);
        table.try_grant(2, resource, AccessMode::IntentShared);
        let o = table.release(1, resource, AccessMode::IntentShared);
        assert!(o.released);
        assert!(o.promoted.is_empty());
        assert_eq!(table.holders(resource), vec![(2, AccessMode::IntentShared)]);
    }
}
