// Transaction concurrency control: a hierarchical resource namespace, a
// lock-mode compatibility matrix, per-resource FIFO lock queueing, a
// transaction table, and a periodic wait-for-graph deadlock detector that
// selects victims via strongly-connected-component discovery.
//
// | Module | Responsibility |
// |--------|----------------|
// | [`resource_id`] | Hierarchical (database, relation, block, tuple) name |
// | [`lock`] | Lock mode enumeration and compatibility matrix |
// | [`lock_table`] | Per-resource granted prefix / pending suffix |
// | [`transaction_table`] | Per-transaction owned/pending lock lists |
// | [`graph`] | Generic directed graph with Tarjan SCC discovery |
// | [`deadlock`] | Wait-for-graph construction and victim selection |
// | [`lock_manager`] | Single-threaded request serializer + deadlock thread |
// | [`types`] / [`manager`] | Transaction lifecycle (begin/commit/abort) |
// | [`error`] | Transaction-subsystem error kinds |

pub mod deadlock;
pub mod error;
pub mod graph;
pub mod lock;
pub mod lock_manager;
pub mod lock_table;
pub mod manager;
pub mod resource_id;
pub mod transaction_table;
pub mod types;

pub use deadlock::{DeadlockDetector, DeadlockDetectorConfig};
pub use error::{TransactionError, TransactionResult};
pub use graph::{ComponentId, DirectedGraph, NodeId, StronglyConnectedComponents};
pub use lock::{compatible, AccessMode, Lock};
pub use lock_manager::{LockManager, LockManagerConfig, LockReply};
pub use lock_table::{GrantOutcome, LockTable};
pub use manager::TransactionManager;
pub use resource_id::ResourceId;
pub use transaction_table::TransactionTable;
pub use types::{Transaction, TransactionState};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn end_to_end_acquire_deadlock_recover() {
        let lock_manager = LockManager::new(LockManagerConfig::default());
        let tm = TransactionManager::new(std::sync::Arc::clone(&lock_manager));

        let t1 = tm.begin();
        let t2 = tm.begin();

        let r1 = ResourceId::make_rel(1, 1);
        let r2 = ResourceId::make_rel(1, 2);

        lock_manager.acquire(t1, r1, AccessMode::Exclusive);
        lock_manager.acquire(t2, r2, AccessMode::Exclusive);
        lock_manager.acquire(t1, r2, AccessMode::Exclusive);
        lock_manager.acquire(t2, r1, AccessMode::Exclusive);

        let victims = lock_manager.force_detection_pass();
        assert_eq!(victims, vec![t2]);
        assert!(tm.is_active(t1));
    }
}
