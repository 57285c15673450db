// Deadlock detection via wait-for-graph construction and SCC discovery.
// Tarjan SCC enumeration finds every cycle in a single pass, not just the
// first one a depth-first walk happens to hit.

use std::collections::HashMap;
use std::time::Duration;

use crate::common::TransactionId;
use crate::transaction::graph::{DirectedGraph, StronglyConnectedComponents};
use crate::transaction::lock::compatible;
use crate::transaction::lock_table::LockTable;

#[derive(Debug, Clone)]
pub struct DeadlockDetectorConfig {
    /// Period between Deadlock Thread passes; default ≈ 5 seconds.
    pub detection_interval: Duration,
}

impl Default for DeadlockDetectorConfig {
    fn default() -> Self {
        Self {
            detection_interval: Duration::from_secs(5),
        }
    }
}

/// Builds a wait-for graph from the Lock Table and returns a set of victim
/// transactions; performs no mutation itself.
pub struct DeadlockDetector {
    config: DeadlockDetectorConfig,
}

impl DeadlockDetector {
    pub fn new(config: DeadlockDetectorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DeadlockDetectorConfig {
        &self.config
    }

    /// 1. Build a wait-for graph: for every resource with a non-empty
    ///    pending suffix, for every pending (tw, mw) add an edge to every
    ///    granted holder incompatible with mw, and to every earlier pending
    ///    waiter on the same resource also incompatible with mw (so a
    ///    transaction waits behind every earlier, incompatible waiter).
    /// 2. Run SCC discovery.
    /// 3. Every SCC of size >= 2 is a cycle; pick the highest TransactionId
    ///    (youngest) as its victim. Return the union of victims.
    pub fn detect(&self, lock_table: &LockTable) -> Vec<TransactionId> {
        let mut node_of: HashMap<TransactionId, usize> = HashMap::new();
        let mut graph: DirectedGraph<TransactionId> = DirectedGraph::new();

        fn node_for(
            txn: TransactionId,
            graph: &mut DirectedGraph<TransactionId>,
            node_of: &mut HashMap<TransactionId, usize>,
        ) -> usize {
            *node_of.entry(txn).or_insert_with(|| graph.add_node(txn))
        }

        for resource in lock_table.resources() {
            let waiters = lock_table.waiters(resource);
            if waiters.is_empty() {
                continue;
            }
            let holders = lock_table.holders(resource);

            for (i, &(waiter_txn, waiter_mode)) in waiters.iter().enumerate() {
                let waiter_node = node_for(waiter_txn, &mut graph, &mut node_of);

                for &(holder_txn, holder_mode) in &holders {
                    if !compatible(holder_mode, waiter_mode) {
                        let holder_node = node_for(holder_txn, &mut graph, &mut node_of);
                        graph.add_edge(waiter_node, holder_node);
                    }
                }

                for &(earlier_txn, earlier_mode) in &waiters[..i] {
                    if !compatible(earlier_mode, waiter_mode) {
                        let earlier_node = node_for(earlier_txn, &mut graph, &mut node_of);
                        graph.add_edge(waiter_node, earlier_node);
                    }
                }
            }
        }

        let scc = StronglyConnectedComponents::discover(&graph);
        let mut victims = Vec::new();
        for component in scc.components() {
            if component.len() >= 2 {
                let victim = component
                    .iter()
                    .map(|&node| *graph.payload(node))
                    .max()
                    .expect("non-empty component");
                victims.push(victim);
            }
        }
        victims
    }
}

impl Default for DeadlockDetector {
    fn default() -> Self {
        Self::new(DeadlockDetectorConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::lock::AccessMode;
    use crate::transaction::lock_table::LockTable;
    use crate::transaction::resource_id::ResourceId;

    #[test]
    fn scenario_s5_two_cycle_picks_youngest() {
        let r1 = ResourceId::make_rel(1, 1);
        let r2 = ResourceId::make_rel(1, 2);
        let mut table = LockTable::new();

        // T1 holds X on R1 and waits for X on R2.
        table.try_grant(1, r1, AccessMode::Exclusive);
        table.try_grant(2, r2, AccessMode::Exclusive);
        table.try_grant(1, r2, AccessMode::Exclusive); // queued
        table.try_grant(2, r1, AccessMode::Exclusive); // queued

        let detector = DeadlockDetector::default();
        let victims = detector.detect(&table);
        assert_eq!(victims, vec![2]);
    }

    #[test]
    fn no_cycle_no_victims() {
        let r1 = ResourceId::make_rel(1, 1);
        let mut table = LockTable::new();
        table.try_grant(1, r1, AccessMode::Shared);
        table.try_grant(2, r1, AccessMode::Exclusive); // queued, no cycle

        let detector = DeadlockDetector::default();
        assert!(detector.detect(&table).is_empty());
    }
}
