// Admission control over a fixed pool of concurrently running queries, with
// a FIFO waiting list for the overflow and a round-robin message collection
// pass over every admitted query.

use std::collections::{HashMap, VecDeque};

use crate::common::QueryId;
use crate::execution::messages::Message;
use crate::execution::query_manager::QueryManager;

pub struct PolicyEnforcerConfig {
    /// Maximum number of queries running at once.
    pub admission_capacity: usize,
}

impl Default for PolicyEnforcerConfig {
    fn default() -> Self {
        Self {
            admission_capacity: 2,
        }
    }
}

pub struct QueryHandle {
    pub query_id: QueryId,
    pub dependencies: HashMap<crate::common::OperatorId, Vec<crate::common::OperatorId>>,
}

pub struct PolicyEnforcer {
    capacity: usize,
    admitted: HashMap<QueryId, QueryManager>,
    waiting: VecDeque<QueryHandle>,
}

impl PolicyEnforcer {
    pub fn new(config: PolicyEnforcerConfig) -> Self {
        Self {
            capacity: config.admission_capacity,
            admitted: HashMap::new(),
            waiting: VecDeque::new(),
        }
    }

    /// Three independent, ordered checks: reject a duplicate id outright
    /// (whether or not there's room), else admit immediately if there's
    /// capacity, else queue. Returns whether the query is now running.
    pub fn admit_query(&mut self, handle: QueryHandle) -> bool {
        if self.admitted.contains_key(&handle.query_id) {
            tracing::error!(query_id = handle.query_id, "query with same id already admitted");
            return false;
        }
        if self.admitted.len() < self.capacity {
            let qm = QueryManager::new(handle.query_id, handle.dependencies);
            self.admitted.insert(handle.query_id, qm);
            true
        } else {
            self.waiting.push_back(handle);
            false
        }
    }

    pub fn is_admitted(&self, query_id: QueryId) -> bool {
        self.admitted.contains_key(&query_id)
    }

    pub fn query_manager_mut(&mut self, query_id: QueryId) -> Option<&mut QueryManager> {
        self.admitted.get_mut(&query_id)
    }

    pub fn admitted_count(&self) -> usize {
        self.admitted.len()
    }

    pub fn waiting_count(&self) -> usize {
        self.waiting.len()
    }

    /// Dispatches `message` to the query it targets. Every arm handles
    /// exactly one message kind and falls through to nothing else; a
    /// message for a query this enforcer never admitted is dropped rather
    /// than panicking, since a late completion can race a forced removal.
    pub fn process_message(&mut self, message: Message) {
        let query_id = message.query_id();
        let Some(qm) = self.admitted.get_mut(&query_id) else {
            tracing::warn!(query_id, "message for an unadmitted query, dropping");
            return;
        };

        let result = qm.process_message(message);
        if result == crate::execution::messages::ProcessResult::Executed {
            self.remove_query(query_id);
            self.admit_next_waiting();
        }
    }

    fn admit_next_waiting(&mut self) {
        if self.admitted.len() >= self.capacity {
            return;
        }
        if let Some(handle) = self.waiting.pop_front() {
            self.admit_query(handle);
        }
    }

    fn remove_query(&mut self, query_id: QueryId) {
        self.admitted.remove(&query_id);
    }

    /// Collects up to `messages_budget` worker messages total, split evenly
    /// across admitted queries. A query with no admitted peers gets the
    /// full budget rather than dividing by zero.
    pub fn collect_worker_messages(&mut self, messages_budget: usize) -> Vec<crate::execution::work_order::WorkOrder> {
        let mut collected = Vec::new();
        if self.admitted.is_empty() {
            return collected;
        }

        let per_query_share = std::cmp::max(1, messages_budget / self.admitted.len());
        let mut finished = Vec::new();

        for (&query_id, qm) in self.admitted.iter_mut() {
            let mut taken = 0;
            while taken < per_query_share {
                match qm.next_work_order(None, None) {
                    Some(order) => {
                        collected.push(order);
                        taken += 1;
                    }
                    None => {
                        if qm.is_terminal() {
                            finished.push(query_id);
                        }
                        break;
                    }
                }
            }
        }

        for query_id in finished {
            self.remove_query(query_id);
            self.admit_next_waiting();
        }

        collected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle(query_id: QueryId) -> QueryHandle {
        let mut deps = HashMap::new();
        deps.insert(1, vec![]);
        QueryHandle {
            query_id,
            dependencies: deps,
        }
    }

    #[test]
    fn admits_up_to_capacity_then_queues() {
        let mut pe = PolicyEnforcer::new(PolicyEnforcerConfig {
            admission_capacity: 2,
        });
        assert!(pe.admit_query(handle(1)));
        assert!(pe.admit_query(handle(2)));
        assert!(!pe.admit_query(handle(3)));
        assert_eq!(pe.admitted_count(), 2);
        assert_eq!(pe.waiting_count(), 1);
    }

    #[test]
    fn duplicate_id_rejected_even_with_capacity() {
        let mut pe = PolicyEnforcer::new(PolicyEnforcerConfig {
            admission_capacity: 2,
        });
        assert!(pe.admit_query(handle(1)));
        assert!(!pe.admit_query(handle(1)));
        assert_eq!(pe.admitted_count(), 1);
    }

    #[test]
    fn duplicate_id_rejected_at_capacity_not_queued() {
        let mut pe = PolicyEnforcer::new(PolicyEnforcerConfig {
            admission_capacity: 1,
        });
        assert!(pe.admit_query(handle(1)));
        // Re-admitting id 1 while at capacity must be rejected outright,
        // not silently enqueued onto `waiting` behind the capacity check.
        assert!(!pe.admit_query(handle(1)));
        assert_eq!(pe.admitted_count(), 1);
        assert_eq!(pe.waiting_count(), 0);
    }

    #[test]
    fn completion_promotes_waiting_query() {
        let mut pe = PolicyEnforcer::new(PolicyEnforcerConfig {
            admission_capacity: 1,
        });
        pe.admit_query(handle(1));
        pe.admit_query(handle(2));
        assert_eq!(pe.waiting_count(), 1);

        pe.process_message(Message::WorkOrderComplete {
            query_id: 1,
            operator_id: 1,
        });

        assert!(pe.is_admitted(2));
        assert!(!pe.is_admitted(1));
        assert_eq!(pe.waiting_count(), 0);
    }

    #[test]
    fn work_order_feedback_routes_without_query_id() {
        let mut pe = PolicyEnforcer::new(PolicyEnforcerConfig::default());
        pe.admit_query(handle(super::super::messages::UNASSIGNED_QUERY_ID));
        // Should not panic even though WorkOrderFeedback carries no id.
        pe.process_message(Message::WorkOrderFeedback {
            operator_id: 1,
            payload: vec![],
        });
    }

    #[test]
    fn scenario_s6_admission_overflow_promotes_on_completion() {
        let mut pe = PolicyEnforcer::new(PolicyEnforcerConfig {
            admission_capacity: 2,
        });
        let empty = QueryHandle {
            query_id: 1,
            dependencies: HashMap::new(),
        };
        let empty2 = QueryHandle {
            query_id: 2,
            dependencies: HashMap::new(),
        };
        assert!(pe.admit_query(empty));
        assert!(pe.admit_query(empty2));
        assert!(!pe.admit_query(handle(3)));
        assert_eq!(pe.waiting_count(), 1);

        // Query 1 has no operators, so it's already terminal; the next
        // collection pass should notice, remove it, and promote query 3.
        pe.collect_worker_messages(4);

        assert!(!pe.is_admitted(1));
        assert!(pe.is_admitted(3));
        assert_eq!(pe.waiting_count(), 0);
    }

    #[test]
    fn collect_worker_messages_splits_budget_evenly() {
        let mut pe = PolicyEnforcer::new(PolicyEnforcerConfig {
            admission_capacity: 2,
        });
        pe.admit_query(handle(1));
        pe.admit_query(handle(2));
        pe.query_manager_mut(1)
            .unwrap()
            .enqueue_normal(1, vec![crate::execution::work_order::WorkOrder::normal(1, 1, vec![])]);
        pe.query_manager_mut(2)
            .unwrap()
            .enqueue_normal(1, vec![crate::execution::work_order::WorkOrder::normal(2, 1, vec![])]);

        let collected = pe.collect_worker_messages(2);
        assert_eq!(collected.len(), 2);
    }
}
