// Per-query state machine: emits work orders, consumes completions.

use std::collections::{HashMap, VecDeque};

use crate::common::{OperatorId, QueryId};
use crate::execution::messages::{Message, ProcessResult};
use crate::execution::work_order::{WorkOrder, WorkOrderClass};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorState {
    Pending,
    Runnable,
    Emitting,
    Draining,
    Done,
}

struct Operator {
    state: OperatorState,
    predecessors: Vec<OperatorId>,
    successors: Vec<OperatorId>,
    normal_backlog: VecDeque<WorkOrder>,
    rebuild_backlog: VecDeque<WorkOrder>,
    outstanding: usize,
    needs_rebuild: bool,
}

impl Operator {
    fn new(predecessors: Vec<OperatorId>) -> Self {
        let initially_runnable = predecessors.is_empty();
        Self {
            state: if initially_runnable {
                OperatorState::Runnable
            } else {
                OperatorState::Pending
            },
            predecessors,
            successors: Vec::new(),
            normal_backlog: VecDeque::new(),
            rebuild_backlog: VecDeque::new(),
            outstanding: 0,
            needs_rebuild: false,
        }
    }
}

/// One instance per admitted query. The operator DAG's content
/// (which WorkOrders an operator produces) is supplied by the
/// out-of-scope optimizer/executor; this type only enforces the precondition
/// DAG, the per-operator state machine, and outstanding-count bookkeeping.
pub struct QueryManager {
    query_id: QueryId,
    operators: HashMap<OperatorId, Operator>,
    total_outstanding: usize,
    failed: bool,
}

impl QueryManager {
    /// `dependencies` maps an operator to the operators that must finish
    /// before it becomes runnable.
    pub fn new(query_id: QueryId, dependencies: HashMap<OperatorId, Vec<OperatorId>>) -> Self {
        let mut operators: HashMap<OperatorId, Operator> = dependencies
            .iter()
            .map(|(&id, preds)| (id, Operator::new(preds.clone())))
            .collect();

        for (&id, preds) in &dependencies {
            for &pred in preds {
                if let Some(pred_op) = operators.get_mut(&pred) {
                    pred_op.successors.push(id);
                }
            }
        }

        Self {
            query_id,
            operators,
            total_outstanding: 0,
            failed: false,
        }
    }

    pub fn query_id(&self) -> QueryId {
        self.query_id
    }

    /// Supplies WorkOrders an operator will emit once runnable. Mirrors the
    /// optimizer handing a fixed plan to the executor; in-scope scheduling
    /// logic treats this backlog opaquely.
    pub fn enqueue_normal(&mut self, operator_id: OperatorId, orders: Vec<WorkOrder>) {
        if let Some(op) = self.operators.get_mut(&operator_id) {
            op.normal_backlog.extend(orders);
        }
    }

    pub fn enqueue_rebuild(&mut self, operator_id: OperatorId, orders: Vec<WorkOrder>) {
        if let Some(op) = self.operators.get_mut(&operator_id) {
            op.needs_rebuild = true;
            op.rebuild_backlog.extend(orders);
        }
    }

    /// Returns null when no work is currently runnable; the query may still
    /// be alive, awaiting messages. `numa_node_preference` and
    /// `worker_id_preference` are hints from the caller's placement policy;
    /// this core has no NUMA topology or worker affinity to place against,
    /// so they're stamped onto the returned order for a real dispatcher
    /// downstream rather than used to choose among runnable operators here.
    pub fn next_work_order(
        &mut self,
        numa_node_preference: Option<u32>,
        worker_id_preference: Option<u32>,
    ) -> Option<WorkOrder> {
        for op in self.operators.values_mut() {
            if op.state == OperatorState::Runnable || op.state == OperatorState::Emitting {
                if let Some(mut order) = op.normal_backlog.pop_front() {
                    op.state = OperatorState::Emitting;
                    op.outstanding += 1;
                    self.total_outstanding += 1;
                    if op.normal_backlog.is_empty() {
                        op.state = OperatorState::Draining;
                    }
                    order.numa_node_preference = numa_node_preference;
                    order.worker_id_preference = worker_id_preference;
                    return Some(order);
                }
            }
            if op.state == OperatorState::Draining && op.outstanding == 0 && op.needs_rebuild {
                if let Some(mut order) = op.rebuild_backlog.pop_front() {
                    op.outstanding += 1;
                    self.total_outstanding += 1;
                    order.numa_node_preference = numa_node_preference;
                    order.worker_id_preference = worker_id_preference;
                    return Some(order);
                }
            }
        }
        None
    }

    pub fn process_message(&mut self, msg: Message) -> ProcessResult {
        match msg {
            Message::WorkOrderComplete { operator_id, .. } => {
                self.complete_one(operator_id, WorkOrderClass::Normal);
            }
            Message::RebuildWorkOrderComplete { operator_id, .. } => {
                self.complete_one(operator_id, WorkOrderClass::Rebuild);
            }
            Message::NewBlockAvailable { operator_id, .. } | Message::DataPipeline { operator_id, .. } => {
                self.mark_runnable(operator_id);
            }
            Message::WorkOrdersAvailable { operator_id, .. } => {
                if let Some(op) = self.operators.get_mut(&operator_id) {
                    if op.state == OperatorState::Draining {
                        op.state = OperatorState::Runnable;
                    }
                }
            }
            Message::WorkOrderFeedback { .. } => {
                // Opaque to the Query Manager beyond forwarding; nothing to
                // update at this layer.
            }
        }

        if self.is_terminal() {
            ProcessResult::Executed
        } else {
            ProcessResult::InProgress
        }
    }

    fn complete_one(&mut self, operator_id: OperatorId, class: WorkOrderClass) {
        let Some(op) = self.operators.get_mut(&operator_id) else {
            return;
        };
        op.outstanding = op.outstanding.saturating_sub(1);
        self.total_outstanding = self.total_outstanding.saturating_sub(1);

        let drained = op.state == OperatorState::Draining && op.outstanding == 0;
        let rebuild_done = class == WorkOrderClass::Rebuild && op.rebuild_backlog.is_empty();
        let normal_done_no_rebuild = drained && !op.needs_rebuild;

        if normal_done_no_rebuild || (drained && rebuild_done) {
            op.state = OperatorState::Done;
            let successors: Vec<OperatorId> = op.successors.clone();
            for succ_id in successors {
                self.maybe_unblock(succ_id);
            }
        }
    }

    fn mark_runnable(&mut self, operator_id: OperatorId) {
        if let Some(op) = self.operators.get_mut(&operator_id) {
            if op.state == OperatorState::Pending {
                op.state = OperatorState::Runnable;
            }
        }
    }

    fn maybe_unblock(&mut self, operator_id: OperatorId) {
        let ready = self
            .operators
            .get(&operator_id)
            .map(|op| op.predecessors.iter().all(|p| self.is_done(*p)))
            .unwrap_or(false);
        if ready {
            self.mark_runnable(operator_id);
        }
    }

    fn is_done(&self, operator_id: OperatorId) -> bool {
        self.operators
            .get(&operator_id)
            .map(|op| op.state == OperatorState::Done)
            .unwrap_or(false)
    }

    /// Terminal condition: every operator is `Done` and the outstanding
    /// counter is zero.
    pub fn is_terminal(&self) -> bool {
        self.total_outstanding == 0
            && self
                .operators
                .values()
                .all(|op| op.state == OperatorState::Done)
    }

    pub fn mark_failed(&mut self) {
        self.failed = true;
    }

    pub fn has_failed(&self) -> bool {
        self.failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_operator_manager(query_id: QueryId) -> QueryManager {
        let mut deps = HashMap::new();
        deps.insert(1, vec![]);
        let mut qm = QueryManager::new(query_id, deps);
        qm.enqueue_normal(1, vec![WorkOrder::normal(query_id, 1, vec![])]);
        qm
    }

    #[test]
    fn single_operator_runs_to_completion() {
        let mut qm = single_operator_manager(7);
        let order = qm.next_work_order(None, None).expect("runnable work");
        assert_eq!(order.operator_id, 1);
        assert!(qm.next_work_order(None, None).is_none());

        let result = qm.process_message(Message::WorkOrderComplete {
            query_id: 7,
            operator_id: 1,
        });
        assert_eq!(result, ProcessResult::Executed);
        assert!(qm.is_terminal());
    }

    #[test]
    fn precondition_respected_across_operators() {
        let mut deps = HashMap::new();
        deps.insert(1, vec![]);
        deps.insert(2, vec![1]);
        let mut qm = QueryManager::new(5, deps);
        qm.enqueue_normal(1, vec![WorkOrder::normal(5, 1, vec![])]);
        qm.enqueue_normal(2, vec![WorkOrder::normal(5, 2, vec![])]);

        // Operator 2 has an unmet predecessor: never handed out yet.
        let first = qm.next_work_order(None, None).unwrap();
        assert_eq!(first.operator_id, 1);
        assert!(qm.next_work_order(None, None).is_none());

        qm.process_message(Message::WorkOrderComplete {
            query_id: 5,
            operator_id: 1,
        });

        let second = qm.next_work_order(None, None).unwrap();
        assert_eq!(second.operator_id, 2);
    }

    #[test]
    fn rebuild_follows_normal_work_orders() {
        let mut deps = HashMap::new();
        deps.insert(1, vec![]);
        let mut qm = QueryManager::new(9, deps);
        qm.enqueue_normal(1, vec![WorkOrder::normal(9, 1, vec![])]);
        qm.enqueue_rebuild(1, vec![WorkOrder::rebuild(9, 1, vec![])]);

        let normal = qm.next_work_order(None, None).unwrap();
        assert_eq!(normal.class, WorkOrderClass::Normal);
        assert!(qm.next_work_order(None, None).is_none());

        qm.process_message(Message::WorkOrderComplete {
            query_id: 9,
            operator_id: 1,
        });

        let rebuild = qm.next_work_order(None, None).unwrap();
        assert_eq!(rebuild.class, WorkOrderClass::Rebuild);

        let result = qm.process_message(Message::RebuildWorkOrderComplete {
            query_id: 9,
            operator_id: 1,
        });
        assert_eq!(result, ProcessResult::Executed);
    }
}
