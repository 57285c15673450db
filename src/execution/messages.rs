// Tagged worker messages consumed by the Query Manager and Policy Enforcer.
// Modeled as a sum type with a single `match` dispatch point, so an
// unhandled variant is a compile error rather than a silent fall-through.

use crate::common::{BlockId, OperatorId, QueryId, RelationId};

/// Default query id for `WorkOrderFeedback`, which carries no query id of
/// its own. Named rather than a bare literal so call sites read as
/// intentional.
pub const UNASSIGNED_QUERY_ID: QueryId = 0;

#[derive(Debug, Clone)]
pub enum Message {
    WorkOrderComplete {
        query_id: QueryId,
        operator_id: OperatorId,
    },
    RebuildWorkOrderComplete {
        query_id: QueryId,
        operator_id: OperatorId,
    },
    /// a/k/a catalog-relation-new-block.
    NewBlockAvailable {
        query_id: QueryId,
        operator_id: OperatorId,
        relation_id: RelationId,
        block_id: BlockId,
    },
    DataPipeline {
        query_id: QueryId,
        operator_id: OperatorId,
    },
    WorkOrdersAvailable {
        query_id: QueryId,
        operator_id: OperatorId,
    },
    /// Opaque, operator-specific payload; the Query Manager only forwards
    /// it. Carries no query id of its own — see `UNASSIGNED_QUERY_ID`.
    WorkOrderFeedback {
        operator_id: OperatorId,
        payload: Vec<u8>,
    },
}

impl Message {
    /// Every body except `WorkOrderFeedback` begins with a `query_id`
    /// field; this is the contract.
    pub fn query_id(&self) -> QueryId {
        match self {
            Message::WorkOrderComplete { query_id, .. }
            | Message::RebuildWorkOrderComplete { query_id, .. }
            | Message::NewBlockAvailable { query_id, .. }
            | Message::DataPipeline { query_id, .. }
            | Message::WorkOrdersAvailable { query_id, .. } => *query_id,
            Message::WorkOrderFeedback { .. } => UNASSIGNED_QUERY_ID,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessResult {
    InProgress,
    Executed,
}
