// Query admission and scheduling: work orders flow out of admitted queries,
// completion and dataflow messages flow back in, and a fixed-size admission
// pool with a FIFO waiting list bounds how many queries run at once.
//
// | Module | Responsibility |
// |--------|----------------|
// | [`work_order`] | Executable unit of work with preconditions |
// | [`messages`] | Tagged worker messages and their dispatch contract |
// | [`query_manager`] | Per-query operator state machine |
// | [`policy_enforcer`] | Admission pool, waiting queue, message routing |
// | [`storage`] | Storage-manager boundary consumed by WorkOrders |

pub mod messages;
pub mod policy_enforcer;
pub mod query_manager;
pub mod storage;
pub mod work_order;

pub use messages::{Message, ProcessResult, UNASSIGNED_QUERY_ID};
pub use policy_enforcer::{PolicyEnforcer, PolicyEnforcerConfig, QueryHandle};
pub use query_manager::{OperatorState, QueryManager};
pub use storage::{Block, InMemoryStorageManager, StorageManager};
pub use work_order::{WorkOrder, WorkOrderClass, WorkOrderPayload};
