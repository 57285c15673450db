// Shared identifier types used across the transaction and execution cores.

/// Opaque, totally-ordered transaction identifier. Ordering is used by the
/// deadlock detector's youngest-wins victim tie-break.
pub type TransactionId = u64;

/// Identifies a query admitted by the Policy Enforcer.
pub type QueryId = u64;

/// Identifies an operator within a query's operator DAG.
pub type OperatorId = u64;

/// Identifies a physical storage block, as handed out by the storage
/// manager boundary.
pub type BlockId = u64;

/// Identifies a relation in the catalog.
pub type RelationId = u32;

/// Identifies a database in the catalog.
pub type DatabaseId = u32;
