// Transaction-subsystem error kinds: only the ones this core actually
// raises, with no WAL/2PC/savepoint machinery behind them.

use thiserror::Error;

use crate::common::TransactionId;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransactionError {
    /// Release of a lock the transaction doesn't hold, or any other
    /// Lock Table/Transaction Table desync. Logged; state unchanged.
    #[error("lock table inconsistency: txn {txn} has no lock on {resource}")]
    LockTableInconsistency {
        txn: TransactionId,
        resource: String,
    },

    /// Delivered to a deadlock victim's reply queue; outstanding work is
    /// lost and must be retried at a higher layer.
    #[error("transaction {0} aborted to break a deadlock")]
    DeadlockAbort(TransactionId),

    #[error("transaction {0} not found")]
    TransactionNotFound(TransactionId),

    #[error("transaction {0} already committed")]
    AlreadyCommitted(TransactionId),

    #[error("transaction {0} already aborted")]
    AlreadyAborted(TransactionId),
}

impl TransactionError {
    pub fn not_found(txn: TransactionId) -> Self {
        TransactionError::TransactionNotFound(txn)
    }
}

pub type TransactionResult<T> = std::result::Result<T, TransactionError>;
