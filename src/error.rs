use thiserror::Error;

/// Crate-wide error type for the catalog boundary, which sits outside the
/// transaction and execution cores that carry their own error enums
/// (`transaction::error::TransactionError`, `parser::diagnostics::Diagnostic`).
/// This corresponds to the SchemaError kind: a catalog resolve/create/drop
/// failure surfaced to whichever layer called into the catalog.
#[derive(Error, Debug, Clone)]
pub enum DbError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),
}

pub type Result<T> = std::result::Result<T, DbError>;
