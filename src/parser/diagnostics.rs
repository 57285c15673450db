// Location-tagged, recoverable parse diagnostics. A statement-fatal error
// yields no AST; the caller is responsible for resyncing to the next `;`
// or EOF before attempting the next statement.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Diagnostic {
    #[error("{location:?}: unexpected token {found:?}, expected {expected}")]
    UnexpectedToken {
        location: Location,
        found: String,
        expected: String,
    },
    #[error("{location:?}: {feature} is not supported")]
    NotSupported { location: Location, feature: String },
    #[error("{location:?}: {message}")]
    InvalidLiteral { location: Location, message: String },
    #[error("{location:?}: unterminated statement")]
    UnterminatedStatement { location: Location },
}

impl Diagnostic {
    pub fn location(&self) -> &Location {
        match self {
            Diagnostic::UnexpectedToken { location, .. }
            | Diagnostic::NotSupported { location, .. }
            | Diagnostic::InvalidLiteral { location, .. }
            | Diagnostic::UnterminatedStatement { location } => location,
        }
    }
}
