//! Parser error types

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Unexpected token at position {position}: expected {expected}, found {found}")]
    UnexpectedToken {
        position: usize,
        expected: String,
        found: String,
    },

    #[error("Unexpected end of input")]
    UnexpectedEof,

    #[error("Invalid token at position {position}: {text}")]
    InvalidToken { position: usize, text: String },

    #[error("Invalid syntax at position {position}: {message}")]
    InvalidSyntax { position: usize, message: String },

    #[error("Maximum parsing depth exceeded: depth {depth} exceeds limit of {max_depth}")]
    MaxDepthExceeded { depth: usize, max_depth: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    UnexpectedToken,
    UnexpectedEof,
    InvalidToken,
    InvalidSyntax,
    MaxDepthExceeded,
}

impl ParseError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ParseError::UnexpectedToken { .. } => ErrorKind::UnexpectedToken,
            ParseError::UnexpectedEof => ErrorKind::UnexpectedEof,
            ParseError::InvalidToken { .. } => ErrorKind::InvalidToken,
            ParseError::InvalidSyntax { .. } => ErrorKind::InvalidSyntax,
            ParseError::MaxDepthExceeded { .. } => ErrorKind::MaxDepthExceeded,
        }
    }

    /// Byte offset of the error, when known
    pub fn position(&self) -> Option<usize> {
        match self {
            ParseError::UnexpectedToken { position, .. }
            | ParseError::InvalidToken { position, .. }
            | ParseError::InvalidSyntax { position, .. } => Some(*position),
            ParseError::UnexpectedEof | ParseError::MaxDepthExceeded { .. } => None,
        }
    }
}

impl From<ParseError> for yul_core::Error {
    fn from(err: ParseError) -> Self {
        yul_core::Error::Other(err.into())
    }
}
