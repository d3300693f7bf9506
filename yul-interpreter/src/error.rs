//! Error types for the interpreter

use thiserror::Error;

/// Result type for interpreter operations
pub type InterpreterResult<T> = Result<T, InterpreterError>;

/// Errors that can occur during interpretation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InterpreterError {
    /// Variable not found
    #[error("Name error: {0}")]
    NameError(String),

    /// Function not found
    #[error("Undefined function: {0}")]
    UndefinedFunction(String),

    /// Invalid number of arguments
    #[error("Arity error: {function} expects {expected} arguments, got {actual}")]
    ArityError {
        function: String,
        expected: usize,
        actual: usize,
    },

    /// Wrong number of values produced for the context
    #[error("Value error: expected {expected} values, got {actual}")]
    ValueCount { expected: usize, actual: usize },

    #[error("Unsupported builtin: {0}")]
    UnsupportedBuiltin(String),

    #[error("Invalid literal: {0}")]
    InvalidLiteral(String),

    #[error("Memory access out of bounds: offset {offset}, size {size}")]
    MemoryOutOfBounds { offset: String, size: String },

    /// Stack overflow
    #[error("Stack overflow: maximum call depth {0} exceeded")]
    StackOverflow(usize),

    #[error("Step limit of {0} exceeded")]
    StepLimitExceeded(usize),

    /// Break outside of loop
    #[error("Break outside of loop")]
    BreakOutsideLoop,

    /// Continue outside of loop
    #[error("Continue outside of loop")]
    ContinueOutsideLoop,

    #[error("Leave outside of function")]
    LeaveOutsideFunction,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = InterpreterError::NameError("x".to_string());
        assert_eq!(err.to_string(), "Name error: x");

        let err = InterpreterError::ArityError {
            function: "f".to_string(),
            expected: 2,
            actual: 3,
        };
        assert_eq!(err.to_string(), "Arity error: f expects 2 arguments, got 3");
        assert_eq!(
            InterpreterError::StepLimitExceeded(10).to_string(),
            "Step limit of 10 exceeded"
        );
    }
}
