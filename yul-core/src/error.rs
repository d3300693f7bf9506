//! Error types shared by the Yul toolchain

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// A violated internal invariant. Indicates a defect in a pass, never bad input.
    #[error("Internal compiler error: {0}")]
    Internal(String),

    #[error("Analysis error: {0}")]
    Analysis(String),

    #[error("Unknown object: {0}")]
    UnknownObject(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn internal(message: impl Into<String>) -> Self {
        Error::Internal(message.into())
    }

    pub fn is_internal(&self) -> bool {
        matches!(self, Error::Internal(_))
    }
}

/// Returns early with [`Error::Internal`] when the condition does not hold.
///
/// ```
/// # use yul_core::{yul_assert, Result};
/// fn check(n: usize) -> Result<()> {
///     yul_assert!(n < 4, "argument count {} out of range", n);
///     Ok(())
/// }
/// assert!(check(1).is_ok());
/// assert!(check(9).unwrap_err().is_internal());
/// ```
#[macro_export]
macro_rules! yul_assert {
    ($cond:expr, $($arg:tt)+) => {
        if !($cond) {
            return Err($crate::error::Error::Internal(format!($($arg)+)).into());
        }
    };
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
