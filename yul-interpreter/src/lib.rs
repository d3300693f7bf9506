//! Yul Tree-Walking Interpreter
//!
//! Executes Yul code over a small, deterministic machine model: sparse
//! memory, storage, logs and call data. Used to check that optimised code
//! behaves exactly like the unoptimised code.

pub mod builtins;
pub mod environment;
pub mod error;
pub mod interpreter;
pub mod state;

pub use environment::Environment;
pub use error::{InterpreterError, InterpreterResult};
pub use interpreter::{execute, execute_object, Interpreter, InterpreterOptions};
pub use state::{LogEntry, MachineState, Termination};
