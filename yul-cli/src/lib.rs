//! Assembly stack and configuration behind the `yulc` binary

pub mod config;
pub mod stack;

pub use config::{load_config, Config, InterpreterConfig};
pub use stack::{AssemblyStack, StackError};
