//! Core types and data structures for the Yul toolchain
//!
//! This crate provides the building blocks shared by the parser, the
//! optimiser, the interpreter and the driver:
//! - AST representation and visitors
//! - Dialects (builtin metadata) and object trees
//! - Printing, fresh-name generation and analysis
//! - Error types

pub mod analysis;
pub mod ast;
pub mod dialect;
pub mod error;
pub mod multi_use;
pub mod name_dispenser;
pub mod object;
pub mod printer;
pub mod visitor;

pub use dialect::{BuiltinFunction, Dialect, Language};
pub use error::{Error, Result};
pub use name_dispenser::NameDispenser;
pub use object::{Data, Object, ObjectNode};
