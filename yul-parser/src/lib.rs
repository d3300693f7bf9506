//! Parser for Yul source code
//!
//! - Lexing with logos
//! - Recursive descent over blocks and `object` trees
//! - Bounded nesting depth

pub mod error;
pub mod lexer;
pub mod parser;

pub use error::{ErrorKind, ParseError};
pub use parser::{ParseResult, Parser};

use tracing::debug;
use yul_core::ast::{Block, Expression};
use yul_core::object::Object;

/// Parse a source file into an object tree
pub fn parse(source: &str) -> Result<Object, ParseError> {
    let object = Parser::new(source).parse_object_tree()?;
    debug!(
        object = %object.name,
        objects = object.object_count(),
        "parsed object tree"
    );
    Ok(object)
}

/// Parse a single `{ ... }` code block
pub fn parse_block(source: &str) -> Result<Block, ParseError> {
    Parser::new(source).parse_code()
}

/// Parse a single expression
pub fn parse_expression(source: &str) -> Result<Expression, ParseError> {
    Parser::new(source).parse_expression()
}

/// Parse with a custom nesting limit
pub fn parse_with_depth_limit(source: &str, max_depth: usize) -> Result<Object, ParseError> {
    Parser::new(source)
        .with_max_depth(max_depth)
        .parse_object_tree()
}
