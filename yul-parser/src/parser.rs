//! Recursive descent parser for Yul code blocks and object trees

use crate::error::ParseError;
use crate::lexer::{Lexer, Token};
use std::ops::Range;
use yul_core::ast::{
    Block, Case, Expression, FunctionCall, FunctionDefinition, Literal, Name, Statement,
    TypedName,
};
use yul_core::object::{Data, Object, ObjectNode};

pub type ParseResult<T> = Result<T, ParseError>;

pub struct Parser<'a> {
    lexer: Lexer<'a>,
    /// Current nesting depth of blocks and expressions
    depth: usize,
    max_depth: usize,
}

impl<'a> Parser<'a> {
    /// Default maximum nesting depth
    pub const DEFAULT_MAX_DEPTH: usize = 1000;

    pub fn new(source: &'a str) -> Self {
        Self {
            lexer: Lexer::new(source),
            depth: 0,
            max_depth: Self::DEFAULT_MAX_DEPTH,
        }
    }

    /// Set the maximum nesting depth
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    fn enter_recursion(&mut self) -> ParseResult<()> {
        if self.depth >= self.max_depth {
            return Err(ParseError::MaxDepthExceeded {
                depth: self.depth,
                max_depth: self.max_depth,
            });
        }
        self.depth += 1;
        Ok(())
    }

    fn exit_recursion(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Parses a complete source: either a bare `{ ... }` block, which becomes
    /// an object named `object`, or an `object "Name" { ... }` tree.
    pub fn parse_object_tree(&mut self) -> ParseResult<Object> {
        let object = match self.lexer.peek_token()? {
            Some(Token::LBrace) => Object::from_code(self.parse_block()?),
            Some(Token::Object) => self.parse_object()?,
            _ => {
                let found = self.lexer.next_spanned()?;
                return Err(self.unexpected(found, "\"{\" or \"object\""));
            }
        };
        self.expect_end()?;
        Ok(object)
    }

    /// Parses a single code block and requires the input to end after it
    pub fn parse_code(&mut self) -> ParseResult<Block> {
        let block = self.parse_block()?;
        self.expect_end()?;
        Ok(block)
    }

    fn expect_end(&mut self) -> ParseResult<()> {
        match self.lexer.next_spanned()? {
            None => Ok(()),
            found => Err(self.unexpected(found, "end of input")),
        }
    }

    fn parse_object(&mut self) -> ParseResult<Object> {
        self.enter_recursion()?;
        self.expect(Token::Object, "\"object\"")?;
        let name = self.expect_string()?;
        self.expect(Token::LBrace, "\"{\"")?;
        self.expect(Token::Code, "\"code\"")?;
        let code = self.parse_block()?;
        let mut object = Object::new(name, code);
        loop {
            match self.lexer.peek_token()? {
                Some(Token::Object) => {
                    let nested = self.parse_object()?;
                    self.add_sub_object(&mut object, ObjectNode::Object(nested))?;
                }
                Some(Token::Data) => {
                    let data = self.parse_data()?;
                    self.add_sub_object(&mut object, ObjectNode::Data(data))?;
                }
                _ => break,
            }
        }
        self.expect(Token::RBrace, "\"}\"")?;
        self.exit_recursion();
        Ok(object)
    }

    fn add_sub_object(&mut self, object: &mut Object, node: ObjectNode) -> ParseResult<()> {
        if node.name() == object.name || object.sub_object(node.name()).is_some() {
            return Err(ParseError::InvalidSyntax {
                position: self.lexer.position(),
                message: format!("object name \"{}\" already used", node.name()),
            });
        }
        object.sub_objects.push(node);
        Ok(())
    }

    fn parse_data(&mut self) -> ParseResult<Data> {
        self.expect(Token::Data, "\"data\"")?;
        let name = self.expect_string()?;
        let bytes = match self.lexer.next_spanned()? {
            Some((Token::HexString(bytes), _)) => bytes,
            Some((Token::String(value), _)) => string_bytes(&value),
            found => return Err(self.unexpected(found, "data literal")),
        };
        Ok(Data { name, bytes })
    }

    fn parse_block(&mut self) -> ParseResult<Block> {
        self.enter_recursion()?;
        self.expect(Token::LBrace, "\"{\"")?;
        let mut statements = Vec::new();
        loop {
            match self.lexer.peek_token()? {
                Some(Token::RBrace) => break,
                None => return Err(ParseError::UnexpectedEof),
                Some(_) => statements.push(self.parse_statement()?),
            }
        }
        self.expect(Token::RBrace, "\"}\"")?;
        self.exit_recursion();
        Ok(Block::new(statements))
    }

    fn parse_statement(&mut self) -> ParseResult<Statement> {
        let Some(token) = self.lexer.peek_token()?.cloned() else {
            return Err(ParseError::UnexpectedEof);
        };
        match token {
            Token::LBrace => Ok(Statement::Block(self.parse_block()?)),
            Token::Function => self.parse_function_definition(),
            Token::Let => {
                self.lexer.next_token()?;
                let variables = self.parse_typed_names()?;
                let value = if self.eat(&Token::Assign)? {
                    Some(self.parse_expression()?)
                } else {
                    None
                };
                Ok(Statement::VariableDeclaration { variables, value })
            }
            Token::If => {
                self.lexer.next_token()?;
                let condition = self.parse_expression()?;
                let body = self.parse_block()?;
                Ok(Statement::If { condition, body })
            }
            Token::Switch => self.parse_switch(),
            Token::For => {
                self.lexer.next_token()?;
                let pre = self.parse_block()?;
                let condition = self.parse_expression()?;
                let post = self.parse_block()?;
                let body = self.parse_block()?;
                Ok(Statement::ForLoop {
                    pre,
                    condition,
                    post,
                    body,
                })
            }
            Token::Break => {
                self.lexer.next_token()?;
                Ok(Statement::Break)
            }
            Token::Continue => {
                self.lexer.next_token()?;
                Ok(Statement::Continue)
            }
            Token::Leave => {
                self.lexer.next_token()?;
                Ok(Statement::Leave)
            }
            _ => self.parse_call_or_assignment(),
        }
    }

    fn parse_call_or_assignment(&mut self) -> ParseResult<Statement> {
        let position = self.lexer.position();
        let first = self.expect_identifier()?;
        match self.lexer.peek_token()? {
            Some(Token::LParen) => {
                let call = self.parse_call_arguments(first)?;
                Ok(Statement::ExpressionStatement(Expression::FunctionCall(call)))
            }
            Some(Token::Comma) | Some(Token::Assign) => {
                let mut variable_names = vec![first];
                while self.eat(&Token::Comma)? {
                    variable_names.push(self.expect_identifier()?);
                }
                self.expect(Token::Assign, "\":=\"")?;
                let value = self.parse_expression()?;
                Ok(Statement::Assignment {
                    variable_names,
                    value,
                })
            }
            _ => Err(ParseError::InvalidSyntax {
                position,
                message: format!("\"{}\" is not a statement", first),
            }),
        }
    }

    fn parse_function_definition(&mut self) -> ParseResult<Statement> {
        self.expect(Token::Function, "\"function\"")?;
        let name = self.expect_identifier()?;
        self.expect(Token::LParen, "\"(\"")?;
        let parameters = if self.lexer.peek_token()? == Some(&Token::RParen) {
            Vec::new()
        } else {
            self.parse_typed_names()?
        };
        self.expect(Token::RParen, "\")\"")?;
        let return_variables = if self.eat(&Token::Arrow)? {
            self.parse_typed_names()?
        } else {
            Vec::new()
        };
        let body = self.parse_block()?;
        Ok(Statement::FunctionDefinition(FunctionDefinition {
            name,
            parameters,
            return_variables,
            body,
        }))
    }

    fn parse_switch(&mut self) -> ParseResult<Statement> {
        self.expect(Token::Switch, "\"switch\"")?;
        let expression = self.parse_expression()?;
        let mut cases = Vec::new();
        while self.eat(&Token::Case)? {
            let value = match self.lexer.next_spanned()? {
                Some((token, span)) => match self.literal_from(token.clone())? {
                    Some(literal) => literal,
                    None => return Err(self.unexpected(Some((token, span)), "literal")),
                },
                None => return Err(ParseError::UnexpectedEof),
            };
            let body = self.parse_block()?;
            cases.push(Case {
                value: Some(value),
                body,
            });
        }
        if self.eat(&Token::Default)? {
            let body = self.parse_block()?;
            cases.push(Case { value: None, body });
        }
        Ok(Statement::Switch { expression, cases })
    }

    fn parse_typed_names(&mut self) -> ParseResult<Vec<TypedName>> {
        let mut names = vec![self.parse_typed_name()?];
        while self.eat(&Token::Comma)? {
            names.push(self.parse_typed_name()?);
        }
        Ok(names)
    }

    fn parse_typed_name(&mut self) -> ParseResult<TypedName> {
        let name = self.expect_identifier()?;
        let type_name = self.parse_type_suffix()?;
        Ok(TypedName { name, type_name })
    }

    fn parse_type_suffix(&mut self) -> ParseResult<Option<Name>> {
        if self.eat(&Token::Colon)? {
            Ok(Some(self.expect_identifier()?))
        } else {
            Ok(None)
        }
    }

    pub fn parse_expression(&mut self) -> ParseResult<Expression> {
        self.enter_recursion()?;
        let expression = match self.lexer.next_spanned()? {
            None => return Err(ParseError::UnexpectedEof),
            Some((token, span)) => {
                if let Some(name) = identifier_text(&token) {
                    if self.lexer.peek_token()? == Some(&Token::LParen) {
                        Expression::FunctionCall(self.parse_call_arguments(name.to_string())?)
                    } else {
                        Expression::Identifier(name.to_string())
                    }
                } else {
                    match self.literal_from(token.clone())? {
                        Some(literal) => Expression::Literal(literal),
                        None => return Err(self.unexpected(Some((token, span)), "expression")),
                    }
                }
            }
        };
        self.exit_recursion();
        Ok(expression)
    }

    fn parse_call_arguments(&mut self, function_name: Name) -> ParseResult<FunctionCall> {
        self.expect(Token::LParen, "\"(\"")?;
        let mut arguments = Vec::new();
        if !self.eat(&Token::RParen)? {
            loop {
                arguments.push(self.parse_expression()?);
                if self.eat(&Token::RParen)? {
                    break;
                }
                self.expect(Token::Comma, "\",\" or \")\"")?;
            }
        }
        Ok(FunctionCall {
            function_name,
            arguments,
        })
    }

    /// Builds a literal from an already consumed token, `None` if the token
    /// does not start a literal
    fn literal_from(&mut self, token: Token<'a>) -> ParseResult<Option<Literal>> {
        let literal = match token {
            Token::Number(value) => Literal::number(value),
            Token::Boolean(value) => Literal::boolean(value),
            Token::String(value) => Literal::string(value),
            Token::HexString(bytes) => {
                Literal::string(bytes.into_iter().map(char::from).collect::<String>())
            }
            _ => return Ok(None),
        };
        let type_name = self.parse_type_suffix()?;
        Ok(Some(literal.with_type(type_name)))
    }

    fn eat(&mut self, expected: &Token<'a>) -> ParseResult<bool> {
        if self.lexer.peek_token()? == Some(expected) {
            self.lexer.next_token()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn expect(&mut self, expected: Token<'a>, description: &str) -> ParseResult<()> {
        match self.lexer.next_spanned()? {
            Some((token, _)) if token == expected => Ok(()),
            found => Err(self.unexpected(found, description)),
        }
    }

    fn expect_identifier(&mut self) -> ParseResult<Name> {
        match self.lexer.next_spanned()? {
            Some((token, span)) => match identifier_text(&token) {
                Some(name) => Ok(name.to_string()),
                None => Err(self.unexpected(Some((token, span)), "identifier")),
            },
            None => Err(ParseError::UnexpectedEof),
        }
    }

    fn expect_string(&mut self) -> ParseResult<String> {
        match self.lexer.next_spanned()? {
            Some((Token::String(value), _)) => Ok(value),
            found => Err(self.unexpected(found, "string literal")),
        }
    }

    fn unexpected(&self, found: Option<(Token<'a>, Range<usize>)>, expected: &str) -> ParseError {
        match found {
            Some((token, span)) => ParseError::UnexpectedToken {
                position: span.start,
                expected: expected.to_string(),
                found: token.describe(),
            },
            None => ParseError::UnexpectedEof,
        }
    }
}

/// `object`, `code` and `data` are only keywords inside object headers
fn identifier_text<'a>(token: &Token<'a>) -> Option<&'a str> {
    match token {
        Token::Identifier(name) => Some(*name),
        Token::Object => Some("object"),
        Token::Code => Some("code"),
        Token::Data => Some("data"),
        _ => None,
    }
}

fn string_bytes(value: &str) -> Vec<u8> {
    value.chars().map(|c| c as u32 as u8).collect()
}

#[cfg(test)]
#[path = "parser_tests.rs"]
mod tests;
