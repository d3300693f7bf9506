//! Lexer for Yul source using logos

use crate::error::ParseError;
use logos::{Lexer as LogosLexer, Logos};
use std::ops::Range;

#[derive(Logos, Debug, PartialEq, Eq, Clone)]
// Whitespace and line comments
#[logos(skip r"([ \t\n\r\f]+|//[^\n]*)")]
pub enum Token<'a> {
    /// Never returned by [`Lexer`]
    #[token("/*", block_comment)]
    BlockComment,

    // Delimiters
    #[token("{")]
    LBrace,

    #[token("}")]
    RBrace,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token(",")]
    Comma,

    #[token(":")]
    Colon,

    #[token(":=")]
    Assign,

    #[token("->")]
    Arrow,

    // Keywords
    #[token("function")]
    Function,

    #[token("let")]
    Let,

    #[token("if")]
    If,

    #[token("switch")]
    Switch,

    #[token("case")]
    Case,

    #[token("default")]
    Default,

    #[token("for")]
    For,

    #[token("break")]
    Break,

    #[token("continue")]
    Continue,

    #[token("leave")]
    Leave,

    #[token("object")]
    Object,

    #[token("code")]
    Code,

    #[token("data")]
    Data,

    #[token("true", |_| true)]
    #[token("false", |_| false)]
    Boolean(bool),

    // Literals
    #[regex(r"0x[0-9a-fA-F]+", |lex| lex.slice())]
    #[regex(r"[0-9]+", |lex| lex.slice())]
    Number(&'a str),

    #[regex(r#""([^"\\\n]|\\.)*""#, |lex| unescape(strip_quotes(lex.slice())))]
    #[regex(r#"'([^'\\\n]|\\.)*'"#, |lex| unescape(strip_quotes(lex.slice())))]
    String(String),

    #[regex(r#"hex"([0-9a-fA-F]{2})*""#, |lex| decode_hex(&lex.slice()[3..]))]
    #[regex(r#"hex'([0-9a-fA-F]{2})*'"#, |lex| decode_hex(&lex.slice()[3..]))]
    HexString(Vec<u8>),

    #[regex(r"[a-zA-Z_$][a-zA-Z0-9_$.]*", |lex| lex.slice())]
    Identifier(&'a str),
}

impl Token<'_> {
    /// Short description used in error messages
    pub fn describe(&self) -> String {
        match self {
            Token::Number(value) | Token::Identifier(value) => value.to_string(),
            Token::String(value) => format!("\"{}\"", value),
            Token::HexString(bytes) => format!("hex\"{}\"", hex::encode(bytes)),
            Token::Boolean(value) => value.to_string(),
            other => format!("{:?}", other).to_lowercase(),
        }
    }
}

/// Consumes the rest of a block comment. Unterminated comments are errors.
fn block_comment<'a>(lex: &mut LogosLexer<'a, Token<'a>>) -> Option<()> {
    let end = lex.remainder().find("*/")?;
    lex.bump(end + 2);
    Some(())
}

fn strip_quotes(slice: &str) -> &str {
    &slice[1..slice.len() - 1]
}

fn decode_hex(quoted: &str) -> Option<Vec<u8>> {
    hex::decode(strip_quotes(quoted)).ok()
}

/// Resolves escape sequences. The result holds one char per byte, so
/// `\xNN` becomes the char with code point `NN` and `\uNNNN` becomes the
/// chars of its UTF-8 encoding.
#[doc(hidden)]
pub fn unescape(content: &str) -> Option<String> {
    let mut result = String::with_capacity(content.len());
    let mut chars = content.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            push_bytes(&mut result, ch.encode_utf8(&mut [0; 4]).as_bytes());
            continue;
        }
        match chars.next()? {
            'n' => result.push('\n'),
            't' => result.push('\t'),
            'r' => result.push('\r'),
            '\\' => result.push('\\'),
            '"' => result.push('"'),
            '\'' => result.push('\''),
            '\n' => {}
            'x' => {
                let digits: String = chars.by_ref().take(2).collect();
                let byte = u8::from_str_radix(&digits, 16).ok()?;
                if digits.len() != 2 {
                    return None;
                }
                result.push(char::from(byte));
            }
            'u' => {
                let digits: String = chars.by_ref().take(4).collect();
                if digits.len() != 4 {
                    return None;
                }
                let code = u32::from_str_radix(&digits, 16).ok()?;
                let c = char::from_u32(code)?;
                push_bytes(&mut result, c.encode_utf8(&mut [0; 4]).as_bytes());
            }
            _ => return None,
        }
    }
    Some(result)
}

fn push_bytes(out: &mut String, bytes: &[u8]) {
    out.extend(bytes.iter().copied().map(char::from));
}

pub struct Lexer<'a> {
    inner: LogosLexer<'a, Token<'a>>,
    peeked: Option<(Token<'a>, Range<usize>)>,
    source_len: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            inner: Token::lexer(source),
            peeked: None,
            source_len: source.len(),
        }
    }

    fn advance(&mut self) -> Result<Option<(Token<'a>, Range<usize>)>, ParseError> {
        loop {
            match self.inner.next() {
                Some(Ok(Token::BlockComment)) => {}
                Some(Ok(token)) => return Ok(Some((token, self.inner.span()))),
                Some(Err(())) => {
                    return Err(ParseError::InvalidToken {
                        position: self.inner.span().start,
                        text: self.inner.slice().to_string(),
                    })
                }
                None => return Ok(None),
            }
        }
    }

    pub fn next_token(&mut self) -> Result<Option<Token<'a>>, ParseError> {
        Ok(self.next_spanned()?.map(|(token, _)| token))
    }

    pub fn next_spanned(&mut self) -> Result<Option<(Token<'a>, Range<usize>)>, ParseError> {
        match self.peeked.take() {
            Some(peeked) => Ok(Some(peeked)),
            None => self.advance(),
        }
    }

    pub fn peek_token(&mut self) -> Result<Option<&Token<'a>>, ParseError> {
        if self.peeked.is_none() {
            self.peeked = self.advance()?;
        }
        Ok(self.peeked.as_ref().map(|(token, _)| token))
    }

    /// Start of the peeked token, or the end of input
    pub fn position(&self) -> usize {
        match &self.peeked {
            Some((_, span)) => span.start,
            None => self.source_len,
        }
    }
}

#[cfg(test)]
#[path = "lexer_tests.rs"]
mod tests;
