//! Deterministic textual form of Yul code and objects

use crate::ast::{
    Block, Case, Expression, FunctionCall, FunctionDefinition, Literal, LiteralKind, Statement,
    TypedName,
};
use crate::object::{Object, ObjectNode};
use std::fmt::{self, Write};

const INDENT: &str = "    ";

struct Printer {
    out: String,
    depth: usize,
}

impl Printer {
    fn new() -> Self {
        Self {
            out: String::new(),
            depth: 0,
        }
    }

    fn line(&mut self, text: &str) {
        for _ in 0..self.depth {
            self.out.push_str(INDENT);
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    /// Writes `header {` ... `}` or `header { }` for empty blocks
    fn block(&mut self, header: &str, block: &Block) {
        let open = if header.is_empty() {
            "{".to_string()
        } else {
            format!("{} {{", header)
        };
        if block.is_empty() {
            self.line(&format!("{} }}", open));
            return;
        }
        self.line(&open);
        self.depth += 1;
        for statement in &block.statements {
            self.statement(statement);
        }
        self.depth -= 1;
        self.line("}");
    }

    fn statement(&mut self, statement: &Statement) {
        match statement {
            Statement::ExpressionStatement(expression) => self.line(&expression.to_string()),
            Statement::Assignment {
                variable_names,
                value,
            } => self.line(&format!("{} := {}", variable_names.join(", "), value)),
            Statement::VariableDeclaration { variables, value } => {
                let names = typed_names(variables);
                match value {
                    Some(value) => self.line(&format!("let {} := {}", names, value)),
                    None => self.line(&format!("let {}", names)),
                }
            }
            Statement::FunctionDefinition(function) => self.function(function),
            Statement::If { condition, body } => self.block(&format!("if {}", condition), body),
            Statement::Switch { expression, cases } => {
                self.line(&format!("switch {}", expression));
                for Case { value, body } in cases {
                    let header = match value {
                        Some(literal) => format!("case {}", literal),
                        None => "default".to_string(),
                    };
                    self.block(&header, body);
                }
            }
            Statement::ForLoop {
                pre,
                condition,
                post,
                body,
            } => {
                self.line("for");
                self.depth += 1;
                self.block("", pre);
                self.line(&condition.to_string());
                self.block("", post);
                self.depth -= 1;
                self.block("", body);
            }
            Statement::Break => self.line("break"),
            Statement::Continue => self.line("continue"),
            Statement::Leave => self.line("leave"),
            Statement::Block(block) => self.block("", block),
        }
    }

    fn function(&mut self, function: &FunctionDefinition) {
        let mut header = format!(
            "function {}({})",
            function.name,
            typed_names(&function.parameters)
        );
        if !function.return_variables.is_empty() {
            let _ = write!(header, " -> {}", typed_names(&function.return_variables));
        }
        self.block(&header, &function.body);
    }

    fn object(&mut self, object: &Object) {
        self.line(&format!("object \"{}\" {{", object.name));
        self.depth += 1;
        self.block("code", &object.code);
        for node in &object.sub_objects {
            match node {
                ObjectNode::Object(nested) => self.object(nested),
                ObjectNode::Data(data) => self.line(&format!(
                    "data \"{}\" hex\"{}\"",
                    data.name,
                    hex_encode(&data.bytes)
                )),
            }
        }
        self.depth -= 1;
        self.line("}");
    }
}

fn typed_names(names: &[TypedName]) -> String {
    names
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().fold(String::new(), |mut out, byte| {
        let _ = write!(out, "{:02x}", byte);
        out
    })
}

/// Quotes a string literal. Literal values hold one char per byte, so
/// anything outside printable ASCII is written as a `\xNN` escape.
fn escape_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            ' '..='~' => out.push(c),
            other => {
                let _ = write!(out, "\\x{:02x}", other as u32 & 0xff);
            }
        }
    }
    out.push('"');
    out
}

impl fmt::Display for TypedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.type_name {
            Some(type_name) => write!(f, "{}:{}", self.name, type_name),
            None => f.write_str(&self.name),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            LiteralKind::String => f.write_str(&escape_string(&self.value))?,
            LiteralKind::Number | LiteralKind::Boolean => f.write_str(&self.value)?,
        }
        if let Some(type_name) = &self.type_name {
            write!(f, ":{}", type_name)?;
        }
        Ok(())
    }
}

impl fmt::Display for FunctionCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.function_name)?;
        for (i, argument) in self.arguments.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", argument)?;
        }
        f.write_str(")")
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::FunctionCall(call) => call.fmt(f),
            Expression::Identifier(name) => f.write_str(name),
            Expression::Literal(literal) => literal.fmt(f),
        }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut printer = Printer::new();
        printer.statement(self);
        f.write_str(printer.out.trim_end())
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut printer = Printer::new();
        printer.block("", self);
        f.write_str(printer.out.trim_end())
    }
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut printer = Printer::new();
        printer.object(self);
        f.write_str(printer.out.trim_end())
    }
}

/// JSON form of an object tree
pub fn to_json(object: &Object) -> serde_json::Result<String> {
    serde_json::to_string_pretty(object)
}
