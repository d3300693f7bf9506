//! AST representation of Yul code blocks
//!
//! The tree is owned top-down: every statement owns its sub-expressions and
//! nested blocks, so a copied subtree never aliases the original. Passes
//! mutate it in place.

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

/// Type alias for the HashMap implementation used by AST consumers
pub type AstHashMap<K, V> = FxHashMap<K, V>;

/// Type alias for the HashSet implementation used by AST consumers
pub type AstHashSet<T> = FxHashSet<T>;

/// Identifier name. Names are unique per declaration after disambiguation.
pub type Name = String;

/// A declared variable, parameter or return variable with an optional type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypedName {
    pub name: Name,
    pub type_name: Option<Name>,
}

impl TypedName {
    pub fn new(name: impl Into<Name>) -> Self {
        Self {
            name: name.into(),
            type_name: None,
        }
    }

    pub fn typed(name: impl Into<Name>, type_name: impl Into<Name>) -> Self {
        Self {
            name: name.into(),
            type_name: Some(type_name.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LiteralKind {
    Number,
    Boolean,
    String,
}

/// Literal values keep their source spelling; evaluation decodes them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Literal {
    pub kind: LiteralKind,
    pub value: String,
    pub type_name: Option<Name>,
}

impl Literal {
    pub fn number(value: impl Into<String>) -> Self {
        Self {
            kind: LiteralKind::Number,
            value: value.into(),
            type_name: None,
        }
    }

    pub fn boolean(value: bool) -> Self {
        Self {
            kind: LiteralKind::Boolean,
            value: value.to_string(),
            type_name: None,
        }
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self {
            kind: LiteralKind::String,
            value: value.into(),
            type_name: None,
        }
    }

    pub fn with_type(mut self, type_name: Option<Name>) -> Self {
        self.type_name = type_name;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FunctionCall {
    pub function_name: Name,
    pub arguments: Vec<Expression>,
}

impl FunctionCall {
    pub fn new(function_name: impl Into<Name>, arguments: Vec<Expression>) -> Self {
        Self {
            function_name: function_name.into(),
            arguments,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Expression {
    FunctionCall(FunctionCall),
    Identifier(Name),
    Literal(Literal),
}

impl Expression {
    pub fn call(function_name: impl Into<Name>, arguments: Vec<Expression>) -> Self {
        Expression::FunctionCall(FunctionCall::new(function_name, arguments))
    }

    pub fn identifier(name: impl Into<Name>) -> Self {
        Expression::Identifier(name.into())
    }

    pub fn number(value: impl Into<String>) -> Self {
        Expression::Literal(Literal::number(value))
    }

    pub fn as_call(&self) -> Option<&FunctionCall> {
        match self {
            Expression::FunctionCall(call) => Some(call),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Block {
    pub statements: Vec<Statement>,
}

impl Block {
    pub fn new(statements: Vec<Statement>) -> Self {
        Self { statements }
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Function definitions directly contained in this block
    pub fn functions(&self) -> impl Iterator<Item = &FunctionDefinition> {
        self.statements.iter().filter_map(|statement| match statement {
            Statement::FunctionDefinition(function) => Some(function),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FunctionDefinition {
    pub name: Name,
    pub parameters: Vec<TypedName>,
    pub return_variables: Vec<TypedName>,
    pub body: Block,
}

/// One `case` of a switch. `value == None` is the `default` case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Case {
    pub value: Option<Literal>,
    pub body: Block,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Statement {
    ExpressionStatement(Expression),
    Assignment {
        variable_names: Vec<Name>,
        value: Expression,
    },
    VariableDeclaration {
        variables: Vec<TypedName>,
        value: Option<Expression>,
    },
    FunctionDefinition(FunctionDefinition),
    If {
        condition: Expression,
        body: Block,
    },
    Switch {
        expression: Expression,
        cases: Vec<Case>,
    },
    ForLoop {
        pre: Block,
        condition: Expression,
        post: Block,
        body: Block,
    },
    Break,
    Continue,
    Leave,
    Block(Block),
}

impl Statement {
    pub fn declare(variables: Vec<TypedName>, value: Option<Expression>) -> Self {
        Statement::VariableDeclaration { variables, value }
    }

    pub fn assign(variable_names: Vec<Name>, value: Expression) -> Self {
        Statement::Assignment {
            variable_names,
            value,
        }
    }

    pub fn is_function_definition(&self) -> bool {
        matches!(self, Statement::FunctionDefinition(_))
    }

    /// The expression evaluated by this statement itself, if any.
    /// Nested blocks are not included.
    pub fn direct_expression(&self) -> Option<&Expression> {
        match self {
            Statement::ExpressionStatement(expression) => Some(expression),
            Statement::Assignment { value, .. } => Some(value),
            Statement::VariableDeclaration { value, .. } => value.as_ref(),
            Statement::If { condition, .. } => Some(condition),
            Statement::Switch { expression, .. } => Some(expression),
            Statement::ForLoop { condition, .. } => Some(condition),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "ast_tests.rs"]
mod tests;
