//! Scoping and well-formedness checks over code blocks and object trees
//!
//! The analyzer reports every error it finds instead of stopping at the
//! first one. It runs once after parsing and again after optimisation.

use crate::ast::{
    AstHashMap, AstHashSet, Block, Expression, FunctionCall, FunctionDefinition, Literal,
    LiteralKind, Name, Statement, TypedName,
};
use crate::dialect::{Dialect, DATA_BUILTINS};
use crate::object::Object;
use primitive_types::U256;
use std::collections::BTreeSet;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("Identifier \"{0}\" not found")]
    UndeclaredIdentifier(Name),

    #[error("Function \"{0}\" not found")]
    UndefinedFunction(Name),

    #[error("Name \"{0}\" already taken in this scope")]
    AlreadyDeclared(Name),

    #[error("Cannot use builtin \"{0}\" as an identifier")]
    ReservedName(Name),

    #[error("Function \"{0}\" used as a variable")]
    FunctionAsVariable(Name),

    #[error("Variable \"{0}\" used as a function")]
    VariableAsFunction(Name),

    #[error("Function \"{function}\" expects {expected} arguments but got {got}")]
    ArgumentCount {
        function: Name,
        expected: usize,
        got: usize,
    },

    #[error("Expected {expected} values but expression produces {got}")]
    ValueCount { expected: usize, got: usize },

    #[error("Top-level expressions must not return values, \"{0}\" returns {1}")]
    UnusedValue(Name, usize),

    #[error("\"{0}\" outside of a for-loop body")]
    MisplacedLoopControl(&'static str),

    #[error("\"leave\" outside of a function")]
    MisplacedLeave,

    #[error("Argument {index} of \"{function}\" must be a literal")]
    LiteralArgumentRequired { function: Name, index: usize },

    #[error("Unknown data object \"{0}\"")]
    UnknownDataObject(Name),

    #[error("Number literal {0} does not fit into 256 bits")]
    NumberTooLarge(String),

    #[error("String literal \"{0}\" is longer than 32 bytes")]
    StringTooLong(String),

    #[error("Invalid type \"{0}\"")]
    InvalidType(Name),

    #[error("Switch statement without any cases")]
    EmptySwitch,

    #[error("Duplicate case value {0}")]
    DuplicateCase(String),

    #[error("Only the last case of a switch may be the default case")]
    MisplacedDefault,

    #[error("Error in object \"{object}\": {error}")]
    InObject {
        object: Name,
        error: Box<AnalysisError>,
    },
}

pub type AnalysisResult = std::result::Result<(), Vec<AnalysisError>>;

/// Analyzes an object and all nested objects
pub fn analyze_object(dialect: &Dialect, object: &Object) -> AnalysisResult {
    let mut errors = Vec::new();
    collect_object_errors(dialect, object, &mut errors);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn collect_object_errors(dialect: &Dialect, object: &Object, errors: &mut Vec<AnalysisError>) {
    let data_names = object.qualified_data_names();
    if let Err(found) = analyze_block(dialect, &object.code, &data_names) {
        errors.extend(found.into_iter().map(|error| AnalysisError::InObject {
            object: object.name.clone(),
            error: Box::new(error),
        }));
    }
    for nested in object.objects() {
        collect_object_errors(dialect, nested, errors);
    }
}

/// Analyzes one code block with the given data names in scope
pub fn analyze_block(
    dialect: &Dialect,
    block: &Block,
    data_names: &BTreeSet<Name>,
) -> AnalysisResult {
    let mut analyzer = Analyzer {
        dialect,
        data_names,
        scopes: Vec::new(),
        errors: Vec::new(),
        loop_depth: 0,
        function_depth: 0,
    };
    analyzer.block(block);
    if analyzer.errors.is_empty() {
        Ok(())
    } else {
        Err(analyzer.errors)
    }
}

#[derive(Default)]
struct Scope {
    variables: AstHashSet<Name>,
    /// name -> (parameters, returns)
    functions: AstHashMap<Name, (usize, usize)>,
    function_boundary: bool,
}

struct Analyzer<'a> {
    dialect: &'a Dialect,
    data_names: &'a BTreeSet<Name>,
    scopes: Vec<Scope>,
    errors: Vec<AnalysisError>,
    loop_depth: usize,
    function_depth: usize,
}

impl Analyzer<'_> {
    fn error(&mut self, error: AnalysisError) {
        self.errors.push(error);
    }

    fn is_variable_visible(&self, name: &str) -> bool {
        for scope in self.scopes.iter().rev() {
            if scope.variables.contains(name) {
                return true;
            }
            if scope.function_boundary {
                return false;
            }
        }
        false
    }

    fn function_signature(&self, name: &str) -> Option<(usize, usize)> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.functions.get(name).copied())
    }

    fn is_name_taken(&self, name: &str) -> bool {
        self.scopes
            .iter()
            .any(|scope| scope.variables.contains(name) || scope.functions.contains_key(name))
    }

    fn declare_variable(&mut self, variable: &TypedName) {
        self.check_type(variable.type_name.as_deref());
        if self.dialect.is_builtin(&variable.name) {
            self.error(AnalysisError::ReservedName(variable.name.clone()));
        } else if self.is_name_taken(&variable.name) {
            self.error(AnalysisError::AlreadyDeclared(variable.name.clone()));
        }
        if let Some(scope) = self.scopes.last_mut() {
            scope.variables.insert(variable.name.clone());
        }
    }

    fn check_type(&mut self, type_name: Option<&str>) {
        if let Some(type_name) = type_name {
            if !self.dialect.is_valid_type(type_name) {
                self.error(AnalysisError::InvalidType(type_name.to_string()));
            }
        }
    }

    fn register_functions(&mut self, block: &Block) {
        for function in block.functions() {
            if self.dialect.is_builtin(&function.name) {
                self.error(AnalysisError::ReservedName(function.name.clone()));
            } else if self.is_name_taken(&function.name) {
                self.error(AnalysisError::AlreadyDeclared(function.name.clone()));
            }
            let signature = (function.parameters.len(), function.return_variables.len());
            if let Some(scope) = self.scopes.last_mut() {
                scope.functions.insert(function.name.clone(), signature);
            }
        }
    }

    fn block(&mut self, block: &Block) {
        self.scopes.push(Scope::default());
        self.register_functions(block);
        for statement in &block.statements {
            self.statement(statement);
        }
        self.scopes.pop();
    }

    fn statement(&mut self, statement: &Statement) {
        match statement {
            Statement::ExpressionStatement(expression) => {
                if let Some(count) = self.expression(expression) {
                    if count != 0 {
                        let name = match expression {
                            Expression::FunctionCall(call) => call.function_name.clone(),
                            other => other.to_string(),
                        };
                        self.error(AnalysisError::UnusedValue(name, count));
                    }
                }
            }
            Statement::Assignment {
                variable_names,
                value,
            } => {
                self.expect_values(value, variable_names.len());
                for name in variable_names {
                    self.check_variable_reference(name);
                }
            }
            Statement::VariableDeclaration { variables, value } => {
                if let Some(value) = value {
                    self.expect_values(value, variables.len());
                }
                for variable in variables {
                    self.declare_variable(variable);
                }
            }
            Statement::FunctionDefinition(function) => self.function_definition(function),
            Statement::If { condition, body } => {
                self.expect_values(condition, 1);
                self.block(body);
            }
            Statement::Switch { expression, cases } => {
                self.expect_values(expression, 1);
                self.switch_cases(cases);
            }
            Statement::ForLoop {
                pre,
                condition,
                post,
                body,
            } => {
                // Declarations in `pre` stay visible in the rest of the loop.
                self.scopes.push(Scope::default());
                self.register_functions(pre);
                let outer_loop_depth = std::mem::replace(&mut self.loop_depth, 0);
                for statement in &pre.statements {
                    self.statement(statement);
                }
                self.expect_values(condition, 1);
                self.loop_depth = outer_loop_depth + 1;
                self.block(body);
                self.loop_depth = 0;
                self.block(post);
                self.loop_depth = outer_loop_depth;
                self.scopes.pop();
            }
            Statement::Break => {
                if self.loop_depth == 0 {
                    self.error(AnalysisError::MisplacedLoopControl("break"));
                }
            }
            Statement::Continue => {
                if self.loop_depth == 0 {
                    self.error(AnalysisError::MisplacedLoopControl("continue"));
                }
            }
            Statement::Leave => {
                if self.function_depth == 0 {
                    self.error(AnalysisError::MisplacedLeave);
                }
            }
            Statement::Block(block) => self.block(block),
        }
    }

    fn switch_cases(&mut self, cases: &[crate::ast::Case]) {
        if cases.is_empty() {
            self.error(AnalysisError::EmptySwitch);
        }
        let mut seen = BTreeSet::new();
        for (i, case) in cases.iter().enumerate() {
            match &case.value {
                Some(literal) => {
                    self.literal(literal);
                    if let Some(value) = literal_value(literal) {
                        if !seen.insert(value) {
                            self.error(AnalysisError::DuplicateCase(literal.value.clone()));
                        }
                    }
                }
                None if i + 1 != cases.len() => self.error(AnalysisError::MisplacedDefault),
                None => {}
            }
            self.block(&case.body);
        }
    }

    fn function_definition(&mut self, function: &FunctionDefinition) {
        self.scopes.push(Scope {
            function_boundary: true,
            ..Scope::default()
        });
        for variable in function.parameters.iter().chain(&function.return_variables) {
            self.declare_variable(variable);
        }
        let outer_loop_depth = std::mem::replace(&mut self.loop_depth, 0);
        self.function_depth += 1;
        self.block(&function.body);
        self.function_depth -= 1;
        self.loop_depth = outer_loop_depth;
        self.scopes.pop();
    }

    fn check_variable_reference(&mut self, name: &str) {
        if self.is_variable_visible(name) {
            return;
        }
        if self.function_signature(name).is_some() || self.dialect.is_builtin(name) {
            self.error(AnalysisError::FunctionAsVariable(name.to_string()));
        } else {
            self.error(AnalysisError::UndeclaredIdentifier(name.to_string()));
        }
    }

    fn expect_values(&mut self, expression: &Expression, expected: usize) {
        if let Some(got) = self.expression(expression) {
            if got != expected {
                self.error(AnalysisError::ValueCount { expected, got });
            }
        }
    }

    /// Returns the number of values produced, `None` when unknown after an error
    fn expression(&mut self, expression: &Expression) -> Option<usize> {
        match expression {
            Expression::Literal(literal) => {
                self.literal(literal);
                Some(1)
            }
            Expression::Identifier(name) => {
                self.check_variable_reference(name);
                Some(1)
            }
            Expression::FunctionCall(call) => self.function_call(call),
        }
    }

    fn function_call(&mut self, call: &FunctionCall) -> Option<usize> {
        let name = &call.function_name;
        let signature = if let Some(builtin) = self.dialect.builtin(name) {
            Some((builtin.parameters, builtin.returns))
        } else if let Some(signature) = self.function_signature(name) {
            Some(signature)
        } else {
            if self.is_variable_visible(name) {
                self.error(AnalysisError::VariableAsFunction(name.clone()));
            } else {
                self.error(AnalysisError::UndefinedFunction(name.clone()));
            }
            None
        };

        for (index, argument) in call.arguments.iter().enumerate() {
            if self.requires_literal(name, index) {
                self.literal_argument(name, index, argument);
            } else {
                self.expect_values(argument, 1);
            }
        }

        let (parameters, returns) = signature?;
        if parameters != call.arguments.len() {
            self.error(AnalysisError::ArgumentCount {
                function: name.clone(),
                expected: parameters,
                got: call.arguments.len(),
            });
        }
        Some(returns)
    }

    fn requires_literal(&self, function: &str, index: usize) -> bool {
        self.dialect
            .builtin(function)
            .map(|builtin| builtin.requires_literal_argument(index))
            .unwrap_or(false)
    }

    fn literal_argument(&mut self, function: &str, index: usize, argument: &Expression) {
        let Expression::Literal(literal) = argument else {
            self.error(AnalysisError::LiteralArgumentRequired {
                function: function.to_string(),
                index,
            });
            return;
        };
        if DATA_BUILTINS.contains(&function) && !self.data_names.contains(&literal.value) {
            self.error(AnalysisError::UnknownDataObject(literal.value.clone()));
        }
    }

    fn literal(&mut self, literal: &Literal) {
        self.check_type(literal.type_name.as_deref());
        match literal.kind {
            LiteralKind::Number => {
                if parse_number(&literal.value).is_none() {
                    self.error(AnalysisError::NumberTooLarge(literal.value.clone()));
                }
            }
            LiteralKind::String => {
                if literal.value.chars().count() > 32 {
                    self.error(AnalysisError::StringTooLong(literal.value.clone()));
                }
            }
            LiteralKind::Boolean => {}
        }
    }
}

/// Parses a decimal or `0x` hexadecimal number literal, `None` past 256 bits
pub fn parse_number(value: &str) -> Option<U256> {
    if let Some(digits) = value.strip_prefix("0x") {
        let digits = digits.trim_start_matches('0');
        if digits.len() > 64 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        if digits.is_empty() {
            return Some(U256::zero());
        }
        U256::from_str_radix(digits, 16).ok()
    } else {
        U256::from_dec_str(value).ok()
    }
}

/// Numeric value of a literal as seen by the machine
pub fn literal_value(literal: &Literal) -> Option<U256> {
    match literal.kind {
        LiteralKind::Number => parse_number(&literal.value),
        LiteralKind::Boolean => Some(if literal.value == "true" {
            U256::one()
        } else {
            U256::zero()
        }),
        LiteralKind::String => {
            let mut bytes = [0u8; 32];
            let mut len = 0;
            for c in literal.value.chars() {
                if len == 32 {
                    return None;
                }
                bytes[len] = c as u32 as u8;
                len += 1;
            }
            Some(U256::from_big_endian(&bytes))
        }
    }
}

#[cfg(test)]
#[path = "analysis_tests.rs"]
mod tests;
