//! Environment management for lexical scoping

use crate::error::{InterpreterError, InterpreterResult};
use primitive_types::U256;
use rustc_hash::FxHashMap;
use yul_core::ast::{FunctionDefinition, Name};

#[derive(Debug, Default)]
struct Scope<'a> {
    variables: FxHashMap<Name, U256>,
    functions: FxHashMap<Name, &'a FunctionDefinition>,
    /// Variables of outer scopes are not visible past a function frame
    frame: bool,
}

/// Stack of block scopes.
///
/// Functions are visible from every scope below the one that defines
/// them, variables only up to the nearest function frame.
#[derive(Debug, Default)]
pub struct Environment<'a> {
    scopes: Vec<Scope<'a>>,
}

impl<'a> Environment<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter a nested block
    pub fn push_scope(&mut self) {
        self.scopes.push(Scope::default());
    }

    /// Enter a function body
    pub fn push_frame(&mut self) {
        self.scopes.push(Scope {
            frame: true,
            ..Scope::default()
        });
    }

    pub fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    pub fn define(&mut self, name: &str, value: U256) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.variables.insert(name.to_string(), value);
        }
    }

    pub fn define_function(&mut self, function: &'a FunctionDefinition) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.functions.insert(function.name.clone(), function);
        }
    }

    pub fn lookup(&self, name: &str) -> InterpreterResult<U256> {
        for scope in self.scopes.iter().rev() {
            if let Some(value) = scope.variables.get(name) {
                return Ok(*value);
            }
            if scope.frame {
                break;
            }
        }
        Err(InterpreterError::NameError(name.to_string()))
    }

    pub fn assign(&mut self, name: &str, value: U256) -> InterpreterResult<()> {
        for scope in self.scopes.iter_mut().rev() {
            if let Some(slot) = scope.variables.get_mut(name) {
                *slot = value;
                return Ok(());
            }
            if scope.frame {
                break;
            }
        }
        Err(InterpreterError::NameError(name.to_string()))
    }

    pub fn function(&self, name: &str) -> InterpreterResult<&'a FunctionDefinition> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.functions.get(name).copied())
            .ok_or_else(|| InterpreterError::UndefinedFunction(name.to_string()))
    }
}
