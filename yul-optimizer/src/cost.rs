//! Code-size estimation
//!
//! Sizes are structural: every node kind has a weight and a subtree's size
//! is the sum of its nodes. Builtin calls cost what the dialect says, user
//! calls cost a fixed overhead. [`TransitiveCost`] additionally charges
//! user calls with the (cached) size of the callee, which is what inlining
//! a function ultimately expands to.

use crate::size::Size;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use std::rc::Rc;
use yul_core::ast::{Block, Expression, FunctionCall, FunctionDefinition, Name, Statement};
use yul_core::Dialect;

/// Node weights used by the estimator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostWeights {
    /// Charged for every call to a user-defined function
    pub call_overhead: u64,
    pub literal: u64,
    pub identifier: u64,
    /// Declarations, assignments and function definitions
    pub statement: u64,
    /// `if` statements and each `switch` case
    pub branch: u64,
    #[serde(rename = "loop")]
    pub loop_: u64,
    /// `break`, `continue` and `leave`
    pub jump: u64,
}

impl Default for CostWeights {
    fn default() -> Self {
        Self {
            call_overhead: 4,
            literal: 1,
            identifier: 1,
            statement: 1,
            branch: 2,
            loop_: 3,
            jump: 1,
        }
    }
}

/// Structural size of code
pub struct CostEstimator<'a> {
    dialect: &'a Dialect,
    weights: &'a CostWeights,
}

impl<'a> CostEstimator<'a> {
    pub fn new(dialect: &'a Dialect, weights: &'a CostWeights) -> Self {
        Self { dialect, weights }
    }

    pub fn weights(&self) -> &CostWeights {
        self.weights
    }

    pub fn block_size(&self, block: &Block) -> Size {
        self.block_size_with(block, &mut |_, _| None)
    }

    pub fn statement_size(&self, statement: &Statement) -> Size {
        self.statement_size_with(statement, &mut |_, _| None)
    }

    pub fn statements_size(&self, statements: &[Statement]) -> Size {
        statements.iter().map(|s| self.statement_size(s)).sum()
    }

    pub fn expression_size(&self, expression: &Expression) -> Size {
        self.expression_size_with(expression, &mut |_, _| None)
    }

    pub fn call_size(&self, call: &FunctionCall) -> Size {
        self.call_size_with(call, &mut |_, _| None)
    }

    pub fn function_size(&self, function: &FunctionDefinition) -> Size {
        Size::new(self.weights.statement) + self.block_size(&function.body)
    }

    // The `_with` variants let the caller override what a user call costs.
    // Returning `None` falls back to the fixed call overhead.

    fn block_size_with<F>(&self, block: &Block, user_call: &mut F) -> Size
    where
        F: FnMut(&Self, &FunctionCall) -> Option<Size>,
    {
        block
            .statements
            .iter()
            .map(|statement| self.statement_size_with(statement, user_call))
            .sum()
    }

    fn statement_size_with<F>(&self, statement: &Statement, user_call: &mut F) -> Size
    where
        F: FnMut(&Self, &FunctionCall) -> Option<Size>,
    {
        let w = self.weights;
        match statement {
            Statement::ExpressionStatement(expression) => {
                self.expression_size_with(expression, user_call)
            }
            Statement::Assignment { value, .. } => {
                Size::new(w.statement) + self.expression_size_with(value, user_call)
            }
            Statement::VariableDeclaration { value, .. } => {
                let value = match value {
                    Some(value) => self.expression_size_with(value, user_call),
                    None => Size::ZERO,
                };
                Size::new(w.statement) + value
            }
            Statement::FunctionDefinition(function) => {
                Size::new(w.statement) + self.block_size_with(&function.body, user_call)
            }
            Statement::If { condition, body } => {
                Size::new(w.branch)
                    + self.expression_size_with(condition, user_call)
                    + self.block_size_with(body, user_call)
            }
            Statement::Switch { expression, cases } => {
                let mut size = Size::new(w.branch) + self.expression_size_with(expression, user_call);
                for case in cases {
                    size += Size::new(w.branch) + self.block_size_with(&case.body, user_call);
                }
                size
            }
            Statement::ForLoop {
                pre,
                condition,
                post,
                body,
            } => {
                Size::new(w.loop_)
                    + self.block_size_with(pre, user_call)
                    + self.expression_size_with(condition, user_call)
                    + self.block_size_with(post, user_call)
                    + self.block_size_with(body, user_call)
            }
            Statement::Break | Statement::Continue | Statement::Leave => Size::new(w.jump),
            Statement::Block(block) => self.block_size_with(block, user_call),
        }
    }

    fn expression_size_with<F>(&self, expression: &Expression, user_call: &mut F) -> Size
    where
        F: FnMut(&Self, &FunctionCall) -> Option<Size>,
    {
        match expression {
            Expression::Literal(_) => Size::new(self.weights.literal),
            Expression::Identifier(_) => Size::new(self.weights.identifier),
            Expression::FunctionCall(call) => self.call_size_with(call, user_call),
        }
    }

    fn call_size_with<F>(&self, call: &FunctionCall, user_call: &mut F) -> Size
    where
        F: FnMut(&Self, &FunctionCall) -> Option<Size>,
    {
        let own = match self.dialect.builtin(&call.function_name) {
            Some(builtin) => Size::new(builtin.cost),
            None => user_call(self, call).unwrap_or(Size::new(self.weights.call_overhead)),
        };
        call.arguments
            .iter()
            .fold(own, |size, argument| size + self.expression_size_with(argument, user_call))
    }
}

/// Per-function cache of fully expanded sizes.
///
/// A function's transitive cost is its body size with every user call
/// replaced by the callee's transitive cost. Functions on a call cycle
/// expand without bound and are reported as [`Size::UNBOUNDED`].
#[derive(Debug, Default)]
pub struct TransitiveCost {
    cache: FxHashMap<Name, Size>,
    in_progress: FxHashSet<Name>,
}

impl TransitiveCost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cost(
        &mut self,
        estimator: &CostEstimator<'_>,
        functions: &FxHashMap<Name, Rc<FunctionDefinition>>,
        name: &str,
    ) -> Size {
        if let Some(size) = self.cache.get(name) {
            return *size;
        }
        if self.in_progress.contains(name) {
            return Size::UNBOUNDED;
        }
        let Some(function) = functions.get(name).cloned() else {
            // Unknown callees are charged like an opaque call.
            return Size::new(estimator.weights().call_overhead);
        };
        self.in_progress.insert(name.to_string());
        let size = estimator.block_size_with(&function.body, &mut |estimator, call| {
            Some(self.cost(estimator, functions, &call.function_name))
        });
        self.in_progress.remove(name);
        self.cache.insert(name.to_string(), size);
        size
    }
}

#[cfg(test)]
#[path = "cost_tests.rs"]
mod tests;
