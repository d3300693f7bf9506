//! Program analyses consumed by the optimisation passes

use rustc_hash::{FxHashMap, FxHashSet};
use yul_core::ast::{Block, Expression, FunctionCall, FunctionDefinition, Name, Statement};
use yul_core::visitor::{walk_statement, Visitor};
use yul_core::Dialect;

/// Counts calls per user-defined function
pub struct ReferencesCounter<'a> {
    dialect: &'a Dialect,
    counts: FxHashMap<Name, usize>,
}

impl<'a> ReferencesCounter<'a> {
    /// Call counts of every user function called anywhere in `block`
    pub fn count_calls(dialect: &'a Dialect, block: &Block) -> FxHashMap<Name, usize> {
        let mut counter = Self {
            dialect,
            counts: FxHashMap::default(),
        };
        counter.visit_block(block);
        counter.counts
    }
}

impl Visitor for ReferencesCounter<'_> {
    fn visit_function_call(&mut self, call: &FunctionCall) {
        if !self.dialect.is_builtin(&call.function_name) {
            *self.counts.entry(call.function_name.clone()).or_insert(0) += 1;
        }
        for argument in &call.arguments {
            self.visit_expression(argument);
        }
    }
}

/// Variables that are targets of an assignment anywhere in the block
pub fn assigned_variables(block: &Block) -> FxHashSet<Name> {
    struct Collector(FxHashSet<Name>);

    impl Visitor for Collector {
        fn visit_statement(&mut self, statement: &Statement) {
            if let Statement::Assignment { variable_names, .. } = statement {
                self.0.extend(variable_names.iter().cloned());
            }
            walk_statement(self, statement);
        }
    }

    let mut collector = Collector(FxHashSet::default());
    collector.visit_block(block);
    collector.0
}

/// Number of identifier references per name. Assignment targets do not count.
pub fn referenced_variables(block: &Block) -> FxHashMap<Name, usize> {
    struct Collector(FxHashMap<Name, usize>);

    impl Visitor for Collector {
        fn visit_identifier(&mut self, name: &str) {
            *self.0.entry(name.to_string()).or_insert(0) += 1;
        }
    }

    let mut collector = Collector(FxHashMap::default());
    collector.visit_block(block);
    collector.0
}

/// Whether the function body can exit early through `leave`
pub fn contains_leave(function: &FunctionDefinition) -> bool {
    struct Finder(bool);

    impl Visitor for Finder {
        fn visit_statement(&mut self, statement: &Statement) {
            if matches!(statement, Statement::Leave) {
                self.0 = true;
            }
            walk_statement(self, statement);
        }

        fn visit_function_definition(&mut self, _function: &FunctionDefinition) {}
    }

    let mut finder = Finder(false);
    finder.visit_block(&function.body);
    finder.0
}

struct DefinitionFinder(bool);

impl Visitor for DefinitionFinder {
    fn visit_function_definition(&mut self, _function: &FunctionDefinition) {
        self.0 = true;
    }
}

/// Whether a function definition occurs anywhere inside the block
pub fn contains_function_definition(block: &Block) -> bool {
    let mut finder = DefinitionFinder(false);
    finder.visit_block(block);
    finder.0
}

/// Whether the statement is or contains a function definition
pub fn statement_contains_function_definition(statement: &Statement) -> bool {
    let mut finder = DefinitionFinder(false);
    finder.visit_statement(statement);
    finder.0
}

/// Side-effect classification of expressions
pub struct SideEffects<'a> {
    dialect: &'a Dialect,
}

impl<'a> SideEffects<'a> {
    pub fn new(dialect: &'a Dialect) -> Self {
        Self { dialect }
    }

    /// Can be reordered, duplicated or dropped: only literals, identifiers and
    /// movable builtins. User calls are never movable.
    pub fn is_movable(&self, expression: &Expression) -> bool {
        match expression {
            Expression::Literal(_) | Expression::Identifier(_) => true,
            Expression::FunctionCall(call) => {
                self.dialect
                    .builtin(&call.function_name)
                    .map(|builtin| builtin.is_movable())
                    .unwrap_or(false)
                    && call.arguments.iter().all(|argument| self.is_movable(argument))
            }
        }
    }
}

#[cfg(test)]
#[path = "analysis_tests.rs"]
mod tests;
