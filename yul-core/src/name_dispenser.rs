//! Fresh-name generation for one compilation unit

use crate::ast::{Block, FunctionCall, FunctionDefinition, Name, Statement};
use crate::dialect::Dialect;
use crate::object::Object;
use crate::visitor::{walk_statement, Visitor};
use rustc_hash::FxHashSet;

/// Hands out names that collide with nothing already used in the unit.
///
/// One dispenser is owned by exactly one pipeline run. The counter only
/// grows, so two names handed out by the same dispenser never coincide.
#[derive(Debug, Clone, Default)]
pub struct NameDispenser {
    used: FxHashSet<Name>,
    counter: u64,
}

impl NameDispenser {
    pub fn new(dialect: &Dialect) -> Self {
        let mut used = FxHashSet::default();
        used.extend(dialect.builtin_names().map(str::to_string));
        Self { used, counter: 0 }
    }

    /// Dispenser that avoids every name used anywhere in the object tree
    pub fn for_object(dialect: &Dialect, object: &Object) -> Self {
        let mut dispenser = Self::new(dialect);
        dispenser.mark_object(object);
        dispenser
    }

    pub fn for_block(dialect: &Dialect, block: &Block) -> Self {
        let mut dispenser = Self::new(dialect);
        dispenser.mark_block(block);
        dispenser
    }

    pub fn mark_object(&mut self, object: &Object) {
        self.mark_block(&object.code);
        for nested in object.objects() {
            self.mark_object(nested);
        }
    }

    pub fn mark_block(&mut self, block: &Block) {
        let mut collector = NameCollector(&mut self.used);
        collector.visit_block(block);
    }

    pub fn is_used(&self, name: &str) -> bool {
        self.used.contains(name)
    }

    /// A never-seen name of the form `<hint>_<n>`
    pub fn new_name(&mut self, hint: &str) -> Name {
        loop {
            self.counter += 1;
            let candidate = format!("{}_{}", hint, self.counter);
            if self.used.insert(candidate.clone()) {
                return candidate;
            }
        }
    }

    /// Number of names handed out so far, rejected candidates included
    pub fn counter(&self) -> u64 {
        self.counter
    }
}

struct NameCollector<'a>(&'a mut FxHashSet<Name>);

impl Visitor for NameCollector<'_> {
    fn visit_statement(&mut self, statement: &Statement) {
        if let Statement::VariableDeclaration { variables, .. } = statement {
            self.0.extend(variables.iter().map(|v| v.name.clone()));
        }
        if let Statement::Assignment { variable_names, .. } = statement {
            self.0.extend(variable_names.iter().cloned());
        }
        walk_statement(self, statement);
    }

    fn visit_function_definition(&mut self, function: &FunctionDefinition) {
        self.0.insert(function.name.clone());
        self.0.extend(function.parameters.iter().map(|p| p.name.clone()));
        self.0.extend(function.return_variables.iter().map(|r| r.name.clone()));
        self.visit_block(&function.body);
    }

    fn visit_function_call(&mut self, call: &FunctionCall) {
        self.0.insert(call.function_name.clone());
        for argument in &call.arguments {
            self.visit_expression(argument);
        }
    }

    fn visit_identifier(&mut self, name: &str) {
        self.0.insert(name.to_string());
    }
}
