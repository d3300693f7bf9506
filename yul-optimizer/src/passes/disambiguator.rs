//! Makes every declared name unique across the object tree

use crate::passes::{OptimizationPass, OptimiserContext};
use crate::stats::OptimizationStats;
use anyhow::Result;
use log::debug;
use rustc_hash::FxHashMap;
use yul_core::ast::{Block, Expression, FunctionDefinition, Name, Statement, TypedName};

/// Renames each declaration whose name was already declared elsewhere.
///
/// References are resolved through the lexical scopes, so every use follows
/// its declaration to the new name. Runs before all other passes.
pub struct Disambiguator {
    renamed: usize,
}

impl Disambiguator {
    pub fn new() -> Self {
        Self { renamed: 0 }
    }
}

impl Default for Disambiguator {
    fn default() -> Self {
        Self::new()
    }
}

impl OptimizationPass for Disambiguator {
    fn name(&self) -> &str {
        "Disambiguator"
    }

    fn abbreviation(&self) -> char {
        'd'
    }

    fn run(&mut self, context: &mut OptimiserContext<'_>, code: &mut Block) -> Result<()> {
        let mut renamer = Renamer {
            context,
            scopes: Vec::new(),
            renamed: 0,
        };
        renamer.block(code);
        debug!("disambiguator renamed {} declarations", renamer.renamed);
        self.renamed += renamer.renamed;
        Ok(())
    }

    fn is_applicable(&self, _code: &Block) -> bool {
        true
    }

    fn stats(&self) -> String {
        format!("{}: {} declarations renamed", self.name(), self.renamed)
    }

    fn record_stats(&self, stats: &mut OptimizationStats) {
        stats.names_disambiguated += self.renamed;
        stats.pass_summaries.push(self.stats());
    }
}

struct Renamer<'c, 'd> {
    context: &'c mut OptimiserContext<'d>,
    scopes: Vec<FxHashMap<Name, Name>>,
    renamed: usize,
}

impl Renamer<'_, '_> {
    fn declare(&mut self, name: &mut Name) {
        let original = name.clone();
        if !self.context.declared.insert(original.clone()) {
            let fresh = self.context.dispenser.new_name(&original);
            self.context.declared.insert(fresh.clone());
            *name = fresh;
            self.renamed += 1;
        }
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(original, name.clone());
        }
    }

    fn declare_all(&mut self, names: &mut [TypedName]) {
        for typed in names {
            self.declare(&mut typed.name);
        }
    }

    fn resolve(&self, name: &mut Name) {
        for scope in self.scopes.iter().rev() {
            if let Some(renamed) = scope.get(name.as_str()) {
                if renamed != name {
                    *name = renamed.clone();
                }
                return;
            }
        }
    }

    fn register_functions(&mut self, statements: &mut [Statement]) {
        for statement in statements {
            if let Statement::FunctionDefinition(function) = statement {
                self.declare(&mut function.name);
            }
        }
    }

    fn block(&mut self, block: &mut Block) {
        self.scopes.push(FxHashMap::default());
        self.register_functions(&mut block.statements);
        for statement in &mut block.statements {
            self.statement(statement);
        }
        self.scopes.pop();
    }

    fn function(&mut self, function: &mut FunctionDefinition) {
        self.scopes.push(FxHashMap::default());
        self.declare_all(&mut function.parameters);
        self.declare_all(&mut function.return_variables);
        self.block(&mut function.body);
        self.scopes.pop();
    }

    fn statement(&mut self, statement: &mut Statement) {
        match statement {
            Statement::ExpressionStatement(expression) => self.expression(expression),
            Statement::Assignment {
                variable_names,
                value,
            } => {
                self.expression(value);
                for name in variable_names {
                    self.resolve(name);
                }
            }
            Statement::VariableDeclaration { variables, value } => {
                if let Some(value) = value {
                    self.expression(value);
                }
                self.declare_all(variables);
            }
            Statement::FunctionDefinition(function) => self.function(function),
            Statement::If { condition, body } => {
                self.expression(condition);
                self.block(body);
            }
            Statement::Switch { expression, cases } => {
                self.expression(expression);
                for case in cases {
                    self.block(&mut case.body);
                }
            }
            Statement::ForLoop {
                pre,
                condition,
                post,
                body,
            } => {
                self.scopes.push(FxHashMap::default());
                self.register_functions(&mut pre.statements);
                for statement in &mut pre.statements {
                    self.statement(statement);
                }
                self.expression(condition);
                self.block(body);
                self.block(post);
                self.scopes.pop();
            }
            Statement::Block(block) => self.block(block),
            Statement::Break | Statement::Continue | Statement::Leave => {}
        }
    }

    fn expression(&mut self, expression: &mut Expression) {
        match expression {
            Expression::FunctionCall(call) => {
                self.resolve(&mut call.function_name);
                for argument in &mut call.arguments {
                    self.expression(argument);
                }
            }
            Expression::Identifier(name) => self.resolve(name),
            Expression::Literal(_) => {}
        }
    }
}
