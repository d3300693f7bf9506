//! Moves every function definition to the top-level block

use crate::passes::{OptimizationPass, OptimiserContext};
use crate::stats::OptimizationStats;
use anyhow::Result;
use log::debug;
use yul_core::ast::{Block, Case, Statement};

/// Hoists nested function definitions.
///
/// Requires unique names (the disambiguator runs first); functions cannot
/// see outer variables, so moving them does not change any binding.
/// Hoisted functions are appended after the top-level code in the order
/// they are found, an enclosing function before the ones nested in it.
pub struct FunctionHoister {
    hoisted: usize,
}

impl FunctionHoister {
    pub fn new() -> Self {
        Self { hoisted: 0 }
    }
}

impl Default for FunctionHoister {
    fn default() -> Self {
        Self::new()
    }
}

impl OptimizationPass for FunctionHoister {
    fn name(&self) -> &str {
        "FunctionHoister"
    }

    fn abbreviation(&self) -> char {
        'h'
    }

    fn run(&mut self, _context: &mut OptimiserContext<'_>, code: &mut Block) -> Result<()> {
        let top_level = code.functions().count();
        let mut functions = Vec::new();
        extract_functions(code, &mut functions);
        let nested = functions.len() - top_level;
        debug!("hoisted {} nested function definitions", nested);
        self.hoisted += nested;
        code.statements.extend(functions);
        Ok(())
    }

    fn stats(&self) -> String {
        format!("{}: {} functions hoisted", self.name(), self.hoisted)
    }

    fn record_stats(&self, stats: &mut OptimizationStats) {
        stats.functions_hoisted += self.hoisted;
        stats.pass_summaries.push(self.stats());
    }
}

fn extract_functions(block: &mut Block, functions: &mut Vec<Statement>) {
    let statements = std::mem::take(&mut block.statements);
    for statement in statements {
        match statement {
            Statement::FunctionDefinition(mut function) => {
                let mut nested = Vec::new();
                extract_functions(&mut function.body, &mut nested);
                functions.push(Statement::FunctionDefinition(function));
                functions.extend(nested);
            }
            mut other => {
                extract_from_statement(&mut other, functions);
                block.statements.push(other);
            }
        }
    }
}

fn extract_from_statement(statement: &mut Statement, functions: &mut Vec<Statement>) {
    match statement {
        Statement::If { body, .. } => extract_functions(body, functions),
        Statement::Switch { cases, .. } => {
            for Case { body, .. } in cases {
                extract_functions(body, functions);
            }
        }
        Statement::ForLoop { pre, post, body, .. } => {
            extract_functions(pre, functions);
            extract_functions(body, functions);
            extract_functions(post, functions);
        }
        Statement::Block(inner) => extract_functions(inner, functions),
        _ => {}
    }
}
