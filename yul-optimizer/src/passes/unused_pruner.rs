//! Removes top-level functions that the top-level code can never reach

use crate::analysis::ReferencesCounter;
use crate::passes::{OptimizationPass, OptimiserContext};
use crate::stats::OptimizationStats;
use anyhow::Result;
use log::debug;
use rustc_hash::{FxHashMap, FxHashSet};
use yul_core::ast::{Block, FunctionDefinition, Name, Statement};

pub struct UnusedFunctionPruner {
    removed: usize,
}

impl UnusedFunctionPruner {
    pub fn new() -> Self {
        Self { removed: 0 }
    }
}

impl Default for UnusedFunctionPruner {
    fn default() -> Self {
        Self::new()
    }
}

impl OptimizationPass for UnusedFunctionPruner {
    fn name(&self) -> &str {
        "UnusedFunctionPruner"
    }

    fn abbreviation(&self) -> char {
        'u'
    }

    fn run(&mut self, context: &mut OptimiserContext<'_>, code: &mut Block) -> Result<()> {
        let reachable = reachable_functions(context, code);
        let before = code.statements.len();
        code.statements.retain(|statement| match statement {
            Statement::FunctionDefinition(function) => reachable.contains(&function.name),
            _ => true,
        });
        let removed = before - code.statements.len();
        debug!("pruned {} unreachable functions", removed);
        self.removed += removed;
        Ok(())
    }

    fn stats(&self) -> String {
        format!("{}: {} functions removed", self.name(), self.removed)
    }

    fn record_stats(&self, stats: &mut OptimizationStats) {
        stats.functions_pruned += self.removed;
        stats.pass_summaries.push(self.stats());
    }
}

fn reachable_functions(context: &OptimiserContext<'_>, code: &Block) -> FxHashSet<Name> {
    let functions: FxHashMap<&str, &FunctionDefinition> = code
        .functions()
        .map(|function| (function.name.as_str(), function))
        .collect();

    let entry = Block::new(
        code.statements
            .iter()
            .filter(|statement| !statement.is_function_definition())
            .cloned()
            .collect(),
    );
    let mut worklist: Vec<Name> = ReferencesCounter::count_calls(context.dialect, &entry)
        .into_keys()
        .collect();
    let mut reachable = FxHashSet::default();
    while let Some(name) = worklist.pop() {
        if !reachable.insert(name.clone()) {
            continue;
        }
        if let Some(function) = functions.get(name.as_str()) {
            worklist.extend(
                ReferencesCounter::count_calls(context.dialect, &function.body).into_keys(),
            );
        }
    }
    reachable
}
