//! Individual optimisation passes

pub mod disambiguator;
pub mod function_hoister;
pub mod inline;
pub mod unused_pruner;

use crate::stats::OptimizationStats;
use anyhow::Result;
use rustc_hash::FxHashSet;
use yul_core::ast::{Block, Name};
use yul_core::{Dialect, NameDispenser};

/// State shared by all passes of one pipeline run over one object tree
pub struct OptimiserContext<'a> {
    pub dialect: &'a Dialect,
    /// The run's only source of fresh names
    pub dispenser: NameDispenser,
    /// Names already claimed by a declaration somewhere in the tree
    pub declared: FxHashSet<Name>,
}

impl<'a> OptimiserContext<'a> {
    pub fn new(dialect: &'a Dialect, dispenser: NameDispenser) -> Self {
        Self {
            dialect,
            dispenser,
            declared: FxHashSet::default(),
        }
    }
}

/// Trait for optimisation passes
pub trait OptimizationPass: Send + Sync {
    /// Name of the optimisation pass
    fn name(&self) -> &str;

    /// Step letter selecting this pass in `optimiser_steps`
    fn abbreviation(&self) -> char;

    /// Run the pass over one object's code
    fn run(&mut self, context: &mut OptimiserContext<'_>, code: &mut Block) -> Result<()>;

    /// Check if the pass is applicable
    fn is_applicable(&self, code: &Block) -> bool {
        !code.is_empty()
    }

    /// Get statistics about the pass
    fn stats(&self) -> String {
        format!("{} pass completed", self.name())
    }

    /// Fold this pass's counters into the pipeline statistics
    fn record_stats(&self, stats: &mut OptimizationStats) {
        stats.pass_summaries.push(self.stats());
    }
}
