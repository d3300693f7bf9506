//! Full function inliner
//!
//! - [`InlinerDriver`] walks the code and decides per call site
//! - [`CallSiteRewriter`] produces the renamed body copy for one call
//! - [`GrowthGuard`] stops all inlining once the program grew too large
//! - [`InlineEligibility`] vetoes functions that cannot be flattened

pub mod driver;
pub mod eligibility;
pub mod guard;
pub mod rewriter;

pub use driver::InlinerDriver;
pub use eligibility::{InlineEligibility, NoEarlyExit};
pub use guard::GrowthGuard;
pub use rewriter::{CallSiteRewriter, InlinedCall};

use crate::cost::{CostEstimator, CostWeights};
use crate::passes::{OptimizationPass, OptimiserContext};
use crate::settings::InlinerSettings;
use crate::stats::{InlinerStats, OptimizationStats};
use anyhow::Result;
use yul_core::ast::Block;

/// Inlines calls to user functions under a global size budget.
///
/// Expects hoisted code with unique names; the pipeline runs the
/// disambiguator first and refuses an `i` step without an earlier `h`.
pub struct FullInliner {
    settings: InlinerSettings,
    weights: CostWeights,
    eligibility: Box<dyn InlineEligibility>,
    stats: InlinerStats,
}

impl FullInliner {
    pub fn new(settings: InlinerSettings, weights: CostWeights) -> Self {
        Self {
            settings,
            weights,
            eligibility: Box::new(NoEarlyExit),
            stats: InlinerStats::default(),
        }
    }

    pub fn inliner_stats(&self) -> &InlinerStats {
        &self.stats
    }
}

impl Default for FullInliner {
    fn default() -> Self {
        Self::new(InlinerSettings::default(), CostWeights::default())
    }
}

impl OptimizationPass for FullInliner {
    fn name(&self) -> &str {
        "FullInliner"
    }

    fn abbreviation(&self) -> char {
        'i'
    }

    fn run(&mut self, context: &mut OptimiserContext<'_>, code: &mut Block) -> Result<()> {
        let dialect = context.dialect;
        let estimator = CostEstimator::new(dialect, &self.weights);
        let driver = InlinerDriver::new(
            dialect,
            &self.settings,
            estimator,
            self.eligibility.as_ref(),
            &mut context.dispenser,
            code,
        )?;
        let stats = driver.run(code)?;
        self.stats.merge(&stats);
        Ok(())
    }

    fn is_applicable(&self, code: &Block) -> bool {
        code.functions().next().is_some()
    }

    fn stats(&self) -> String {
        format!(
            "{}: {} calls inlined ({} single-use), final size {}",
            self.name(),
            self.stats.inlined,
            self.stats.inlined_single_use,
            self.stats.final_size
        )
    }

    fn record_stats(&self, stats: &mut OptimizationStats) {
        stats.inliner.merge(&self.stats);
        stats.pass_summaries.push(self.stats());
    }
}
