//! Optimization pipeline management

use crate::cost::CostEstimator;
use crate::passes::disambiguator::Disambiguator;
use crate::passes::function_hoister::FunctionHoister;
use crate::passes::inline::FullInliner;
use crate::passes::unused_pruner::UnusedFunctionPruner;
use crate::passes::{OptimizationPass, OptimiserContext};
use crate::settings::{OptimiserSettings, SettingsError};
use crate::size::Size;
use crate::stats::OptimizationStats;
use anyhow::{Context, Result};
use log::debug;
use std::time::Instant;
use yul_core::ast::Block;
use yul_core::{Dialect, NameDispenser, Object};

/// Optimization pipeline
///
/// The disambiguator always runs first, followed by one pass per letter of
/// `optimiser_steps`. Passes are rebuilt for every run so their counters
/// describe that run only.
pub struct OptimizationPipeline {
    settings: OptimiserSettings,
    stats: OptimizationStats,
    passes: Vec<Box<dyn OptimizationPass>>,
}

impl OptimizationPipeline {
    /// Create new optimization pipeline
    pub fn new(settings: OptimiserSettings) -> Result<Self, SettingsError> {
        settings.validate()?;
        let mut pipeline = Self {
            settings,
            stats: OptimizationStats::new(),
            passes: Vec::new(),
        };
        pipeline.configure_passes()?;
        Ok(pipeline)
    }

    pub fn settings(&self) -> &OptimiserSettings {
        &self.settings
    }

    /// Abbreviations of the configured passes, in run order
    pub fn pass_sequence(&self) -> String {
        self.passes.iter().map(|pass| pass.abbreviation()).collect()
    }

    fn configure_passes(&mut self) -> Result<(), SettingsError> {
        self.passes.clear();
        self.passes.push(Box::new(Disambiguator::new()));
        for step in self.settings.steps()? {
            let pass: Box<dyn OptimizationPass> = match step {
                'h' => Box::new(FunctionHoister::new()),
                'i' => Box::new(FullInliner::new(
                    self.settings.inliner.clone(),
                    self.settings.cost.clone(),
                )),
                'u' => Box::new(UnusedFunctionPruner::new()),
                other => return Err(SettingsError::UnknownStep(other)),
            };
            self.passes.push(pass);
        }
        Ok(())
    }

    /// Run the pipeline over an object tree, sub-objects first. All objects
    /// of the tree share one name dispenser.
    pub fn optimize(&mut self, dialect: &Dialect, object: &mut Object) -> Result<()> {
        self.stats = OptimizationStats::new();
        if !self.settings.run_yul_optimiser {
            debug!("optimiser disabled, leaving {} unchanged", object.name);
            return Ok(());
        }
        self.configure_passes()?;

        let start = Instant::now();
        let estimator = CostEstimator::new(dialect, &self.settings.cost);
        self.stats.size_before = tree_size(&estimator, object).get();

        let mut context = OptimiserContext::new(dialect, NameDispenser::for_object(dialect, object));
        self.stats.objects_optimized = optimize_object(&mut self.passes, &mut context, object)?;

        self.stats.size_after = tree_size(&estimator, object).get();
        for pass in &self.passes {
            pass.record_stats(&mut self.stats);
        }
        self.stats.optimization_time_us = start.elapsed().as_micros() as u64;
        debug!(
            "optimised {} objects: size {} -> {}",
            self.stats.objects_optimized, self.stats.size_before, self.stats.size_after
        );
        Ok(())
    }

    /// Run the pipeline over a bare code block
    pub fn optimize_block(&mut self, dialect: &Dialect, block: &mut Block) -> Result<()> {
        let mut object = Object::from_code(std::mem::take(block));
        let result = self.optimize(dialect, &mut object);
        *block = object.code;
        result
    }

    /// Get optimization statistics
    pub fn stats(&self) -> &OptimizationStats {
        &self.stats
    }
}

impl Default for OptimizationPipeline {
    fn default() -> Self {
        let settings = OptimiserSettings::default();
        let passes: Vec<Box<dyn OptimizationPass>> = vec![
            Box::new(Disambiguator::new()),
            Box::new(FunctionHoister::new()),
            Box::new(FullInliner::new(settings.inliner.clone(), settings.cost.clone())),
            Box::new(UnusedFunctionPruner::new()),
        ];
        Self {
            settings,
            stats: OptimizationStats::new(),
            passes,
        }
    }
}

fn optimize_object(
    passes: &mut [Box<dyn OptimizationPass>],
    context: &mut OptimiserContext<'_>,
    object: &mut Object,
) -> Result<usize> {
    let mut optimized = 0;
    for nested in object.objects_mut() {
        optimized += optimize_object(passes, context, nested)?;
    }
    for pass in passes.iter_mut() {
        if !pass.is_applicable(&object.code) {
            continue;
        }
        debug!("running {} on object {}", pass.name(), object.name);
        pass.run(context, &mut object.code)
            .with_context(|| format!("{} failed on object \"{}\"", pass.name(), object.name))?;
    }
    Ok(optimized + 1)
}

fn tree_size(estimator: &CostEstimator<'_>, object: &Object) -> Size {
    object
        .objects()
        .map(|nested| tree_size(estimator, nested))
        .fold(estimator.block_size(&object.code), |total, size| total + size)
}
