//! Subcommand implementations

pub mod analyze;
pub mod optimize;
pub mod run;

use anyhow::{Context, Result};
use clap::Args;
use std::path::Path;
use yul_cli::Config;
use yul_core::Language;
use yul_optimizer::{OptimizationLevel, OptimiserSettings};

/// Flags that override the optimizer section of the config file
#[derive(Args, Debug, Clone, Default)]
pub struct OptimizerArgs {
    /// Input language (assembly, strict-assembly, yul)
    #[arg(long)]
    pub language: Option<Language>,

    /// Preset to start from instead of the config file's settings
    #[arg(short = 'O', long, value_parser = parse_level)]
    pub level: Option<OptimizationLevel>,

    /// Optimiser step sequence, e.g. "hiu"
    #[arg(long)]
    pub steps: Option<String>,

    /// Disable the optimiser entirely
    #[arg(long)]
    pub no_optimize: bool,

    #[arg(long)]
    pub max_recursion_depth: Option<usize>,

    #[arg(long)]
    pub global_size_threshold: Option<u64>,

    #[arg(long)]
    pub per_site_multiplier: Option<u64>,
}

impl OptimizerArgs {
    /// Language and optimiser settings after applying the flags to `config`
    pub fn resolve(&self, config: &Config) -> Result<(Language, OptimiserSettings)> {
        let language = self.language.unwrap_or(config.language);
        let mut settings = match self.level {
            Some(level) => OptimiserSettings::for_level(level),
            None => config.optimizer.clone(),
        };
        if let Some(steps) = &self.steps {
            settings.optimiser_steps = steps.clone();
        }
        if self.no_optimize {
            settings.run_yul_optimiser = false;
        }
        if let Some(depth) = self.max_recursion_depth {
            settings.inliner.max_recursion_depth = depth;
        }
        if let Some(threshold) = self.global_size_threshold {
            settings.inliner.global_size_threshold = threshold;
        }
        if let Some(multiplier) = self.per_site_multiplier {
            settings.inliner.per_site_size_multiplier = multiplier;
        }
        settings.validate()?;
        Ok((language, settings))
    }
}

fn parse_level(value: &str) -> Result<OptimizationLevel, String> {
    match value {
        "0" | "none" => Ok(OptimizationLevel::None),
        "1" | "minimal" => Ok(OptimizationLevel::Minimal),
        "2" | "standard" => Ok(OptimizationLevel::Standard),
        "3" | "full" => Ok(OptimizationLevel::Full),
        other => Err(format!("unknown optimization level: {}", other)),
    }
}

pub(crate) fn read_source(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}
