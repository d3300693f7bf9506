//! `yulc optimize`: optimise and print one or more source files

use super::{read_source, OptimizerArgs};
use anyhow::{bail, Result};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{error, info};
use yul_cli::{AssemblyStack, Config};
use yul_core::Language;
use yul_optimizer::OptimiserSettings;

pub struct OptimizeOptions {
    pub json: bool,
    pub stats: bool,
}

/// Files are compiled in parallel, each with its own stack. Output is
/// printed in the order the files were given.
pub fn optimize_files(
    files: &[PathBuf],
    args: &OptimizerArgs,
    options: &OptimizeOptions,
    config: &Config,
) -> Result<()> {
    let (language, settings) = args.resolve(config)?;
    let results: Vec<Result<String>> = files
        .par_iter()
        .map(|file| optimize_file(file, language, &settings, options))
        .collect();

    let mut failed = 0;
    for (file, result) in files.iter().zip(results) {
        match result {
            Ok(output) => println!("{}", output),
            Err(err) => {
                failed += 1;
                error!("{}: {:#}", file.display(), err);
                eprintln!("{}", err);
            }
        }
    }
    if failed > 0 {
        bail!("{} of {} files failed", failed, files.len());
    }
    Ok(())
}

fn optimize_file(
    file: &Path,
    language: Language,
    settings: &OptimiserSettings,
    options: &OptimizeOptions,
) -> Result<String> {
    let source = read_source(file)?;
    let name = file.display().to_string();
    let mut stack = AssemblyStack::new(language, settings.clone());
    if !stack.parse_and_analyze(&name, &source) {
        let messages: Vec<String> = stack.errors().iter().map(ToString::to_string).collect();
        bail!("{}", messages.join("\n"));
    }
    stack.optimize()?;

    if let Some(stats) = stack.stats() {
        info!(file = %name, inlined = stats.inliner.inlined, "optimized");
        if options.stats {
            eprintln!("{}:\n{}", name, stats);
        }
    }
    if options.json {
        stack.print_json()
    } else {
        stack.print()
    }
}
