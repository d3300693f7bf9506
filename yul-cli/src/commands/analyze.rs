//! `yulc analyze`: report parse and analysis errors without optimising

use super::read_source;
use anyhow::{bail, Result};
use std::path::PathBuf;
use yul_cli::AssemblyStack;
use yul_core::Language;
use yul_optimizer::OptimiserSettings;

pub fn analyze_files(files: &[PathBuf], language: Language) -> Result<()> {
    let mut failed = 0;
    for file in files {
        let source = read_source(file)?;
        let mut stack = AssemblyStack::new(language, OptimiserSettings::default());
        if stack.parse_and_analyze(&file.display().to_string(), &source) {
            println!("{}: ok", file.display());
        } else {
            failed += 1;
            for error in stack.errors() {
                eprintln!("{}", error);
            }
        }
    }
    if failed > 0 {
        bail!("{} of {} files have errors", failed, files.len());
    }
    Ok(())
}
