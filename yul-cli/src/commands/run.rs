//! `yulc run`: interpret a program, optionally after optimising it

use super::{read_source, OptimizerArgs};
use anyhow::{anyhow, bail, Context, Result};
use std::path::Path;
use tracing::debug;
use yul_cli::{AssemblyStack, Config};
use yul_interpreter::{execute_object, InterpreterOptions};

pub fn run_file(file: &Path, args: &OptimizerArgs, calldata: Option<&str>, config: &Config) -> Result<()> {
    let (language, settings) = args.resolve(config)?;
    let source = read_source(file)?;
    let mut stack = AssemblyStack::new(language, settings);
    if !stack.parse_and_analyze(&file.display().to_string(), &source) {
        for error in stack.errors() {
            eprintln!("{}", error);
        }
        bail!("{} has errors", file.display());
    }
    stack.optimize()?;

    let calldata = match calldata {
        Some(text) => hex::decode(text.trim_start_matches("0x")).context("decoding calldata")?,
        None => Vec::new(),
    };
    let options = InterpreterOptions {
        max_steps: config.interpreter.max_steps,
        max_call_depth: config.interpreter.max_call_depth,
        calldata,
    };
    debug!(?options, "interpreting {}", file.display());
    let (termination, state) = execute_object(stack.dialect(), stack.parser_result()?, options)
        .map_err(|err| anyhow!("execution failed: {}", err))?;

    println!("{}", termination);
    for (key, value) in state.storage() {
        println!("storage[{:#x}] = {:#x}", key, value);
    }
    for (index, log) in state.logs().iter().enumerate() {
        let topics: Vec<String> = log.topics.iter().map(|topic| format!("{:#x}", topic)).collect();
        println!("log{} [{}] 0x{}", index, topics.join(", "), hex::encode(&log.data));
    }
    Ok(())
}
