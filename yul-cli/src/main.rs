//! yulc - Yul optimiser command line

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{analyze, optimize, run, OptimizerArgs};

#[derive(Parser)]
#[command(name = "yulc")]
#[command(about = "Yul optimiser and tools", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Optimise source files and print the result
    Optimize {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        #[command(flatten)]
        optimizer: OptimizerArgs,

        /// Print the object tree as JSON
        #[arg(long)]
        json: bool,

        /// Print optimiser statistics to stderr
        #[arg(long)]
        stats: bool,
    },

    /// Check source files for errors
    Analyze {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Input language (assembly, strict-assembly, yul)
        #[arg(long)]
        language: Option<yul_core::Language>,
    },

    /// Interpret a program
    Run {
        file: PathBuf,

        #[command(flatten)]
        optimizer: OptimizerArgs,

        /// Call data as hex
        #[arg(long)]
        calldata: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let default_level = if cli.debug { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // Load configuration
    let config = yul_cli::load_config(cli.config)?;

    match cli.command {
        Commands::Optimize {
            files,
            optimizer,
            json,
            stats,
        } => {
            let options = optimize::OptimizeOptions { json, stats };
            optimize::optimize_files(&files, &optimizer, &options, &config)?;
        }

        Commands::Analyze { files, language } => {
            analyze::analyze_files(&files, language.unwrap_or(config.language))?;
        }

        Commands::Run {
            file,
            optimizer,
            calldata,
        } => {
            run::run_file(&file, &optimizer, calldata.as_deref(), &config)?;
        }
    }

    Ok(())
}
