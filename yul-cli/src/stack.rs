//! Parse, analyze, optimize and print one source unit

use anyhow::Result;
use thiserror::Error;
use tracing::{debug, info};
use yul_core::analysis::{analyze_object, AnalysisError};
use yul_core::{yul_assert, Dialect, Language, Object};
use yul_optimizer::{OptimizationPipeline, OptimizationStats, OptimiserSettings};
use yul_parser::ParseError;

/// A problem in the user's source
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StackError {
    #[error("{source_name}: {error}")]
    Parse {
        source_name: String,
        error: ParseError,
    },

    #[error("{source_name}: {error}")]
    Analysis {
        source_name: String,
        error: AnalysisError,
    },
}

/// Drives one source unit through the toolchain.
///
/// Parsing and analysis errors are collected and reported through
/// [`AssemblyStack::errors`]. Violated internal invariants are returned
/// as [`yul_core::Error::Internal`].
pub struct AssemblyStack {
    language: Language,
    dialect: Dialect,
    settings: OptimiserSettings,
    source_name: String,
    object: Option<Object>,
    analysis_successful: bool,
    errors: Vec<StackError>,
    stats: Option<OptimizationStats>,
}

impl AssemblyStack {
    pub fn new(language: Language, settings: OptimiserSettings) -> Self {
        Self {
            language,
            dialect: language.dialect(),
            settings,
            source_name: String::new(),
            object: None,
            analysis_successful: false,
            errors: Vec::new(),
            stats: None,
        }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn dialect(&self) -> &Dialect {
        &self.dialect
    }

    /// Parses and analyzes `source`. Returns whether both succeeded.
    pub fn parse_and_analyze(&mut self, source_name: &str, source: &str) -> bool {
        self.source_name = source_name.to_string();
        self.errors.clear();
        self.object = None;
        self.analysis_successful = false;
        self.stats = None;

        let object = match yul_parser::parse(source) {
            Ok(object) => object,
            Err(error) => {
                self.errors.push(StackError::Parse {
                    source_name: self.source_name.clone(),
                    error,
                });
                return false;
            }
        };

        if let Err(errors) = analyze_object(&self.dialect, &object) {
            self.errors.extend(errors.into_iter().map(|error| StackError::Analysis {
                source_name: self.source_name.clone(),
                error,
            }));
        } else {
            self.analysis_successful = true;
        }
        debug!(
            source = %self.source_name,
            language = %self.language,
            ok = self.analysis_successful,
            "analyzed"
        );
        self.object = Some(object);
        self.analysis_successful
    }

    /// Optimizes the object tree and analyzes the result again
    pub fn optimize(&mut self) -> Result<()> {
        yul_assert!(self.analysis_successful, "Analysis was not successful.");
        let Some(object) = self.object.as_mut() else {
            return Err(yul_core::Error::internal("no parsed object to optimize").into());
        };

        let mut pipeline = OptimizationPipeline::new(self.settings.clone())?;
        pipeline.optimize(&self.dialect, object)?;
        let stats = pipeline.stats().clone();
        info!(source = %self.source_name, "{}", stats);
        self.stats = Some(stats);

        if let Err(errors) = analyze_object(&self.dialect, object) {
            let details: Vec<String> = errors.iter().map(ToString::to_string).collect();
            return Err(yul_core::Error::internal(format!(
                "Invalid source code after optimization: {}",
                details.join("; ")
            ))
            .into());
        }
        Ok(())
    }

    /// Textual form of the current object tree
    pub fn print(&self) -> Result<String> {
        Ok(self.parser_result()?.to_string())
    }

    pub fn print_json(&self) -> Result<String> {
        Ok(yul_core::printer::to_json(self.parser_result()?)?)
    }

    /// The object tree after parsing, and after optimizing once that ran
    pub fn parser_result(&self) -> Result<&Object> {
        yul_assert!(self.analysis_successful, "Analysis was not successful.");
        self.object
            .as_ref()
            .ok_or_else(|| yul_core::Error::internal("no parsed object").into())
    }

    pub fn errors(&self) -> &[StackError] {
        &self.errors
    }

    /// Statistics of the last optimizer run
    pub fn stats(&self) -> Option<&OptimizationStats> {
        self.stats.as_ref()
    }
}
