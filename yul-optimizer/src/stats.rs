//! Optimisation statistics

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Why the inliner left a call in place
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The callee failed the eligibility predicate
    Ineligible,
    /// The callee already occurs often enough in the inline chain
    RecursionDepth,
    /// The global growth guard was closed
    GuardClosed,
    /// Expanded size exceeds the per-site budget
    TooLarge,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlinerStats {
    pub inlined: usize,
    pub inlined_single_use: usize,
    /// Arguments bound to a temporary ahead of an inlined call
    pub hoisted_arguments: usize,
    pub skipped: BTreeMap<SkipReason, usize>,
    pub guard_tripped: bool,
    /// Growth-guard accumulator when the last run finished
    pub final_size: u64,
}

impl InlinerStats {
    pub fn skip(&mut self, reason: SkipReason) {
        *self.skipped.entry(reason).or_insert(0) += 1;
    }

    pub fn skipped(&self, reason: SkipReason) -> usize {
        self.skipped.get(&reason).copied().unwrap_or(0)
    }

    pub fn merge(&mut self, other: &InlinerStats) {
        self.inlined += other.inlined;
        self.inlined_single_use += other.inlined_single_use;
        self.hoisted_arguments += other.hoisted_arguments;
        for (reason, count) in &other.skipped {
            *self.skipped.entry(*reason).or_insert(0) += count;
        }
        self.guard_tripped |= other.guard_tripped;
        self.final_size = other.final_size;
    }
}

/// Statistics of one pipeline run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptimizationStats {
    pub size_before: u64,
    pub size_after: u64,
    pub objects_optimized: usize,
    pub names_disambiguated: usize,
    pub functions_hoisted: usize,
    pub functions_pruned: usize,
    pub inliner: InlinerStats,
    pub optimization_time_us: u64,
    pub pass_summaries: Vec<String>,
}

impl OptimizationStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn merge(&mut self, other: &OptimizationStats) {
        self.size_before += other.size_before;
        self.size_after += other.size_after;
        self.objects_optimized += other.objects_optimized;
        self.names_disambiguated += other.names_disambiguated;
        self.functions_hoisted += other.functions_hoisted;
        self.functions_pruned += other.functions_pruned;
        self.inliner.merge(&other.inliner);
        self.optimization_time_us += other.optimization_time_us;
        self.pass_summaries.extend(other.pass_summaries.iter().cloned());
    }

    /// Relative size change in percent, negative when the code shrank
    pub fn size_change_percent(&self) -> f64 {
        if self.size_before == 0 {
            return 0.0;
        }
        (self.size_after as f64 - self.size_before as f64) * 100.0 / self.size_before as f64
    }
}

impl fmt::Display for OptimizationStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Optimization statistics:")?;
        writeln!(
            f,
            "  size: {} -> {} ({:+.1}%)",
            self.size_before,
            self.size_after,
            self.size_change_percent()
        )?;
        writeln!(f, "  objects optimized: {}", self.objects_optimized)?;
        writeln!(
            f,
            "  calls inlined: {} ({} single-use)",
            self.inliner.inlined, self.inliner.inlined_single_use
        )?;
        for (reason, count) in &self.inliner.skipped {
            writeln!(f, "  calls skipped ({:?}): {}", reason, count)?;
        }
        if self.inliner.guard_tripped {
            writeln!(f, "  growth guard tripped")?;
        }
        writeln!(f, "  functions hoisted: {}", self.functions_hoisted)?;
        writeln!(f, "  functions pruned: {}", self.functions_pruned)?;
        write!(f, "  time: {}us", self.optimization_time_us)
    }
}
