//! Optimiser for Yul code
//!
//! The centre piece is the full inliner: a cost model, a call-site
//! rewriter, a driver that decides per call site, and a global growth
//! guard that bounds how much the program may grow. The remaining passes
//! bring the code into the shape the inliner expects and clean up after it.

pub mod analysis;
pub mod cost;
pub mod passes;
pub mod pipeline;
pub mod settings;
pub mod size;
pub mod stats;

pub use cost::{CostEstimator, CostWeights, TransitiveCost};
pub use passes::inline::{FullInliner, GrowthGuard, InlineEligibility, NoEarlyExit};
pub use passes::{OptimizationPass, OptimiserContext};
pub use pipeline::OptimizationPipeline;
pub use settings::{InlinerSettings, OptimizationLevel, OptimiserSettings, SettingsError};
pub use size::Size;
pub use stats::{InlinerStats, OptimizationStats, SkipReason};
