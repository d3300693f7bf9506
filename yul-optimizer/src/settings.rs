//! Optimiser configuration

use crate::cost::CostWeights;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Step letters understood by the pipeline
pub const KNOWN_STEPS: &[char] = &['h', 'i', 'u'];

/// Default step sequence: hoist, inline, prune
pub const DEFAULT_STEPS: &str = "hiu";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SettingsError {
    #[error("Unknown optimiser step '{0}' (known steps: h, i, u)")]
    UnknownStep(char),

    #[error("Step 'i' needs an earlier 'h': the inliner works on hoisted code")]
    InliningRequiresHoisting,

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Optimization level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizationLevel {
    /// Optimiser disabled
    None,
    /// Structural passes only, no inlining
    Minimal,
    /// Default settings
    #[default]
    Standard,
    /// Deeper and larger inlining
    Full,
}

/// Knobs of the full inliner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InlinerSettings {
    /// How often a function may occur in one chain of inlined calls,
    /// counting the function the chain starts in
    pub max_recursion_depth: usize,
    /// Program size above which no further call is inlined
    pub global_size_threshold: u64,
    /// A call that is not the callee's only use is inlined when the
    /// expanded size stays within this multiple of the call's own size
    pub per_site_size_multiplier: u64,
}

impl Default for InlinerSettings {
    fn default() -> Self {
        Self {
            max_recursion_depth: 1,
            global_size_threshold: 2000,
            per_site_size_multiplier: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimiserSettings {
    /// Master switch for the whole optimiser
    pub run_yul_optimiser: bool,
    pub optimiser_steps: String,
    pub inliner: InlinerSettings,
    pub cost: CostWeights,
}

impl OptimiserSettings {
    pub fn for_level(level: OptimizationLevel) -> Self {
        match level {
            OptimizationLevel::None => Self {
                run_yul_optimiser: false,
                ..Self::standard()
            },
            OptimizationLevel::Minimal => Self {
                optimiser_steps: "hu".to_string(),
                ..Self::standard()
            },
            OptimizationLevel::Standard => Self::standard(),
            OptimizationLevel::Full => Self {
                inliner: InlinerSettings {
                    max_recursion_depth: 2,
                    global_size_threshold: 8000,
                    per_site_size_multiplier: 4,
                },
                ..Self::standard()
            },
        }
    }

    fn standard() -> Self {
        Self {
            run_yul_optimiser: true,
            optimiser_steps: DEFAULT_STEPS.to_string(),
            inliner: InlinerSettings::default(),
            cost: CostWeights::default(),
        }
    }

    /// Step letters in order, whitespace ignored
    pub fn steps(&self) -> Result<Vec<char>, SettingsError> {
        self.optimiser_steps
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| {
                if KNOWN_STEPS.contains(&c) {
                    Ok(c)
                } else {
                    Err(SettingsError::UnknownStep(c))
                }
            })
            .collect()
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        let steps = self.steps()?;
        if let Some(inline) = steps.iter().position(|step| *step == 'i') {
            if !steps[..inline].contains(&'h') {
                return Err(SettingsError::InliningRequiresHoisting);
            }
        }
        if self.cost.statement == 0 {
            return Err(SettingsError::InvalidValue {
                field: "cost.statement",
                reason: "must be positive".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for OptimiserSettings {
    fn default() -> Self {
        Self::for_level(OptimizationLevel::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = OptimiserSettings::default();
        assert!(settings.run_yul_optimiser);
        assert_eq!(settings.optimiser_steps, "hiu");
        assert_eq!(settings.inliner.max_recursion_depth, 1);
        assert_eq!(settings.inliner.global_size_threshold, 2000);
        assert_eq!(settings.inliner.per_site_size_multiplier, 2);
    }

    #[test]
    fn test_levels() {
        assert!(!OptimiserSettings::for_level(OptimizationLevel::None).run_yul_optimiser);
        assert_eq!(
            OptimiserSettings::for_level(OptimizationLevel::Minimal).steps().unwrap(),
            vec!['h', 'u']
        );
        let full = OptimiserSettings::for_level(OptimizationLevel::Full);
        assert!(full.inliner.global_size_threshold > InlinerSettings::default().global_size_threshold);
    }

    #[test]
    fn test_unknown_step() {
        let settings = OptimiserSettings {
            optimiser_steps: "h i x".to_string(),
            ..OptimiserSettings::default()
        };
        assert_eq!(settings.steps(), Err(SettingsError::UnknownStep('x')));
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_inlining_needs_hoisting() {
        let settings = OptimiserSettings {
            optimiser_steps: "ihu".to_string(),
            ..OptimiserSettings::default()
        };
        assert_eq!(settings.validate(), Err(SettingsError::InliningRequiresHoisting));
        assert!(OptimiserSettings::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings: OptimiserSettings =
            serde_json::from_str(r#"{ "inliner": { "global_size_threshold": 50 }, "cost": { "loop": 9 } }"#)
                .unwrap();
        assert_eq!(settings.inliner.global_size_threshold, 50);
        assert_eq!(settings.inliner.max_recursion_depth, 1);
        assert_eq!(settings.cost.loop_, 9);
        assert_eq!(settings.optimiser_steps, "hiu");
    }
}
