//! Which functions may be inlined at all

use crate::analysis::contains_leave;
use yul_core::ast::FunctionDefinition;

/// Call-site independent veto on inlining a function
pub trait InlineEligibility: Send + Sync {
    fn is_eligible(&self, function: &FunctionDefinition) -> bool;
}

/// Rejects functions that can return early. Flattening a `leave` into the
/// caller would change control flow.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoEarlyExit;

impl InlineEligibility for NoEarlyExit {
    fn is_eligible(&self, function: &FunctionDefinition) -> bool {
        !contains_leave(function)
    }
}
