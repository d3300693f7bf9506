//! Global growth guard

use crate::size::Size;
use log::info;

/// Circuit breaker over the size of the whole program being inlined into.
///
/// Tracks the program size through the exact size delta of every rewrite.
/// Once the size exceeds the threshold the guard closes for good, and no
/// further call is inlined anywhere in the program.
#[derive(Debug, Clone)]
pub struct GrowthGuard {
    current: u64,
    threshold: u64,
    closed: bool,
}

impl GrowthGuard {
    pub fn new(initial: Size, threshold: u64) -> Self {
        Self {
            current: initial.get(),
            threshold,
            closed: false,
        }
    }

    /// Consulted before every candidate inline. Closes the guard when the
    /// program is already over budget.
    pub fn is_open(&mut self) -> bool {
        if !self.closed && self.current > self.threshold {
            info!(
                "growth guard closed: program size {} exceeds threshold {}",
                self.current, self.threshold
            );
            self.closed = true;
        }
        !self.closed
    }

    /// Account for one rewrite
    pub fn record(&mut self, delta: i64) {
        self.current = self.current.saturating_add_signed(delta);
    }

    pub fn current(&self) -> u64 {
        self.current
    }

    pub fn threshold(&self) -> u64 {
        self.threshold
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latches_closed() {
        let mut guard = GrowthGuard::new(Size::new(10), 12);
        assert!(guard.is_open());
        guard.record(2);
        assert!(guard.is_open());
        guard.record(1);
        assert!(!guard.is_open());
        assert!(guard.is_closed());

        // Shrinking below the threshold does not reopen it.
        guard.record(-10);
        assert_eq!(guard.current(), 3);
        assert!(!guard.is_open());
    }

    #[test]
    fn test_closed_from_the_start() {
        let mut guard = GrowthGuard::new(Size::new(50), 20);
        assert!(!guard.is_closed());
        assert!(!guard.is_open());
    }

    #[test]
    fn test_never_negative() {
        let mut guard = GrowthGuard::new(Size::new(1), 20);
        guard.record(-5);
        assert_eq!(guard.current(), 0);
    }
}
