//! Saturating code-size measure

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

/// Values at or above this cap compare as unbounded
const CAP: u64 = 1 << 40;

/// Code size of a subtree. Never negative, saturates at [`Size::UNBOUNDED`].
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Size(u64);

impl Size {
    pub const ZERO: Size = Size(0);
    pub const UNBOUNDED: Size = Size(CAP);

    pub fn new(value: u64) -> Self {
        Size(value.min(CAP))
    }

    pub fn get(self) -> u64 {
        self.0
    }

    pub fn is_unbounded(self) -> bool {
        self.0 >= CAP
    }

    pub fn saturating_mul(self, factor: u64) -> Self {
        Size::new(self.0.saturating_mul(factor))
    }

    /// Signed difference `self - earlier`, used for growth accounting
    pub fn delta_from(self, earlier: Size) -> i64 {
        self.0 as i64 - earlier.0 as i64
    }
}

impl Add for Size {
    type Output = Size;

    fn add(self, other: Size) -> Size {
        Size::new(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Size {
    fn add_assign(&mut self, other: Size) {
        *self = *self + other;
    }
}

impl Sum for Size {
    fn sum<I: Iterator<Item = Size>>(iter: I) -> Size {
        iter.fold(Size::ZERO, Add::add)
    }
}

impl From<u64> for Size {
    fn from(value: u64) -> Self {
        Size::new(value)
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unbounded() {
            f.write_str("unbounded")
        } else {
            write!(f, "{}", self.0)
        }
    }
}
