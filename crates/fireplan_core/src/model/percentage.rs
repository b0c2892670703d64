//! Whole-number percentages
//!
//! Plan inputs carry rates as whole numbers (`10` means 10%). The wrapper keeps
//! that convention explicit so a decimal rate can never be passed where a
//! percentage is expected, or the other way round.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A rate stored as a whole-number percentage.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Percentage(f64);

impl Percentage {
    pub const ZERO: Percentage = Percentage(0.0);
    pub const HUNDRED: Percentage = Percentage(100.0);

    pub const fn new(value: f64) -> Self {
        Percentage(value)
    }

    /// Build from a decimal rate (`0.07` becomes `7%`)
    pub fn from_decimal(rate: f64) -> Self {
        Percentage(rate * 100.0)
    }

    /// The whole-number value as entered
    pub const fn value(self) -> f64 {
        self.0
    }

    /// The rate as a decimal fraction, for arithmetic
    #[inline]
    pub fn as_decimal(self) -> f64 {
        self.0 / 100.0
    }

    pub fn is_finite(self) -> bool {
        self.0.is_finite()
    }
}

impl From<f64> for Percentage {
    fn from(value: f64) -> Self {
        Percentage(value)
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}
