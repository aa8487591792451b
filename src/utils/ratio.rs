use std::fmt::Display;

use serde::Serialize;

/// Result of a guarded division. A ratio never becomes NaN: `0 / 0` is zero, and a positive
/// numerator over a zero denominator is [Ratio::Infinite].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Ratio {
    Finite(f64),
    Infinite,
}

impl Ratio {
    pub fn of(numerator: f64, denominator: f64) -> Ratio {
        if numerator <= 0. || !numerator.is_finite() {
            Ratio::Finite(0.)
        } else if denominator <= 0. || !denominator.is_finite() {
            Ratio::Infinite
        } else {
            Ratio::Finite(numerator / denominator)
        }
    }

    pub fn of_minutes(numerator: u64, denominator: u64) -> Ratio {
        Ratio::of(numerator as f64, denominator as f64)
    }

    pub fn as_percentage(self) -> Ratio {
        match self {
            Ratio::Finite(v) => Ratio::Finite(v * 100.),
            Ratio::Infinite => Ratio::Infinite,
        }
    }

    pub fn finite(self) -> Option<f64> {
        match self {
            Ratio::Finite(v) => Some(v),
            Ratio::Infinite => None,
        }
    }
}

impl Display for Ratio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Ratio::Finite(v) => write!(f, "{v:.1}"),
            Ratio::Infinite => write!(f, "∞"),
        }
    }
}

/// Division used for rates such as hours per day. Zero whenever the divisor is zero.
pub fn per(value: f64, divisor: u32) -> f64 {
    if divisor == 0 {
        0.
    } else {
        value / divisor as f64
    }
}
