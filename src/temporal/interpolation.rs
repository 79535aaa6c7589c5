use std::fmt;

/// A sequence's declared interpolation (spec §3.3). Only meaningful for
/// continuous bases: a `Linear`-flagged sequence over a step-only base
/// (`Bool`/`Int32`/`Text`) still behaves as `Step` (spec §4.6.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Interpolation {
    Step,
    Linear,
}

impl Interpolation {
    /// The interpolation actually in effect once the base's continuity is
    /// taken into account (spec §4.6.1): non-continuous bases are always
    /// `Step`, regardless of the sequence's declared interpolation.
    pub fn effective(self, continuous: bool) -> Self {
        if continuous {
            self
        } else {
            Interpolation::Step
        }
    }
}

impl fmt::Display for Interpolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Interpolation::Step => write!(f, "Step"),
            Interpolation::Linear => write!(f, "Linear"),
        }
    }
}
