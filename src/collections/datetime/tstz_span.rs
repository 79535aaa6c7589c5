use std::cmp::Ordering;
use std::fmt;

use crate::collections::base::{collection::Collection, span::Span};
use crate::error::{Error, Result};

use super::timestamp::Timestamp;

/// A half-open (or closed) interval of time: `Period { lower, upper,
/// lower_inc, upper_inc }` (spec §3.2). Invariant: `lower < upper` or
/// (`lower == upper` and both bounds inclusive) — an instant period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period {
    lower: Timestamp,
    upper: Timestamp,
    lower_inc: bool,
    upper_inc: bool,
}

/// Two lower bounds at the same instant order a closed bound before an
/// open one; two upper bounds order a closed bound after an open one
/// (spec §4.2). Encoded as `(Timestamp, rank)` where `rank` is chosen per
/// role so the derived tuple order matches that rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct LowerBound(Timestamp, bool); // bool = "is open" (open sorts after closed)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct UpperBound(Timestamp, bool); // bool = "is closed" (closed sorts after open)

/// Compares a lower bound against an upper bound at possibly different
/// instants: `true` iff the lower bound's position is at or before the
/// upper bound's position, i.e. there exists an instant satisfying both.
fn lower_le_upper(lb: LowerBound, ub: UpperBound) -> bool {
    match lb.0.cmp(&ub.0) {
        Ordering::Less => true,
        Ordering::Greater => false,
        Ordering::Equal => {
            let lower_closed = !lb.1;
            let upper_closed = ub.1;
            lower_closed && upper_closed
        }
    }
}

impl Period {
    /// Constructs and validates a period. Fails with `InvalidArgument` if
    /// the bound invariant of spec §3.2 is violated.
    pub fn new(lower: Timestamp, upper: Timestamp, lower_inc: bool, upper_inc: bool) -> Result<Self> {
        if lower > upper || (lower == upper && !(lower_inc && upper_inc)) {
            return Err(Error::InvalidArgument(format!(
                "period bounds {lower:?}..{upper:?} ({lower_inc},{upper_inc}) violate lower <= upper / instant rule"
            )));
        }
        Ok(Period { lower, upper, lower_inc, upper_inc })
    }

    /// A degenerate, instantaneous period at `t`.
    pub fn instant(t: Timestamp) -> Self {
        Period { lower: t, upper: t, lower_inc: true, upper_inc: true }
    }

    fn lower_bound(&self) -> LowerBound {
        LowerBound(self.lower, !self.lower_inc)
    }
    fn upper_bound(&self) -> UpperBound {
        UpperBound(self.upper, self.upper_inc)
    }

    pub fn duration_micros(&self) -> i64 {
        self.upper.as_micros() - self.lower.as_micros()
    }

    pub fn contains_timestamp(&self, t: Timestamp) -> bool {
        let after_lower = t > self.lower || (t == self.lower && self.lower_inc);
        let before_upper = t < self.upper || (t == self.upper && self.upper_inc);
        after_lower && before_upper
    }

    /// The two periods touch at exactly one bound such that their union is
    /// itself a single period (spec §4.2 `adjacent`).
    pub fn adjacent(&self, other: &Self) -> bool {
        (self.upper == other.lower && (self.upper_inc != other.lower_inc))
            || (other.upper == self.lower && (other.upper_inc != self.lower_inc))
    }

    pub fn union_adjacent(&self, other: &Self) -> Option<Self> {
        if self.adjacent(other) {
            let (a, b) = if self.lower <= other.lower { (self, other) } else { (other, self) };
            Period::new(a.lower, b.upper, a.lower_inc, b.upper_inc).ok()
        } else {
            None
        }
    }
}

impl Collection for Period {
    type Elem = Timestamp;

    fn is_contained_in(&self, container: &Self) -> bool {
        container.lower_bound() <= self.lower_bound() && self.upper_bound() <= container.upper_bound()
    }

    fn contains(&self, elem: &Self::Elem) -> bool {
        self.contains_timestamp(*elem)
    }

    fn overlaps(&self, other: &Self) -> bool {
        lower_le_upper(self.lower_bound(), other.upper_bound())
            && lower_le_upper(other.lower_bound(), self.upper_bound())
    }

    fn is_left(&self, other: &Self) -> bool {
        !lower_le_upper(other.lower_bound(), self.upper_bound())
    }

    fn is_over_or_left(&self, other: &Self) -> bool {
        self.upper_bound() <= other.upper_bound()
    }

    fn is_over_or_right(&self, other: &Self) -> bool {
        self.lower_bound() >= other.lower_bound()
    }

    fn is_right(&self, other: &Self) -> bool {
        !lower_le_upper(self.lower_bound(), other.upper_bound())
    }
}

impl Span for Period {
    type Width = i64; // microseconds

    fn lower(&self) -> Timestamp {
        self.lower
    }
    fn upper(&self) -> Timestamp {
        self.upper
    }
    fn is_lower_inclusive(&self) -> bool {
        self.lower_inc
    }
    fn is_upper_inclusive(&self) -> bool {
        self.upper_inc
    }

    fn shift(&self, delta: i64) -> Self {
        self.shift_scale(Some(delta), None)
    }

    fn scale(&self, width: i64) -> Self {
        self.shift_scale(None, Some(width))
    }

    fn shift_scale(&self, delta: Option<i64>, width: Option<i64>) -> Self {
        let lower = self.lower.as_micros() + delta.unwrap_or(0);
        let upper = match width {
            Some(w) => lower + w,
            None => self.upper.as_micros() + delta.unwrap_or(0),
        };
        Period {
            lower: Timestamp::from_micros(lower),
            upper: Timestamp::from_micros(upper),
            lower_inc: self.lower_inc,
            upper_inc: self.upper_inc,
        }
    }

    fn intersection(&self, other: &Self) -> Option<Self> {
        if !self.overlaps(other) {
            return None;
        }
        let lb = self.lower_bound().max(other.lower_bound());
        let ub = self.upper_bound().min(other.upper_bound());
        Period::new(lb.0, ub.0, !lb.1, ub.1).ok()
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}, {}{}",
            if self.lower_inc { "[" } else { "(" },
            self.lower,
            self.upper,
            if self.upper_inc { "]" } else { ")" },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(v: i64) -> Timestamp {
        Timestamp::from_micros(v)
    }

    #[test]
    fn contains_respects_open_bounds() {
        let p = Period::new(ts(0), ts(100), true, false).unwrap();
        assert!(p.contains_timestamp(ts(0)));
        assert!(p.contains_timestamp(ts(99)));
        assert!(!p.contains_timestamp(ts(100)));
    }

    #[test]
    fn adjacent_periods_union() {
        let a = Period::new(ts(0), ts(100), true, false).unwrap();
        let b = Period::new(ts(100), ts(200), true, true).unwrap();
        assert!(a.adjacent(&b));
        let u = a.union_adjacent(&b).unwrap();
        assert_eq!(u, Period::new(ts(0), ts(200), true, true).unwrap());
    }

    #[test]
    fn overlapping_periods_intersect() {
        let a = Period::new(ts(0), ts(100), true, true).unwrap();
        let b = Period::new(ts(50), ts(150), true, true).unwrap();
        assert_eq!(a.intersection(&b), Period::new(ts(50), ts(100), true, true).ok());
    }

    #[test]
    fn instant_period_requires_closed_bounds() {
        assert!(Period::new(ts(5), ts(5), true, true).is_ok());
        assert!(Period::new(ts(5), ts(5), true, false).is_err());
    }
}
