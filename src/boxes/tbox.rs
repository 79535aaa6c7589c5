use crate::collections::base::span::Span;
use crate::collections::datetime::{Period, Timestamp};
use crate::error::{Error, Result};

use super::bbox::BoundingBox;

/// A value×time pruning box over a numeric base (spec §4.3). Either axis
/// may be absent — a `NumBox` built from a bare value carries no temporal
/// extent, and one built from a bare timestamp carries no value extent —
/// mirroring the teacher's `TBox::from_value` / `TBox::from_time` split.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumBox {
    value_span: Option<(f64, f64)>,
    period: Option<Period>,
}

impl NumBox {
    pub fn new(value_span: Option<(f64, f64)>, period: Option<Period>) -> Result<Self> {
        if value_span.is_none() && period.is_none() {
            return Err(Error::InvalidArgument("NumBox requires a value range or a time period".into()));
        }
        if let Some((lo, hi)) = value_span {
            if lo > hi {
                return Err(Error::InvalidArgument("NumBox value range has lower > upper".into()));
            }
        }
        Ok(NumBox { value_span, period })
    }

    pub fn from_value(lo: f64, hi: f64) -> Result<Self> {
        NumBox::new(Some((lo, hi)), None)
    }

    pub fn from_time(t: Timestamp) -> Self {
        NumBox { value_span: None, period: Some(Period::instant(t)) }
    }

    pub fn from_period(p: Period) -> Self {
        NumBox { value_span: None, period: Some(p) }
    }

    pub fn value_span(&self) -> Option<(f64, f64)> {
        self.value_span
    }

    pub fn period(&self) -> Option<Period> {
        self.period
    }

    pub fn has_value_axis(&self) -> bool {
        self.value_span.is_some()
    }

    pub fn has_time_axis(&self) -> bool {
        self.period.is_some()
    }
}

impl BoundingBox for NumBox {
    fn is_adjacent(&self, other: &Self) -> bool {
        match (self.period, other.period) {
            (Some(a), Some(b)) => a.adjacent(&b),
            _ => false,
        }
    }

    fn intersection(&self, other: &Self) -> Option<Self> {
        let value_span = match (self.value_span, other.value_span) {
            (Some((al, ah)), Some((bl, bh))) => {
                let lo = al.max(bl);
                let hi = ah.min(bh);
                if lo > hi {
                    return None;
                }
                Some((lo, hi))
            }
            (None, None) => None,
            _ => return None,
        };
        let period = match (self.period, other.period) {
            (Some(a), Some(b)) => Some(a.intersection(&b)?),
            (None, None) => None,
            _ => return None,
        };
        NumBox::new(value_span, period).ok()
    }

    fn union(&self, other: &Self) -> Result<Self> {
        let value_span = match (self.value_span, other.value_span) {
            (Some((al, ah)), Some((bl, bh))) => Some((al.min(bl), ah.max(bh))),
            (None, None) => None,
            _ => return Err(Error::IncompatibleBox),
        };
        let period = match (self.period, other.period) {
            (Some(a), Some(b)) => Some(Period::new(
                a.lower().min(b.lower()),
                a.upper().max(b.upper()),
                true,
                true,
            )?),
            (None, None) => None,
            _ => return Err(Error::IncompatibleBox),
        };
        NumBox::new(value_span, period)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(v: i64) -> Timestamp {
        Timestamp::from_micros(v)
    }

    #[test]
    fn intersection_narrows_both_axes() {
        let a = NumBox::new(Some((0.0, 10.0)), Some(Period::new(ts(0), ts(100), true, true).unwrap())).unwrap();
        let b = NumBox::new(Some((5.0, 15.0)), Some(Period::new(ts(50), ts(150), true, true).unwrap())).unwrap();
        let i = a.intersection(&b).unwrap();
        assert_eq!(i.value_span(), Some((5.0, 10.0)));
    }

    #[test]
    fn union_requires_matching_axes() {
        let a = NumBox::from_value(0.0, 1.0).unwrap();
        let b = NumBox::from_time(ts(0));
        assert!(matches!(a.union(&b), Err(Error::IncompatibleBox)));
    }
}
