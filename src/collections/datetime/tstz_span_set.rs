use crate::collections::base::{collection::Collection, span::Span, span_set::SpanSet};
use crate::error::{Error, Result};

use super::timestamp::Timestamp;
use super::tstz_span::Period;

/// A sorted vector of periods that are pairwise disjoint *and*
/// non-adjacent under union (spec §3.2). Constructing a `PeriodSet` out of
/// adjacent/overlapping periods fails; use [`PeriodSet::normalize`] to fold
/// a raw, possibly-adjacent vector into canonical form first.
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodSet {
    periods: Vec<Period>,
    bbox: Period,
}

impl PeriodSet {
    pub fn new(periods: Vec<Period>) -> Result<Self> {
        if periods.is_empty() {
            return Err(Error::InvalidArgument("PeriodSet requires at least one period".into()));
        }
        for w in periods.windows(2) {
            if w[0].overlaps(&w[1]) || w[0].adjacent(&w[1]) {
                return Err(Error::InvalidArgument(
                    "PeriodSet periods must be pairwise disjoint and non-mergeable".into(),
                ));
            }
        }
        let bbox = Period::new(periods[0].lower(), periods.last().unwrap().upper(), true, true)?;
        Ok(PeriodSet { periods, bbox })
    }

    /// Folds a raw, possibly out-of-order / adjacent / overlapping vector
    /// of periods into the canonical disjoint, non-adjacent form.
    pub fn normalize(mut periods: Vec<Period>) -> Result<Self> {
        if periods.is_empty() {
            return Err(Error::InvalidArgument("PeriodSet requires at least one period".into()));
        }
        periods.sort_by_key(|p| p.lower());
        let mut merged: Vec<Period> = Vec::with_capacity(periods.len());
        for p in periods {
            if let Some(last) = merged.last_mut() {
                if last.overlaps(&p) {
                    *last = Period::new(
                        last.lower(),
                        std::cmp::max(last.upper(), p.upper()),
                        last.is_lower_inclusive(),
                        if last.upper() >= p.upper() { last.is_upper_inclusive() } else { p.is_upper_inclusive() },
                    )?;
                    continue;
                }
                if let Some(u) = last.union_adjacent(&p) {
                    *last = u;
                    continue;
                }
            }
            merged.push(p);
        }
        PeriodSet::new(merged)
    }

    pub fn periods(&self) -> &[Period] {
        &self.periods
    }

    pub fn bounding_period(&self) -> Period {
        self.bbox
    }

    pub fn find(&self, t: Timestamp) -> Option<usize> {
        self.periods.iter().position(|p| p.contains_timestamp(t))
    }

    pub fn at_timestamp(&self, t: Timestamp) -> bool {
        self.find(t).is_some()
    }

    pub fn at_period(&self, p: &Period) -> Option<PeriodSet> {
        let v: Vec<Period> = self.periods.iter().filter_map(|x| x.intersection(p)).collect();
        if v.is_empty() {
            None
        } else {
            PeriodSet::new(v).ok()
        }
    }

    pub fn minus_period(&self, p: &Period) -> Option<PeriodSet> {
        let mut v = Vec::new();
        for x in &self.periods {
            if !x.overlaps(p) {
                v.push(*x);
                continue;
            }
            // subtract p from x: at most two remaining pieces
            if x.lower() < p.lower() {
                if let Ok(left) = Period::new(x.lower(), p.lower(), x.is_lower_inclusive(), !p.is_lower_inclusive()) {
                    v.push(left);
                }
            }
            if x.upper() > p.upper() {
                if let Ok(right) = Period::new(p.upper(), x.upper(), !p.is_upper_inclusive(), x.is_upper_inclusive()) {
                    v.push(right);
                }
            }
        }
        if v.is_empty() {
            None
        } else {
            PeriodSet::normalize(v).ok()
        }
    }
}

impl Collection for PeriodSet {
    type Elem = Timestamp;

    fn is_contained_in(&self, container: &Self) -> bool {
        self.periods.iter().all(|p| container.periods.iter().any(|c| p.is_contained_in(c)))
    }

    fn contains(&self, elem: &Timestamp) -> bool {
        self.at_timestamp(*elem)
    }

    fn overlaps(&self, other: &Self) -> bool {
        self.periods.iter().any(|p| other.periods.iter().any(|q| p.overlaps(q)))
    }

    fn is_left(&self, other: &Self) -> bool {
        self.bbox.is_left(&other.bbox)
    }

    fn is_over_or_left(&self, other: &Self) -> bool {
        self.bbox.is_over_or_left(&other.bbox)
    }

    fn is_over_or_right(&self, other: &Self) -> bool {
        self.bbox.is_over_or_right(&other.bbox)
    }

    fn is_right(&self, other: &Self) -> bool {
        self.bbox.is_right(&other.bbox)
    }
}

impl SpanSet for PeriodSet {
    type SpanType = Period;

    fn spans(&self) -> &[Period] {
        &self.periods
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(v: i64) -> Timestamp {
        Timestamp::from_micros(v)
    }
    fn p(a: i64, b: i64) -> Period {
        Period::new(ts(a), ts(b), true, false).unwrap()
    }

    #[test]
    fn normalize_merges_adjacent() {
        let ps = PeriodSet::normalize(vec![p(0, 10), p(10, 20)]).unwrap();
        assert_eq!(ps.periods().len(), 1);
    }

    #[test]
    fn rejects_overlapping_construction() {
        assert!(PeriodSet::new(vec![p(0, 10), p(5, 15)]).is_err());
    }

    #[test]
    fn minus_period_splits() {
        let ps = PeriodSet::new(vec![Period::new(ts(0), ts(100), true, true).unwrap()]).unwrap();
        let cut = Period::new(ts(40), ts(60), true, true).unwrap();
        let rest = ps.minus_period(&cut).unwrap();
        assert_eq!(rest.periods().len(), 2);
    }
}
