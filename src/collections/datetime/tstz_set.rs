use crate::collections::base::collection::Collection;
use crate::error::{Error, Result};

use super::timestamp::Timestamp;
use super::tstz_span::Period;

/// A non-empty sorted vector of unique timestamps, with a cached bounding
/// `Period` (spec §3.2). Inputs must already be sorted and deduplicated —
/// the constructor validates rather than re-sorts, matching the teacher's
/// span-set constructors which validate the buffer they are handed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimestampSet {
    times: Vec<Timestamp>,
    bbox: Period,
}

impl TimestampSet {
    pub fn new(times: Vec<Timestamp>) -> Result<Self> {
        if times.is_empty() {
            return Err(Error::InvalidArgument("TimestampSet requires at least one timestamp".into()));
        }
        if times.windows(2).any(|w| w[0] >= w[1]) {
            return Err(Error::InvalidArgument("TimestampSet timestamps must be strictly increasing".into()));
        }
        let bbox = Period::new(times[0], *times.last().unwrap(), true, true)?;
        Ok(TimestampSet { times, bbox })
    }

    pub fn timestamps(&self) -> &[Timestamp] {
        &self.times
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn bounding_period(&self) -> Period {
        self.bbox
    }

    /// Binary search: `Ok(i)` for an exact hit, `Err(i)` for the insertion
    /// point that keeps `times` sorted (spec §4.2 `find`).
    pub fn find(&self, t: Timestamp) -> std::result::Result<usize, usize> {
        self.times.binary_search(&t)
    }

    pub fn at_timestamp(&self, t: Timestamp) -> Option<Timestamp> {
        self.find(t).ok().map(|i| self.times[i])
    }

    pub fn contains_instant(&self, t: Timestamp) -> bool {
        self.find(t).is_ok()
    }

    pub fn minus_timestamp(&self, t: Timestamp) -> Option<TimestampSet> {
        match self.find(t) {
            Err(_) => Some(self.clone()),
            Ok(i) => {
                let mut v = self.times.clone();
                v.remove(i);
                if v.is_empty() {
                    None
                } else {
                    TimestampSet::new(v).ok()
                }
            }
        }
    }

    /// Two-pointer merge restricting `self` to the timestamps inside `p`.
    pub fn at_period(&self, p: &Period) -> Option<TimestampSet> {
        let v: Vec<Timestamp> = self.times.iter().copied().filter(|t| p.contains_timestamp(*t)).collect();
        if v.is_empty() {
            None
        } else {
            TimestampSet::new(v).ok()
        }
    }

    pub fn minus_period(&self, p: &Period) -> Option<TimestampSet> {
        let v: Vec<Timestamp> = self.times.iter().copied().filter(|t| !p.contains_timestamp(*t)).collect();
        if v.is_empty() {
            None
        } else {
            TimestampSet::new(v).ok()
        }
    }
}

impl Collection for TimestampSet {
    type Elem = Timestamp;

    fn is_contained_in(&self, container: &Self) -> bool {
        self.times.iter().all(|t| container.find(*t).is_ok())
    }

    fn contains(&self, elem: &Timestamp) -> bool {
        self.find(*elem).is_ok()
    }

    fn overlaps(&self, other: &Self) -> bool {
        self.times.iter().any(|t| other.find(*t).is_ok())
    }

    fn is_left(&self, other: &Self) -> bool {
        *self.times.last().unwrap() < other.times[0]
    }

    fn is_over_or_left(&self, other: &Self) -> bool {
        *self.times.last().unwrap() <= *other.times.last().unwrap()
    }

    fn is_over_or_right(&self, other: &Self) -> bool {
        self.times[0] >= other.times[0]
    }

    fn is_right(&self, other: &Self) -> bool {
        self.times[0] > *other.times.last().unwrap()
    }
}
