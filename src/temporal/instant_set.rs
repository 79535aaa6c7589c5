use crate::collections::datetime::{Period, PeriodSet, Timestamp, TimestampSet};
use crate::error::{Error, Result};
use crate::value::{check_uniform_spatial_key, BaseValue};

use super::instant::TInstant;

/// Sorted-by-time set of instants with strictly increasing timestamps
/// (spec §4.5). Unlike `Sequence`, there is no interpolation between
/// members — it is a discrete set of observations.
#[derive(Debug, Clone, PartialEq)]
pub struct TInstantSet<V: BaseValue> {
    instants: Vec<TInstant<V>>,
    bbox: Period,
}

impl<V: BaseValue> TInstantSet<V> {
    pub fn new(instants: Vec<TInstant<V>>) -> Result<Self> {
        if instants.is_empty() {
            return Err(Error::InvalidArgument("InstantSet requires at least one instant".into()));
        }
        if instants.windows(2).any(|w| w[0].timestamp() >= w[1].timestamp()) {
            return Err(Error::InvalidArgument("InstantSet timestamps must be strictly increasing".into()));
        }
        let values: Vec<V> = instants.iter().map(|i| i.value().clone()).collect();
        check_uniform_spatial_key(&values)?;
        let bbox = Period::new(instants[0].timestamp(), instants.last().unwrap().timestamp(), true, true)?;
        Ok(TInstantSet { instants, bbox })
    }

    pub fn instants(&self) -> &[TInstant<V>] {
        &self.instants
    }

    pub fn num_instants(&self) -> usize {
        self.instants.len()
    }

    pub fn start_instant(&self) -> &TInstant<V> {
        &self.instants[0]
    }

    pub fn end_instant(&self) -> &TInstant<V> {
        self.instants.last().unwrap()
    }

    pub fn bounding_period(&self) -> Period {
        self.bbox
    }

    pub fn timestamps(&self) -> Vec<Timestamp> {
        self.instants.iter().map(|i| i.timestamp()).collect()
    }

    fn find(&self, t: Timestamp) -> std::result::Result<usize, usize> {
        self.instants.binary_search_by_key(&t, |i| i.timestamp())
    }

    pub fn value_at(&self, t: Timestamp) -> Option<&V> {
        self.find(t).ok().map(|i| self.instants[i].value())
    }

    /// Linear scan for non-numeric bases; bbox-prunable for numeric ones
    /// is left to callers holding a cached `NumBox` (spec §4.5).
    pub fn min_value(&self) -> &V {
        self.instants
            .iter()
            .map(|i| i.value())
            .min_by(|a, b| a.base_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
            .unwrap()
    }

    pub fn max_value(&self) -> &V {
        self.instants
            .iter()
            .map(|i| i.value())
            .max_by(|a, b| a.base_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
            .unwrap()
    }

    pub fn ever_equals(&self, v: &V) -> bool {
        self.instants.iter().any(|i| i.ever_equals(v))
    }

    pub fn always_equals(&self, v: &V) -> bool {
        self.instants.iter().all(|i| i.always_equals(v))
    }

    pub fn at_timestamp(&self, t: Timestamp) -> Option<TInstant<V>> {
        self.find(t).ok().map(|i| self.instants[i].clone())
    }

    pub fn minus_timestamp(&self, t: Timestamp) -> Option<Self> {
        match self.find(t) {
            Err(_) => Some(self.clone()),
            Ok(i) => {
                let mut v = self.instants.clone();
                v.remove(i);
                if v.is_empty() {
                    None
                } else {
                    TInstantSet::new(v).ok()
                }
            }
        }
    }

    /// Two-pointer merge against the sorted timestamp set (spec §4.5).
    pub fn at_timestamp_set(&self, ts: &TimestampSet) -> Option<Self> {
        let v: Vec<TInstant<V>> = self.instants.iter().filter(|i| ts.contains_instant(i.timestamp())).cloned().collect();
        if v.is_empty() {
            None
        } else {
            TInstantSet::new(v).ok()
        }
    }

    pub fn minus_timestamp_set(&self, ts: &TimestampSet) -> Option<Self> {
        let v: Vec<TInstant<V>> = self.instants.iter().filter(|i| !ts.contains_instant(i.timestamp())).cloned().collect();
        if v.is_empty() {
            None
        } else {
            TInstantSet::new(v).ok()
        }
    }

    pub fn at_period(&self, p: &Period) -> Option<Self> {
        let v: Vec<TInstant<V>> = self.instants.iter().filter(|i| p.contains_timestamp(i.timestamp())).cloned().collect();
        if v.is_empty() {
            None
        } else {
            TInstantSet::new(v).ok()
        }
    }

    pub fn minus_period(&self, p: &Period) -> Option<Self> {
        let v: Vec<TInstant<V>> = self.instants.iter().filter(|i| !p.contains_timestamp(i.timestamp())).cloned().collect();
        if v.is_empty() {
            None
        } else {
            TInstantSet::new(v).ok()
        }
    }

    pub fn at_period_set(&self, ps: &PeriodSet) -> Option<Self> {
        let v: Vec<TInstant<V>> = self.instants.iter().filter(|i| ps.at_timestamp(i.timestamp())).cloned().collect();
        if v.is_empty() {
            None
        } else {
            TInstantSet::new(v).ok()
        }
    }

    pub fn minus_period_set(&self, ps: &PeriodSet) -> Option<Self> {
        let v: Vec<TInstant<V>> = self.instants.iter().filter(|i| !ps.at_timestamp(i.timestamp())).cloned().collect();
        if v.is_empty() {
            None
        } else {
            TInstantSet::new(v).ok()
        }
    }

    pub fn at_value(&self, v: &V) -> Option<Self> {
        let matched: Vec<TInstant<V>> = self.instants.iter().filter(|i| i.value().base_eq(v)).cloned().collect();
        if matched.is_empty() {
            None
        } else {
            TInstantSet::new(matched).ok()
        }
    }

    pub fn minus_value(&self, v: &V) -> Option<Self> {
        let matched: Vec<TInstant<V>> = self.instants.iter().filter(|i| !i.value().base_eq(v)).cloned().collect();
        if matched.is_empty() {
            None
        } else {
            TInstantSet::new(matched).ok()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(v: i64) -> Timestamp {
        Timestamp::from_micros(v)
    }

    fn set() -> TInstantSet<i32> {
        TInstantSet::new(vec![
            TInstant::new(2, ts(1)),
            TInstant::new(5, ts(2)),
            TInstant::new(3, ts(3)),
        ])
        .unwrap()
    }

    #[test]
    fn rejects_non_increasing_timestamps() {
        let bad = vec![TInstant::new(1, ts(5)), TInstant::new(2, ts(5))];
        assert!(TInstantSet::new(bad).is_err());
    }

    #[test]
    fn min_max_value() {
        let s = set();
        assert_eq!(*s.min_value(), 2);
        assert_eq!(*s.max_value(), 5);
    }

    #[test]
    fn at_value_filters() {
        let s = set();
        let at5 = s.at_value(&5).unwrap();
        assert_eq!(at5.num_instants(), 1);
    }
}
