use crate::collections::base::{Collection, Span};
use crate::collections::datetime::{Period, Timestamp};
use crate::error::{Error, Result};
use crate::geom::GeomKernel;
use crate::value::BaseValue;

use super::instant::TInstant;
use super::interpolation::Interpolation;
use super::sequence::TSequence;

/// A disjoint, time-ordered run of sequences (spec §4.7). Adjacent
/// sequences sharing a boundary instant with equal values on both sides
/// are merged into one at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct TSequenceSet<V: BaseValue> {
    sequences: Vec<TSequence<V>>,
    span: Period,
}

impl<V: BaseValue> TSequenceSet<V> {
    /// Sorts by start time, rejects overlaps, and merges adjacent
    /// sequences per spec §4.7 rules (a)/(b)/(c).
    pub fn new(mut sequences: Vec<TSequence<V>>) -> Result<Self> {
        if sequences.is_empty() {
            return Err(Error::InvalidArgument("SequenceSet requires at least one sequence".into()));
        }
        sequences.sort_by(|a, b| a.period().lower().cmp(&b.period().lower()));

        for w in sequences.windows(2) {
            if w[0].period().overlaps(&w[1].period()) {
                return Err(Error::InvalidArgument("SequenceSet sequences must be pairwise disjoint in time".into()));
            }
        }

        let merged = merge_adjacent(sequences)?;
        let span = Period::new(
            merged[0].period().lower(),
            merged.last().unwrap().period().upper(),
            merged[0].period().is_lower_inclusive(),
            merged.last().unwrap().period().is_upper_inclusive(),
        )?;
        Ok(TSequenceSet { sequences: merged, span })
    }

    /// Wraps a possibly-empty, possibly-singular set of restriction
    /// pieces: `None` when empty, otherwise a normalized `SequenceSet`.
    pub fn from_pieces(pieces: Vec<TSequence<V>>) -> Result<Option<Self>> {
        if pieces.is_empty() {
            Ok(None)
        } else {
            Ok(Some(Self::new(pieces)?))
        }
    }

    pub fn sequences(&self) -> &[TSequence<V>] {
        &self.sequences
    }

    pub fn num_sequences(&self) -> usize {
        self.sequences.len()
    }

    pub fn span(&self) -> Period {
        self.span
    }

    fn find_containing(&self, t: Timestamp) -> Option<&TSequence<V>> {
        let idx = self.sequences.partition_point(|s| s.period().upper() < t);
        self.sequences.get(idx).filter(|s| s.period().contains_timestamp(t))
    }

    pub fn value_at(&self, t: Timestamp, kernel: &dyn GeomKernel) -> Result<Option<V>> {
        match self.find_containing(t) {
            Some(s) => s.value_at(t, kernel),
            None => Ok(None),
        }
    }

    pub fn min_value(&self) -> &V {
        self.sequences
            .iter()
            .map(|s| s.min_value())
            .min_by(|a, b| a.base_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
            .unwrap()
    }

    pub fn max_value(&self) -> &V {
        self.sequences
            .iter()
            .map(|s| s.max_value())
            .max_by(|a, b| a.base_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
            .unwrap()
    }

    pub fn at_timestamp(&self, t: Timestamp, kernel: &dyn GeomKernel) -> Result<Option<TInstant<V>>> {
        match self.find_containing(t) {
            Some(s) => s.at_timestamp(t, kernel),
            None => Ok(None),
        }
    }

    pub fn minus_timestamp(&self, t: Timestamp, kernel: &dyn GeomKernel) -> Result<Option<Self>> {
        let mut pieces = Vec::new();
        for s in &self.sequences {
            if s.period().contains_timestamp(t) {
                pieces.extend(s.minus_timestamp(t, kernel)?);
            } else {
                pieces.push(s.clone());
            }
        }
        Self::from_pieces(pieces)
    }

    pub fn at_period(&self, p: &Period, kernel: &dyn GeomKernel) -> Result<Option<Self>> {
        let mut pieces = Vec::new();
        for s in &self.sequences {
            if let Some(cut) = s.at_period(p, kernel)? {
                pieces.push(cut);
            }
        }
        Self::from_pieces(pieces)
    }

    pub fn minus_period(&self, p: &Period, kernel: &dyn GeomKernel) -> Result<Option<Self>> {
        let mut pieces = Vec::new();
        for s in &self.sequences {
            pieces.extend(s.minus_period(p, kernel)?);
        }
        Self::from_pieces(pieces)
    }

    pub fn at_value(&self, v: &V, kernel: &dyn GeomKernel) -> Result<Option<Self>> {
        let mut pieces = Vec::new();
        for s in &self.sequences {
            pieces.extend(s.at_value(v, kernel)?);
        }
        Self::from_pieces(pieces)
    }

    pub fn minus_value(&self, v: &V, kernel: &dyn GeomKernel) -> Result<Option<Self>> {
        let mut pieces = Vec::new();
        for s in &self.sequences {
            pieces.extend(s.minus_value(v, kernel)?);
        }
        Self::from_pieces(pieces)
    }

    pub fn at_range(&self, lo: f64, hi: f64, kernel: &dyn GeomKernel) -> Result<Option<Self>> {
        let mut pieces = Vec::new();
        for s in &self.sequences {
            pieces.extend(s.at_range(lo, hi, kernel)?);
        }
        Self::from_pieces(pieces)
    }

    pub fn minus_range(&self, lo: f64, hi: f64, kernel: &dyn GeomKernel) -> Result<Option<Self>> {
        let mut pieces = Vec::new();
        for s in &self.sequences {
            pieces.extend(s.minus_range(lo, hi, kernel)?);
        }
        Self::from_pieces(pieces)
    }
}

/// Spec §4.7 adjacency merge: two consecutive sequences merge when (a)
/// they touch at one instant with opposite inclusivity, (b) their shared
/// boundary value agrees, and (c) the result still honors the
/// non-continuous exclusive-upper-bound rule — enforced by routing the
/// merge through `TSequence::new`.
fn merge_adjacent<V: BaseValue>(sequences: Vec<TSequence<V>>) -> Result<Vec<TSequence<V>>> {
    let mut out: Vec<TSequence<V>> = Vec::with_capacity(sequences.len());
    for s in sequences {
        match out.last() {
            Some(prev) if prev.period().adjacent(&s.period()) && boundary_values_agree(prev, &s) => {
                log::debug!("merging adjacent sequences at boundary {}", prev.period().upper());
                let merged = splice(out.pop().unwrap(), s)?;
                out.push(merged);
            }
            _ => out.push(s),
        }
    }
    Ok(out)
}

fn boundary_values_agree<V: BaseValue>(prev: &TSequence<V>, next: &TSequence<V>) -> bool {
    prev.end_instant().value().base_eq(next.start_instant().value())
}

fn splice<V: BaseValue>(prev: TSequence<V>, next: TSequence<V>) -> Result<TSequence<V>> {
    let interp = prev.interpolation();
    let lower_inc = prev.period().is_lower_inclusive();
    let upper_inc = next.period().is_upper_inclusive();
    let mut instants: Vec<TInstant<V>> = prev.instants().to_vec();
    instants.extend_from_slice(&next.instants()[1..]);
    TSequence::new(instants, lower_inc, upper_inc, interp, true, &crate::geom::default_kernel())
}

impl<V: BaseValue> std::fmt::Display for TSequenceSet<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self.sequences.iter().map(|s| format!("{}", s.period())).collect();
        write!(f, "{{{}}}", parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::PlanarKernel;

    fn ts(v: i64) -> Timestamp {
        Timestamp::from_micros(v)
    }

    #[test]
    fn adjacent_sequences_merge_on_matching_boundary() {
        let k = PlanarKernel;
        // `a` is upper-exclusive at the shared boundary, so its last two
        // stored instants must agree (§4.6.5) — both are 1. `b` picks the
        // boundary back up closed, with no such restriction on its own
        // (closed) upper bound.
        let a = TSequence::new(vec![TInstant::new(1i32, ts(0)), TInstant::new(1i32, ts(10))], true, false, Interpolation::Step, true, &k)
            .unwrap();
        let b = TSequence::new(vec![TInstant::new(1i32, ts(10)), TInstant::new(2i32, ts(20))], true, true, Interpolation::Step, true, &k)
            .unwrap();
        let set = TSequenceSet::new(vec![a, b]).unwrap();
        assert_eq!(set.num_sequences(), 1);
    }

    #[test]
    fn disjoint_sequences_reject_overlap() {
        let k = PlanarKernel;
        let a = TSequence::new(vec![TInstant::new(1i32, ts(0)), TInstant::new(2i32, ts(10))], true, true, Interpolation::Step, false, &k)
            .unwrap();
        let b = TSequence::new(vec![TInstant::new(3i32, ts(5)), TInstant::new(4i32, ts(15))], true, true, Interpolation::Step, false, &k)
            .unwrap();
        assert!(TSequenceSet::new(vec![a, b]).is_err());
    }
}
