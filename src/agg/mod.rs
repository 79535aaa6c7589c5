//! Temporal aggregation (spec §4.9): combines many temporal values of the
//! same base type into one, either as a running fold (`min`/`max`/`sum`/
//! `avg`) or as a pair of summary scalars (`extent`).

use crate::collections::datetime::{Period, Timestamp};
use crate::error::{Error, Result};
use crate::geom::GeomKernel;
use crate::value::{BaseValue, Double2, Float64};

use crate::temporal::{Interpolation, TInstant, TInstantSet, Temporal};

/// Flattens any duration shape into its recorded `(timestamp, value)`
/// observations, dropping interpolation: aggregation combines the values
/// a source actually reported, not samples interpolated between them.
fn observations<V: BaseValue>(t: &Temporal<V>) -> Vec<(Timestamp, V)> {
    match t {
        Temporal::Instant(i) => vec![(i.timestamp(), i.value().clone())],
        Temporal::InstantSet(s) => s.instants().iter().map(|i| (i.timestamp(), i.value().clone())).collect(),
        Temporal::Sequence(s) => s.instants().iter().map(|i| (i.timestamp(), i.value().clone())).collect(),
        Temporal::SequenceSet(s) => s.sequences().iter().flat_map(|seq| seq.instants().iter().map(|i| (i.timestamp(), i.value().clone()))).collect(),
    }
}

/// Two-pointer merge of two change-point series into the series of `op`
/// applied wherever both sides are active, falling back to whichever
/// single side is active otherwise (spec §4.9: "accumulator merge").
/// Conceptually the same role as MobilityDB's `SkipList` aggregate state,
/// simplified to a sorted `Vec` since this engine has no concurrent
/// multi-writer requirement.
fn merge_step_series<V: BaseValue>(a: &[(Timestamp, V)], b: &[(Timestamp, V)], op: &impl Fn(&V, &V) -> V) -> Vec<(Timestamp, V)> {
    let mut times: Vec<Timestamp> = a.iter().map(|(t, _)| *t).chain(b.iter().map(|(t, _)| *t)).collect();
    times.sort();
    times.dedup();

    let mut out = Vec::with_capacity(times.len());
    let (mut ai, mut bi) = (0usize, 0usize);
    let (mut cur_a, mut cur_b): (Option<&V>, Option<&V>) = (None, None);
    for t in times {
        while ai < a.len() && a[ai].0 <= t {
            cur_a = Some(&a[ai].1);
            ai += 1;
        }
        while bi < b.len() && b[bi].0 <= t {
            cur_b = Some(&b[bi].1);
            bi += 1;
        }
        let combined = match (cur_a, cur_b) {
            (Some(x), Some(y)) => op(x, y),
            (Some(x), None) => x.clone(),
            (None, Some(y)) => y.clone(),
            (None, None) => continue,
        };
        out.push((t, combined));
    }
    out
}

/// Running aggregate state: a sorted series of change points produced by
/// repeated `merge_step_series` folds.
pub struct Accumulator<V: BaseValue> {
    points: Vec<(Timestamp, V)>,
}

impl<V: BaseValue> Accumulator<V> {
    pub fn new() -> Self {
        Accumulator { points: Vec::new() }
    }

    pub fn merge(&mut self, value: &Temporal<V>, op: &impl Fn(&V, &V) -> V) {
        let incoming = observations(value);
        self.points = merge_step_series(&self.points, &incoming, op);
    }

    /// `None` on an empty accumulation; a bare `Instant` for a single
    /// change point; otherwise an `InstantSet` of the observed aggregate
    /// at every change point. This is deliberately coarser than
    /// MobilityDB's own aggregates, which track each source's active span
    /// and emit a gap-free `Step` sequence — this engine does not retain
    /// per-source activity intervals, only the merged value series.
    pub fn finish(self) -> Result<Option<Temporal<V>>> {
        match self.points.len() {
            0 => Ok(None),
            1 => {
                let (t, v) = self.points.into_iter().next().unwrap();
                Ok(Some(Temporal::Instant(TInstant::new(v, t))))
            }
            _ => {
                let instants: Vec<TInstant<V>> = self.points.into_iter().map(|(t, v)| TInstant::new(v, t)).collect();
                Ok(Some(Temporal::InstantSet(TInstantSet::new(instants)?)))
            }
        }
    }
}

impl<V: BaseValue> Default for Accumulator<V> {
    fn default() -> Self {
        Self::new()
    }
}

pub fn min<V: BaseValue>(values: &[Temporal<V>]) -> Result<Option<Temporal<V>>> {
    let mut acc = Accumulator::new();
    for v in values {
        acc.merge(v, &|a: &V, b: &V| if a.base_le(b) { a.clone() } else { b.clone() });
    }
    acc.finish()
}

pub fn max<V: BaseValue>(values: &[Temporal<V>]) -> Result<Option<Temporal<V>>> {
    let mut acc = Accumulator::new();
    for v in values {
        acc.merge(v, &|a: &V, b: &V| if a.base_ge(b) { a.clone() } else { b.clone() });
    }
    acc.finish()
}

pub fn sum(values: &[Temporal<Float64>]) -> Result<Option<Temporal<Float64>>> {
    let mut acc: Accumulator<Float64> = Accumulator::new();
    for v in values {
        acc.merge(v, &|a: &f64, b: &f64| a + b);
    }
    acc.finish()
}

/// Running `(sum, count)` pair, divided down to a plain average once all
/// inputs are folded in (spec §4.9: "avg via Double2").
pub fn avg(values: &[Temporal<Float64>], kernel: &dyn GeomKernel) -> Result<Option<Temporal<Float64>>> {
    let mut acc: Accumulator<Double2> = Accumulator::new();
    for v in values {
        let counted = v.map(|x| Double2::new([*x, 1.0]), Interpolation::Step, kernel)?;
        acc.merge(&counted, &|a: &Double2, b: &Double2| Double2::new([a.components()[0] + b.components()[0], a.components()[1] + b.components()[1]]));
    }
    match acc.finish()? {
        None => Ok(None),
        Some(t) => Ok(Some(t.map(|d| d.components()[0] / d.components()[1], Interpolation::Step, kernel)?)),
    }
}

/// Union of bounding periods and the overall min/max value (spec §4.9
/// `extent`).
pub fn extent<V: BaseValue>(values: &[Temporal<V>]) -> Option<(Period, V, V)> {
    let mut iter = values.iter();
    let first = iter.next()?;
    let mut lower = first.bounding_period().lower();
    let mut upper = first.bounding_period().upper();
    let mut min_v = first.min_value().clone();
    let mut max_v = first.max_value().clone();
    for v in iter {
        let p = v.bounding_period();
        if p.lower() < lower {
            lower = p.lower();
        }
        if p.upper() > upper {
            upper = p.upper();
        }
        if v.min_value().base_lt(&min_v) {
            min_v = v.min_value().clone();
        }
        if v.max_value().base_gt(&max_v) {
            max_v = v.max_value().clone();
        }
    }
    let period = Period::new(lower, upper, true, true).ok()?;
    Some((period, min_v, max_v))
}

/// Trapezoidal area under a `Linear`-interpolated temporal float (spec
/// §4.9 `integral`). Fails with `UnsupportedInterpolation` on any piece
/// that isn't continuous/`Linear` — a `Step` function's "area" is not
/// well-defined without per-source activity spans this engine discards.
pub fn integral(value: &Temporal<Float64>) -> Result<f64> {
    let sequences = match value {
        Temporal::Sequence(s) => vec![s.clone()],
        Temporal::SequenceSet(s) => s.sequences().to_vec(),
        _ => return Err(Error::UnsupportedInterpolation),
    };
    let mut total = 0.0;
    for seq in &sequences {
        if seq.interpolation() != Interpolation::Linear {
            return Err(Error::UnsupportedInterpolation);
        }
        for w in seq.instants().windows(2) {
            let dt = (w[1].timestamp().as_micros() - w[0].timestamp().as_micros()) as f64 / 1_000_000.0;
            total += dt * (w[0].value() + w[1].value()) / 2.0;
        }
    }
    Ok(total)
}

/// Time-weighted average: `integral / total duration` (spec §4.9
/// `twAvg`). Same `UnsupportedInterpolation` restriction as `integral`.
pub fn time_weighted_avg(value: &Temporal<Float64>) -> Result<f64> {
    let area = integral(value)?;
    let duration_micros: i64 = match value {
        Temporal::Sequence(s) => s.period().duration_micros(),
        Temporal::SequenceSet(s) => s.sequences().iter().map(|seq| seq.period().duration_micros()).sum(),
        _ => return Err(Error::UnsupportedInterpolation),
    };
    if duration_micros == 0 {
        return Err(Error::UnsupportedInterpolation);
    }
    Ok(area / (duration_micros as f64 / 1_000_000.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::PlanarKernel;
    use crate::temporal::TSequence;

    fn ts(v: i64) -> Timestamp {
        Timestamp::from_micros(v)
    }

    #[test]
    fn sum_merges_overlapping_instant_sets() {
        let a = Temporal::Instant(TInstant::new(1.0f64, ts(0)));
        let b = Temporal::Instant(TInstant::new(2.0f64, ts(0)));
        let s = sum(&[a, b]).unwrap().unwrap();
        match s {
            Temporal::Instant(i) => assert_eq!(*i.value(), 3.0),
            _ => panic!("expected Instant"),
        }
    }

    #[test]
    fn extent_spans_min_and_max() {
        let a = Temporal::Instant(TInstant::new(1.0f64, ts(0)));
        let b = Temporal::Instant(TInstant::new(5.0f64, ts(10)));
        let (period, lo, hi) = extent(&[a, b]).unwrap();
        assert_eq!(period.lower(), ts(0));
        assert_eq!(lo, 1.0);
        assert_eq!(hi, 5.0);
    }

    #[test]
    fn integral_of_linear_ramp() {
        let k = PlanarKernel;
        let seq =
            TSequence::new(vec![TInstant::new(0.0f64, ts(0)), TInstant::new(10.0f64, ts(2_000_000))], true, true, Interpolation::Linear, false, &k)
                .unwrap();
        let area = integral(&Temporal::Sequence(seq)).unwrap();
        assert!((area - 10.0).abs() < 1e-9);
    }

    #[test]
    fn twavg_rejects_step_interpolation() {
        let k = PlanarKernel;
        let seq = TSequence::new(vec![TInstant::new(1i32, ts(0)), TInstant::new(2i32, ts(10))], true, true, Interpolation::Step, false, &k).unwrap();
        let wrapped = Temporal::Sequence(seq).map(|v| *v as f64, Interpolation::Step, &k).unwrap();
        assert!(matches!(time_weighted_avg(&wrapped), Err(Error::UnsupportedInterpolation)));
    }
}
