use crate::collections::base::{Collection, Span};
use crate::collections::datetime::{Period, Timestamp};
use crate::error::{Error, Result};
use crate::geom::GeomKernel;
use crate::value::BaseValue;

use super::instant::TInstant;
use super::instant_set::TInstantSet;
use super::interpolation::Interpolation;
use super::sequence::TSequence;
use super::sequence_set::TSequenceSet;
use super::Temporal;

/// Merges two sequences onto a shared instant set over their overlapping
/// time domain (spec §4.8): every native instant of either side is kept,
/// the other side is sampled there via `value_at`, and — when `crossings`
/// is set and the base is continuous — a synthetic instant is inserted
/// wherever the two segments' interpolated values cross.
pub fn synchronize_sequences<V: BaseValue>(
    a: &TSequence<V>,
    b: &TSequence<V>,
    crossings: bool,
    kernel: &dyn GeomKernel,
) -> Result<Option<(TSequence<V>, TSequence<V>)>> {
    let Some(period) = a.period().intersection(&b.period()) else {
        return Ok(None);
    };

    let mut times: Vec<Timestamp> = Vec::new();
    for inst in a.instants().iter().chain(b.instants()) {
        if period.contains_timestamp(inst.timestamp()) {
            times.push(inst.timestamp());
        }
    }
    if period.is_lower_inclusive() {
        times.push(period.lower());
    }
    if period.is_upper_inclusive() {
        times.push(period.upper());
    }
    times.sort();
    times.dedup();

    if crossings && V::CONTINUOUS && times.len() >= 2 {
        let mut crossed = Vec::new();
        for w in times.windows(2) {
            let (t0, t1) = (w[0], w[1]);
            let (Some(va0), Some(va1), Some(vb0), Some(vb1)) =
                (a.value_at(t0, kernel)?, a.value_at(t1, kernel)?, b.value_at(t0, kernel)?, b.value_at(t1, kernel)?)
            else {
                continue;
            };
            if let Some(f) = V::crossing_fraction(&va0, &va1, &vb0, &vb1)? {
                let total = (t1.as_micros() - t0.as_micros()) as f64;
                if let Some(t) = t0.checked_add_micros((total * f).round() as i64) {
                    crossed.push(t);
                }
            }
        }
        times.extend(crossed);
        times.sort();
        times.dedup();
    }

    let mut inst_a = Vec::with_capacity(times.len());
    let mut inst_b = Vec::with_capacity(times.len());
    for t in times {
        let Some(va) = a.value_at(t, kernel)? else { continue };
        let Some(vb) = b.value_at(t, kernel)? else { continue };
        inst_a.push(TInstant::new(va, t));
        inst_b.push(TInstant::new(vb, t));
    }
    if inst_a.is_empty() {
        return Ok(None);
    }

    let (lower_inc, upper_inc) = if inst_a.len() == 1 { (true, true) } else { (period.is_lower_inclusive(), period.is_upper_inclusive()) };

    let sa = TSequence::new(inst_a, lower_inc, upper_inc, a.interpolation(), true, kernel)?;
    let sb = TSequence::new(inst_b, lower_inc, upper_inc, b.interpolation(), true, kernel)?;
    Ok(Some((sa, sb)))
}

fn as_pieces<V: BaseValue>(t: &Temporal<V>, kernel: &dyn GeomKernel) -> Result<Vec<TSequence<V>>> {
    match t {
        Temporal::Instant(i) => Ok(vec![TSequence::new(vec![i.clone()], true, true, Interpolation::Step, false, kernel)?]),
        Temporal::InstantSet(s) => s
            .instants()
            .iter()
            .map(|i| TSequence::new(vec![i.clone()], true, true, Interpolation::Step, false, kernel))
            .collect(),
        Temporal::Sequence(s) => Ok(vec![s.clone()]),
        Temporal::SequenceSet(s) => Ok(s.sequences().to_vec()),
    }
}

fn shape_like<V: BaseValue>(original: &Temporal<V>, pieces: Vec<TSequence<V>>) -> Result<Option<Temporal<V>>> {
    if pieces.is_empty() {
        return Ok(None);
    }
    match original {
        Temporal::Instant(_) => Ok(Some(Temporal::Instant(pieces[0].start_instant().clone()))),
        Temporal::InstantSet(_) => {
            let instants: Vec<TInstant<V>> = pieces.iter().map(|p| p.start_instant().clone()).collect();
            Ok(Some(Temporal::InstantSet(TInstantSet::new(instants)?)))
        }
        Temporal::Sequence(_) | Temporal::SequenceSet(_) => {
            if pieces.len() == 1 {
                Ok(Some(Temporal::Sequence(pieces.into_iter().next().unwrap())))
            } else {
                Ok(Some(Temporal::SequenceSet(TSequenceSet::new(pieces)?)))
            }
        }
    }
}

/// Synchronizes `a` and `b` onto their shared time domain (spec §4.8),
/// preserving each side's original duration shape where possible: two
/// `Instant`s synchronize only if their timestamps coincide, two
/// `Sequence`s via [`synchronize_sequences`], and everything else by
/// decomposing into per-instant/per-sequence pieces and recombining the
/// overlapping pairs.
pub fn synchronize<V: BaseValue>(a: &Temporal<V>, b: &Temporal<V>, crossings: bool, kernel: &dyn GeomKernel) -> Result<Option<(Temporal<V>, Temporal<V>)>> {
    let pieces_a = as_pieces(a, kernel)?;
    let pieces_b = as_pieces(b, kernel)?;

    let mut out_a = Vec::new();
    let mut out_b = Vec::new();
    for pa in &pieces_a {
        for pb in &pieces_b {
            if !pa.period().overlaps(&pb.period()) {
                continue;
            }
            if let Some((sa, sb)) = synchronize_sequences(pa, pb, crossings, kernel)? {
                out_a.push(sa);
                out_b.push(sb);
            }
        }
    }

    match (shape_like(a, out_a)?, shape_like(b, out_b)?) {
        (Some(ra), Some(rb)) => Ok(Some((ra, rb))),
        _ => Ok(None),
    }
}

/// Applies a pointwise binary operator over the synchronized domain of
/// `a` and `b` (spec §4.8 lifting), reinstalling the result with
/// `interp` as the interpolation of any continuous pieces produced.
pub fn lift<V, R>(
    a: &Temporal<V>,
    b: &Temporal<V>,
    op: impl Fn(&V, &V) -> Result<R>,
    crossings: bool,
    interp: Interpolation,
    kernel: &dyn GeomKernel,
) -> Result<Option<Temporal<R>>>
where
    V: BaseValue,
    R: BaseValue,
{
    let Some((sa, sb)) = synchronize(a, b, crossings, kernel)? else {
        return Ok(None);
    };
    apply_pointwise(&sa, &sb, &op, interp, kernel)
}

fn apply_pointwise<V, R>(sa: &Temporal<V>, sb: &Temporal<V>, op: &impl Fn(&V, &V) -> Result<R>, interp: Interpolation, kernel: &dyn GeomKernel) -> Result<Option<Temporal<R>>>
where
    V: BaseValue,
    R: BaseValue,
{
    match (sa, sb) {
        (Temporal::Instant(ia), Temporal::Instant(ib)) => {
            let r = op(ia.value(), ib.value())?;
            Ok(Some(Temporal::Instant(TInstant::new(r, ia.timestamp()))))
        }
        (Temporal::InstantSet(ia), Temporal::InstantSet(ib)) => {
            let instants: Result<Vec<TInstant<R>>> = ia
                .instants()
                .iter()
                .zip(ib.instants())
                .map(|(x, y)| Ok(TInstant::new(op(x.value(), y.value())?, x.timestamp())))
                .collect();
            Ok(Some(Temporal::InstantSet(TInstantSet::new(instants?)?)))
        }
        (Temporal::Sequence(sa), Temporal::Sequence(sb)) => {
            let instants: Result<Vec<TInstant<R>>> = sa
                .instants()
                .iter()
                .zip(sb.instants())
                .map(|(x, y)| Ok(TInstant::new(op(x.value(), y.value())?, x.timestamp())))
                .collect();
            let period = sa.period();
            let seq = TSequence::new(instants?, period.is_lower_inclusive(), period.is_upper_inclusive(), interp, true, kernel)?;
            Ok(Some(Temporal::Sequence(seq)))
        }
        (Temporal::SequenceSet(sa), Temporal::SequenceSet(sb)) => {
            let mut pieces = Vec::new();
            for (a_seq, b_seq) in sa.sequences().iter().zip(sb.sequences()) {
                let instants: Result<Vec<TInstant<R>>> = a_seq
                    .instants()
                    .iter()
                    .zip(b_seq.instants())
                    .map(|(x, y)| Ok(TInstant::new(op(x.value(), y.value())?, x.timestamp())))
                    .collect();
                let period = a_seq.period();
                pieces.push(TSequence::new(instants?, period.is_lower_inclusive(), period.is_upper_inclusive(), interp, true, kernel)?);
            }
            if pieces.is_empty() {
                Ok(None)
            } else if pieces.len() == 1 {
                Ok(Some(Temporal::Sequence(pieces.into_iter().next().unwrap())))
            } else {
                Ok(Some(Temporal::SequenceSet(TSequenceSet::new(pieces)?)))
            }
        }
        _ => Err(Error::Internal("synchronize produced mismatched shapes on either side".into())),
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
    fn synchronize_sequences_inserts_crossing() {
        let k = PlanarKernel;
        let a = TSequence::new(vec![TInstant::new(0.0f64, ts(0)), TInstant::new(4.0f64, ts(4))], true, true, Interpolation::Linear, false, &k)
            .unwrap();
        let b = TSequence::new(vec![TInstant::new(3.0f64, ts(0)), TInstant::new(1.0f64, ts(4))], true, true, Interpolation::Linear, false, &k)
            .unwrap();
        let (sa, sb) = synchronize_sequences(&a, &b, true, &k).unwrap().unwrap();
        assert_eq!(sa.num_instants(), 3);
        assert_eq!(sb.num_instants(), 3);
        let mid_a = sa.instants()[1].value();
        let mid_b = sb.instants()[1].value();
        assert!((mid_a - mid_b).abs() < 1e-9);
    }

    #[test]
    fn lift_sums_two_sequences() {
        let k = PlanarKernel;
        let a = TSequence::new(vec![TInstant::new(1.0f64, ts(0)), TInstant::new(3.0f64, ts(10))], true, true, Interpolation::Linear, false, &k)
            .unwrap();
        let b = TSequence::new(vec![TInstant::new(2.0f64, ts(0)), TInstant::new(2.0f64, ts(10))], true, true, Interpolation::Linear, false, &k)
            .unwrap();
        let sum = lift(&Temporal::Sequence(a), &Temporal::Sequence(b), |x, y| Ok(x + y), false, Interpolation::Linear, &k)
            .unwrap()
            .unwrap();
        assert_eq!(sum.value_at(ts(0), &k).unwrap(), Some(3.0));
        assert_eq!(sum.value_at(ts(10), &k).unwrap(), Some(5.0));
    }
}
