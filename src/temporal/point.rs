//! Length, speed and cumulative-length derivations for point-valued
//! temporal values (spec §10 supplement, grounded on
//! `point/src/TempDistance.c` in the original engine). These are plain
//! derivations over an already-built `Temporal<GeomPoint>`/`GeogPoint`,
//! not a fifth duration variant.

use crate::collections::datetime::Timestamp;
use crate::error::{Error, Result};
use crate::geom::GeomKernel;
use crate::temporal::{Interpolation, TInstant, TSequence, Temporal};
use crate::value::{GeogPoint, GeomPoint};

/// Planar distance between two consecutive instants, honoring `z` when
/// both carry one (spec §4.10: `distance_2d`/`distance_3d`).
fn segment_distance(a: &GeomPoint, b: &GeomPoint, kernel: &dyn GeomKernel) -> f64 {
    if a.has_z() && b.has_z() { kernel.distance_3d(*a, *b) } else { kernel.distance_2d(*a, *b) }
}

/// Total length traced by a point-valued temporal value (spec §10
/// `TPoint::length`, from `TempDistance.c`). `Step`-interpolated
/// sequences contribute zero length per segment: a step never actually
/// traverses the straight line to its next value, it jumps.
pub fn length(value: &Temporal<GeomPoint>, kernel: &dyn GeomKernel) -> f64 {
    let sequences: Vec<&TSequence<GeomPoint>> = match value {
        Temporal::Sequence(s) => vec![s],
        Temporal::SequenceSet(s) => s.sequences().iter().collect(),
        Temporal::Instant(_) | Temporal::InstantSet(_) => return 0.0,
    };
    let mut total = 0.0;
    for seq in sequences {
        if seq.interpolation() != Interpolation::Linear {
            continue;
        }
        for w in seq.instants().windows(2) {
            total += segment_distance(w[0].value(), w[1].value(), kernel);
        }
    }
    total
}

/// Geodetic counterpart of [`length`], using great-circle distance per
/// segment (spec §10 `TPoint::length`, geography case). Takes `_kernel`
/// only for signature symmetry with [`length`]; great-circle distance
/// needs no kernel round trip.
pub fn geo_length(value: &Temporal<GeogPoint>, _kernel: &dyn GeomKernel) -> f64 {
    let sequences: Vec<&TSequence<GeogPoint>> = match value {
        Temporal::Sequence(s) => vec![s],
        Temporal::SequenceSet(s) => s.sequences().iter().collect(),
        Temporal::Instant(_) | Temporal::InstantSet(_) => return 0.0,
    };
    let mut total = 0.0;
    for seq in sequences {
        if seq.interpolation() != Interpolation::Linear {
            continue;
        }
        for w in seq.instants().windows(2) {
            total += w[0].value().haversine_distance(w[1].value());
        }
    }
    total
}

/// Running length-so-far as a `Step` temporal float, one change point per
/// source instant (spec §10 `TPoint::cumulativeLength`). Each piece
/// restarts from the running total carried in from prior pieces of a
/// `SequenceSet`, matching a single traveler whose odometer never resets
/// at a gap.
pub fn cumulative_length(value: &Temporal<GeomPoint>, kernel: &dyn GeomKernel) -> Result<Temporal<f64>> {
    let sequences: Vec<&TSequence<GeomPoint>> = match value {
        Temporal::Sequence(s) => vec![s],
        Temporal::SequenceSet(s) => s.sequences().iter().collect(),
        Temporal::Instant(i) => return Ok(Temporal::Instant(TInstant::new(0.0, i.timestamp()))),
        Temporal::InstantSet(s) => {
            let instants = s.instants().iter().map(|i| TInstant::new(0.0, i.timestamp())).collect();
            return Ok(Temporal::InstantSet(crate::temporal::TInstantSet::new(instants)?));
        }
    };

    let mut running = 0.0;
    let mut pieces = Vec::with_capacity(sequences.len());
    for seq in &sequences {
        let mut out = Vec::with_capacity(seq.num_instants());
        out.push(TInstant::new(running, seq.instants()[0].timestamp()));
        if seq.interpolation() == Interpolation::Linear {
            for w in seq.instants().windows(2) {
                running += segment_distance(w[0].value(), w[1].value(), kernel);
                out.push(TInstant::new(running, w[1].timestamp()));
            }
        } else {
            for i in &seq.instants()[1..] {
                out.push(TInstant::new(running, i.timestamp()));
            }
        }
        let p = seq.period();
        pieces.push(TSequence::new(out, p.is_lower_inclusive(), p.is_upper_inclusive(), Interpolation::Step, true, kernel)?);
    }
    match pieces.len() {
        1 => Ok(Temporal::Sequence(pieces.into_iter().next().unwrap())),
        _ => Ok(Temporal::SequenceSet(crate::temporal::TSequenceSet::new(pieces)?)),
    }
}

/// Instantaneous speed per segment as a `Step` temporal float: constant
/// `distance / duration` across each pair of consecutive instants (spec
/// §10 `TPoint::speed`). Fails (`Error::InvalidArgument`) on a
/// zero-duration segment, and (`Error::UnsupportedInterpolation`) on a
/// non-`Linear` piece, since a step's speed between its jumps is not
/// defined.
pub fn speed(value: &Temporal<GeomPoint>, kernel: &dyn GeomKernel) -> Result<Temporal<f64>> {
    let sequences: Vec<&TSequence<GeomPoint>> = match value {
        Temporal::Sequence(s) => vec![s],
        Temporal::SequenceSet(s) => s.sequences().iter().collect(),
        Temporal::Instant(_) | Temporal::InstantSet(_) => return Err(Error::UnsupportedInterpolation),
    };

    let mut pieces = Vec::new();
    for seq in sequences {
        if seq.interpolation() != Interpolation::Linear {
            return Err(Error::UnsupportedInterpolation);
        }
        if seq.num_instants() < 2 {
            continue;
        }
        let mut out = Vec::with_capacity(seq.num_instants() - 1);
        for w in seq.instants().windows(2) {
            let dt = duration_seconds(w[0].timestamp(), w[1].timestamp());
            if dt <= 0.0 {
                return Err(Error::InvalidArgument("speed requires strictly increasing timestamps".into()));
            }
            let v = segment_distance(w[0].value(), w[1].value(), kernel) / dt;
            out.push(TInstant::new(v, w[0].timestamp()));
        }
        // Step value holds until the segment's end, then the sequence ends;
        // a dangling last-instant speed has no following segment to report.
        let last_t = seq.instants().last().unwrap().timestamp();
        let last_v = *out.last().unwrap().value();
        out.push(TInstant::new(last_v, last_t));
        let p = seq.period();
        pieces.push(TSequence::new(out, p.is_lower_inclusive(), p.is_upper_inclusive(), Interpolation::Step, true, kernel)?);
    }
    match pieces.len() {
        0 => Err(Error::UnsupportedInterpolation),
        1 => Ok(Temporal::Sequence(pieces.into_iter().next().unwrap())),
        _ => Ok(Temporal::SequenceSet(crate::temporal::TSequenceSet::new(pieces)?)),
    }
}

fn duration_seconds(a: Timestamp, b: Timestamp) -> f64 {
    (b.as_micros() - a.as_micros()) as f64 / 1_000_000.0
}

/// Lifted `dwithin`/`intersects` spatial predicates (spec §10, grounded
/// on `point/src/SpatialRels.c`): true if the two point paths ever come
/// within `distance` of each other, resp. ever cross, over their shared
/// time frame. Delegates the crossing search to the already-synchronized
/// segment pairs rather than re-deriving trajectory math here.
pub fn ever_dwithin(a: &Temporal<GeomPoint>, b: &Temporal<GeomPoint>, distance: f64, kernel: &dyn GeomKernel) -> Result<bool> {
    let Some((sa, sb)) = crate::temporal::sync::synchronize(a, b, true, kernel)? else {
        return Ok(false);
    };
    let pairs_a = collect_instants(&sa);
    let pairs_b = collect_instants(&sb);
    for (ia, ib) in pairs_a.iter().zip(pairs_b.iter()) {
        if kernel.dwithin(*ia.value(), *ib.value(), distance) {
            return Ok(true);
        }
    }
    Ok(false)
}

fn collect_instants(t: &Temporal<GeomPoint>) -> Vec<TInstant<GeomPoint>> {
    match t {
        Temporal::Instant(i) => vec![i.clone()],
        Temporal::InstantSet(s) => s.instants().to_vec(),
        Temporal::Sequence(s) => s.instants().to_vec(),
        Temporal::SequenceSet(s) => s.sequences().iter().flat_map(|seq| seq.instants().to_vec()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::PlanarKernel;

    fn ts(v: i64) -> Timestamp {
        Timestamp::from_micros(v)
    }

    fn straight_line(kernel: &dyn GeomKernel) -> Temporal<GeomPoint> {
        let seq = TSequence::new(
            vec![
                TInstant::new(GeomPoint::xy(0.0, 0.0, 0), ts(0)),
                TInstant::new(GeomPoint::xy(3.0, 4.0, 0), ts(10_000_000)),
            ],
            true,
            true,
            Interpolation::Linear,
            false,
            kernel,
        )
        .unwrap();
        Temporal::Sequence(seq)
    }

    #[test]
    fn length_of_straight_segment() {
        let k = PlanarKernel;
        assert!((length(&straight_line(&k), &k) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn speed_is_distance_over_time() {
        let k = PlanarKernel;
        let s = speed(&straight_line(&k), &k).unwrap();
        match s {
            Temporal::Sequence(seq) => assert!((seq.instants()[0].value() - 0.5).abs() < 1e-9),
            _ => panic!("expected Sequence"),
        }
    }

    #[test]
    fn cumulative_length_reaches_total_at_end() {
        let k = PlanarKernel;
        let c = cumulative_length(&straight_line(&k), &k).unwrap();
        match c {
            Temporal::Sequence(seq) => assert!((seq.instants().last().unwrap().value() - 5.0).abs() < 1e-9),
            _ => panic!("expected Sequence"),
        }
    }
}
