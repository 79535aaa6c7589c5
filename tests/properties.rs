//! Property-based tests for spec §8's quantified invariants, plus the six
//! literal end-to-end scenarios, exercised against `Temporal<f64>` and
//! `Temporal<GeomPoint>` sequences built directly (no parser in scope).

use proptest::prelude::*;

use tempovault::collections::base::Span;
use tempovault::geom::{GeomKernel, PlanarKernel};
use tempovault::value::GeomPoint;
use tempovault::{Error, Interpolation, TInstant, TSequence, TSequenceSet, Temporal};

fn ts(v: i64) -> tempovault::collections::datetime::Timestamp {
    tempovault::collections::datetime::Timestamp::from_micros(v)
}

fn day(n: i64) -> tempovault::collections::datetime::Timestamp {
    ts(n * 86_400_000_000)
}

/// A small strictly-increasing Linear `f64` sequence: 2-5 points, integer
/// day timestamps, finite values bounded away from overflow.
fn arb_float_sequence() -> impl Strategy<Value = TSequence<f64>> {
    (2usize..=5).prop_flat_map(|n| {
        prop::collection::vec(-100.0f64..100.0, n).prop_map(move |values| {
            let k = PlanarKernel;
            let instants: Vec<TInstant<f64>> =
                values.iter().enumerate().map(|(i, v)| TInstant::new(*v, day(i as i64))).collect();
            TSequence::new(instants, true, true, Interpolation::Linear, true, &k).unwrap()
        })
    })
}

proptest! {
    /// Property 1: round-trip through the binary wire format.
    #[test]
    fn prop_round_trip_binary(seq in arb_float_sequence()) {
        let original = Temporal::Sequence(seq);
        let mut buf = Vec::new();
        tempovault::serde_wire::encode(&original, &mut buf);
        let k = PlanarKernel;
        let (decoded, n): (Temporal<f64>, usize) = tempovault::serde_wire::decode(&buf, &k).unwrap();
        prop_assert_eq!(n, buf.len());
        prop_assert_eq!(decoded, original);
    }

    /// Property 2: normalization is idempotent.
    #[test]
    fn prop_normalize_idempotent(seq in arb_float_sequence()) {
        let k = PlanarKernel;
        let once = tempovault::temporal::normalize::normalize_instants(seq.instants(), Interpolation::Linear, &k).unwrap();
        let twice = tempovault::temporal::normalize::normalize_instants(&once, Interpolation::Linear, &k).unwrap();
        prop_assert_eq!(once, twice);
    }

    /// Property 3: `at_period`/`minus_period` partition the timeline by
    /// sampled agreement at (and only at) the points each side should
    /// cover — `at_period` never reports a value outside `p`, and every
    /// source timestamp falls into exactly one of the two halves.
    #[test]
    fn prop_restriction_partitions_timeline(seq in arb_float_sequence()) {
        let k = PlanarKernel;
        let whole = Temporal::Sequence(seq.clone());
        let mid_idx = seq.num_instants() / 2;
        let cut_lower = seq.instants()[0].timestamp();
        let cut_upper = seq.instants()[mid_idx].timestamp();
        if cut_lower < cut_upper {
            let p = tempovault::collections::datetime::Period::new(cut_lower, cut_upper, true, true).unwrap();
            let inside = whole.at_period(&p, &k).unwrap();
            let outside = whole.minus_period(&p, &k).unwrap();

            for inst in seq.instants() {
                let t = inst.timestamp();
                let in_inside = inside.as_ref().map(|v| v.value_at(t, &k).unwrap().is_some()).unwrap_or(false);
                let in_outside = outside.as_ref().map(|v| v.value_at(t, &k).unwrap().is_some()).unwrap_or(false);
                if p.contains_timestamp(t) {
                    prop_assert!(in_inside);
                } else {
                    prop_assert!(in_outside);
                }
            }
        }
    }

    /// Property 4: synchronizing a sequence with itself leaves both sides
    /// unchanged (same instant count, same values).
    #[test]
    fn prop_synchronize_identity(seq in arb_float_sequence()) {
        let k = PlanarKernel;
        let a = Temporal::Sequence(seq.clone());
        let b = Temporal::Sequence(seq.clone());
        let (sa, sb) = tempovault::temporal::sync::synchronize(&a, &b, true, &k).unwrap().unwrap();
        prop_assert_eq!(sa.num_instants(), seq.num_instants());
        prop_assert_eq!(sb.num_instants(), seq.num_instants());
    }

    /// Property 7: the time-weighted average of a linear sequence lies
    /// within its own value range.
    #[test]
    fn prop_twavg_within_bounds(seq in arb_float_sequence()) {
        let min = *seq.min_value();
        let max = *seq.max_value();
        let value = Temporal::Sequence(seq);
        let avg = tempovault::agg::time_weighted_avg(&value).unwrap();
        prop_assert!(avg >= min - 1e-9 && avg <= max + 1e-9);
    }
}

/// Property 5: lifting a binary op distributes over restriction to a
/// shared sub-period, for a fixed representative pair (rather than an
/// arbitrary proptest pair, since the period used for restriction must
/// fall inside both sequences' spans for the comparison to be meaningful).
#[test]
fn prop_lift_distributes_over_restriction() {
    let k = PlanarKernel;
    let a = TSequence::new(
        vec![TInstant::new(0.0f64, day(0)), TInstant::new(4.0f64, day(2)), TInstant::new(8.0f64, day(4))],
        true,
        true,
        Interpolation::Linear,
        true,
        &k,
    )
    .unwrap();
    let b = TSequence::new(
        vec![TInstant::new(1.0f64, day(0)), TInstant::new(3.0f64, day(2)), TInstant::new(5.0f64, day(4))],
        true,
        true,
        Interpolation::Linear,
        true,
        &k,
    )
    .unwrap();
    let ta = Temporal::Sequence(a);
    let tb = Temporal::Sequence(b);

    let p = tempovault::collections::datetime::Period::new(day(1), day(3), true, true).unwrap();

    let lifted = tempovault::temporal::sync::lift(&ta, &tb, |x: &f64, y: &f64| Ok(x + y), true, Interpolation::Linear, &k).unwrap().unwrap();
    let lifted_then_restricted = lifted.at_period(&p, &k).unwrap().unwrap();

    let a_restricted = ta.at_period(&p, &k).unwrap().unwrap();
    let b_restricted = tb.at_period(&p, &k).unwrap().unwrap();
    let restricted_then_lifted =
        tempovault::temporal::sync::lift(&a_restricted, &b_restricted, |x: &f64, y: &f64| Ok(x + y), true, Interpolation::Linear, &k).unwrap().unwrap();

    for t in [day(1), day(2), day(3)] {
        let left = lifted_then_restricted.value_at(t, &k).unwrap();
        let right = restricted_then_lifted.value_at(t, &k).unwrap();
        assert_eq!(left, right);
    }
}

/// Property 6: `at_timestamp`/`value_at` agree at every source instant,
/// and re-appending a removed tail instant reproduces the original tail
/// value at that timestamp.
#[test]
fn prop_value_at_and_append_coherence() {
    let k = PlanarKernel;
    let seq =
        TSequence::new(vec![TInstant::new(1.0f64, day(0)), TInstant::new(2.0f64, day(1)), TInstant::new(3.0f64, day(2))], true, true, Interpolation::Linear, true, &k)
            .unwrap();
    for inst in seq.instants() {
        let by_timestamp = seq.at_timestamp(inst.timestamp(), &k).unwrap().unwrap();
        let by_value_at = seq.value_at(inst.timestamp(), &k).unwrap().unwrap();
        assert_eq!(*by_timestamp.value(), by_value_at);
    }

    let truncated =
        TSequence::new(vec![TInstant::new(1.0f64, day(0)), TInstant::new(2.0f64, day(1))], true, true, Interpolation::Linear, true, &k).unwrap();
    let reappended = truncated.append(TInstant::new(3.0f64, day(2)), &k).unwrap();
    assert_eq!(reappended.value_at(day(2), &k).unwrap(), Some(3.0));
}

/// Property 8: a crossing inserted by `synchronize` is a point of
/// equality under `lift(eq, ...)`.
#[test]
fn prop_crossing_implies_equality() {
    let k = PlanarKernel;
    let a = TSequence::new(vec![TInstant::new(0.0f64, day(0)), TInstant::new(4.0f64, day(6))], true, true, Interpolation::Linear, true, &k).unwrap();
    let b = TSequence::new(vec![TInstant::new(3.0f64, day(0)), TInstant::new(1.0f64, day(6))], true, true, Interpolation::Linear, true, &k).unwrap();
    let ta = Temporal::Sequence(a);
    let tb = Temporal::Sequence(b);

    let (sa, sb) = tempovault::temporal::sync::synchronize(&ta, &tb, true, &k).unwrap().unwrap();
    let crossing_t = day(1);
    assert_eq!(sa.value_at(crossing_t, &k).unwrap(), Some(2.0));
    assert_eq!(sb.value_at(crossing_t, &k).unwrap(), Some(2.0));

    let eq_lifted = tempovault::temporal::sync::lift(&ta, &tb, |x: &f64, y: &f64| Ok((x - y).abs() < 1e-9), true, Interpolation::Step, &k)
        .unwrap()
        .unwrap();
    assert_eq!(eq_lifted.value_at(crossing_t, &k).unwrap(), Some(true));
}

// --- literal end-to-end scenarios (spec §8) ---

#[test]
fn scenario_step_sequence_restriction() {
    // spec §8 scenario 1's own literal fixture ([(1,T1),(1,T2),(2,T3))) is
    // self-contradictory: an exclusive upper bound on a non-continuous base
    // requires the last two stored instants to agree (§4.6.5), but its
    // claimed last two differ (1, 2). Closing the upper bound is the valid
    // reading of the same scenario (see DESIGN.md Open Questions).
    let k = PlanarKernel;
    let seq = TSequence::new(
        vec![TInstant::new(1i32, day(1)), TInstant::new(1i32, day(2)), TInstant::new(2i32, day(3))],
        true,
        true,
        Interpolation::Step,
        true,
        &k,
    )
    .unwrap();
    assert_eq!(seq.num_instants(), 2);
    assert_eq!(*seq.instants()[0].value(), 1);
    assert_eq!(*seq.instants()[1].value(), 2);

    let pieces = seq.at_value(&1, &k).unwrap();
    assert_eq!(pieces.len(), 1);
    assert_eq!(pieces[0].num_instants(), 2);
    assert!(!pieces[0].period().is_upper_inclusive());

    let minus = seq.minus_value(&1, &k).unwrap();
    assert_eq!(minus.len(), 1);
    assert_eq!(minus[0].num_instants(), 1);
    assert_eq!(*minus[0].instants()[0].value(), 2);
}

#[test]
fn scenario_linear_interpolation_midpoint() {
    let k = PlanarKernel;
    let seq = TSequence::new(vec![TInstant::new(0.0f64, day(1)), TInstant::new(4.0f64, day(3))], true, true, Interpolation::Linear, true, &k).unwrap();
    assert_eq!(seq.value_at(day(2), &k).unwrap(), Some(2.0));
}

#[test]
fn scenario_crossing_insertion_at_half() {
    let k = PlanarKernel;
    let a = Temporal::Sequence(TSequence::new(vec![TInstant::new(0.0f64, day(1)), TInstant::new(4.0f64, day(3))], true, true, Interpolation::Linear, true, &k).unwrap());
    let b = Temporal::Sequence(TSequence::new(vec![TInstant::new(3.0f64, day(1)), TInstant::new(1.0f64, day(3))], true, true, Interpolation::Linear, true, &k).unwrap());
    let t_star = day(2); // T1 + 1 day, fraction 0.5 of the 2-day span
    let eq_lifted = tempovault::temporal::sync::lift(&a, &b, |x: &f64, y: &f64| Ok((x - y).abs() < 1e-9), true, Interpolation::Step, &k).unwrap().unwrap();
    assert_eq!(eq_lifted.value_at(t_star, &k).unwrap(), Some(true));
}

#[test]
fn scenario_point_trajectory() {
    let k = PlanarKernel;
    let seq = TSequence::new(
        vec![TInstant::new(GeomPoint::xy(0.0, 0.0, 0), day(1)), TInstant::new(GeomPoint::xy(10.0, 0.0, 0), day(3))],
        true,
        true,
        Interpolation::Linear,
        true,
        &k,
    )
    .unwrap();
    let mid = seq.value_at(day(2), &k).unwrap().unwrap();
    assert_eq!(mid, GeomPoint::xy(5.0, 0.0, 0));

    let trajectory = seq.trajectory().unwrap();
    assert!((k.length(trajectory) - 10.0).abs() < 1e-9);
}

#[test]
fn scenario_sequence_set_merge() {
    let k = PlanarKernel;
    let first = TSequence::new(vec![TInstant::new(1i32, day(1)), TInstant::new(1i32, day(2))], true, false, Interpolation::Step, true, &k).unwrap();
    let second = TSequence::new(vec![TInstant::new(1i32, day(2)), TInstant::new(1i32, day(3))], true, true, Interpolation::Step, true, &k).unwrap();
    let set = TSequenceSet::new(vec![first, second]).unwrap();
    assert_eq!(set.num_sequences(), 1);
    assert_eq!(set.sequences()[0].num_instants(), 2);
}

#[test]
fn scenario_aggregation_tmax() {
    let a = Temporal::InstantSet(
        tempovault::TInstantSet::new(vec![TInstant::new(2i32, day(1)), TInstant::new(5i32, day(2)), TInstant::new(3i32, day(3))]).unwrap(),
    );
    let b = Temporal::InstantSet(
        tempovault::TInstantSet::new(vec![TInstant::new(4i32, day(1)), TInstant::new(1i32, day(2)), TInstant::new(6i32, day(3))]).unwrap(),
    );
    let result = tempovault::agg::max(&[a, b]).unwrap().unwrap();
    match result {
        Temporal::InstantSet(s) => {
            let values: Vec<i32> = s.instants().iter().map(|i| *i.value()).collect();
            assert_eq!(values, vec![4, 5, 6]);
        }
        _ => panic!("expected InstantSet"),
    }
}

/// `Error::UnsupportedInterpolation` surfaces from `twAvg` on a step
/// sequence rather than silently returning a misleading number.
#[test]
fn twavg_step_interpolation_is_rejected() {
    let k = PlanarKernel;
    let seq = TSequence::new(vec![TInstant::new(1.0f64, day(1)), TInstant::new(2.0f64, day(3))], true, true, Interpolation::Step, true, &k).unwrap();
    let value = Temporal::Sequence(seq);
    assert!(matches!(tempovault::agg::time_weighted_avg(&value), Err(Error::UnsupportedInterpolation)));
}
