use crate::collections::base::{Collection, Span};
use crate::collections::datetime::{Period, Timestamp};
use crate::error::{Error, Result};
use crate::geom::{GeomKernel, Line};
use crate::value::{check_uniform_spatial_key, BaseValue};

use super::instant::TInstant;
use super::interpolation::Interpolation;
use super::normalize::normalize_instants;

/// A continuous piecewise-defined run of instants (spec §4.6) — the
/// hardest component of the algebra. `instants` are strictly increasing;
/// `period` carries the two bound-inclusivity flags; `interp` selects
/// Step or Linear (Linear has no effect unless `V::CONTINUOUS`).
#[derive(Debug, Clone, PartialEq)]
pub struct TSequence<V: BaseValue> {
    instants: Vec<TInstant<V>>,
    period: Period,
    interp: Interpolation,
    value_bbox: Option<(f64, f64)>,
    trajectory: Option<Line>,
}

impl<V: BaseValue> TSequence<V> {
    /// Validates and (if `normalize`) canonicalizes `instants` (spec
    /// §4.6.6): non-empty, strictly increasing times, uniform spatial
    /// key, instantaneous sequences closed on both sides, and the §4.6.5
    /// bound-truncation rule for a non-continuous base with an exclusive
    /// upper bound.
    pub fn new(
        instants: Vec<TInstant<V>>,
        lower_inc: bool,
        upper_inc: bool,
        interp: Interpolation,
        normalize: bool,
        kernel: &dyn GeomKernel,
    ) -> Result<Self> {
        if instants.is_empty() {
            log::warn!("rejecting Sequence construction: no instants given");
            return Err(Error::InvalidArgument("Sequence requires at least one instant".into()));
        }
        if instants.windows(2).any(|w| w[0].timestamp() >= w[1].timestamp()) {
            log::warn!("rejecting Sequence construction: timestamps not strictly increasing");
            return Err(Error::InvalidArgument("Sequence timestamps must be strictly increasing".into()));
        }
        let values: Vec<V> = instants.iter().map(|i| i.value().clone()).collect();
        check_uniform_spatial_key(&values)?;
        if instants.len() == 1 && !(lower_inc && upper_inc) {
            return Err(Error::InvalidArgument("an instantaneous sequence must be closed on both sides".into()));
        }

        let before = instants.len();
        let instants = if normalize { normalize_instants(&instants, interp, kernel)? } else { instants };
        if normalize && instants.len() < before {
            log::debug!("normalize_instants collapsed {before} instants down to {}", instants.len());
        }

        if !upper_inc && !V::CONTINUOUS && instants.len() >= 2 {
            let last = &instants[instants.len() - 1];
            let prev = &instants[instants.len() - 2];
            if !last.value().base_eq(prev.value()) {
                log::warn!("rejecting Sequence construction: non-continuous base with exclusive upper bound whose last two instants differ");
                return Err(Error::NonContinuousExclusiveUpperBound);
            }
        }

        let period = Period::new(instants[0].timestamp(), instants.last().unwrap().timestamp(), lower_inc, upper_inc)?;
        let value_bbox = numeric_bbox(&instants);
        let trajectory = build_trajectory(&instants);

        Ok(TSequence { instants, period, interp, value_bbox, trajectory })
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

    pub fn period(&self) -> Period {
        self.period
    }

    pub fn interpolation(&self) -> Interpolation {
        self.interp
    }

    pub fn value_bbox(&self) -> Option<(f64, f64)> {
        self.value_bbox
    }

    pub fn trajectory(&self) -> Option<&Line> {
        self.trajectory.as_ref()
    }

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

    fn find_exact(&self, t: Timestamp) -> Option<usize> {
        self.instants.binary_search_by_key(&t, |i| i.timestamp()).ok()
    }

    /// Index `i` of the unique segment `(inst[i], inst[i+1])` with
    /// `inst[i].t < t < inst[i+1].t`. Caller must have already ruled out
    /// an exact match and verified `t` is inside `self.period`.
    fn find_segment(&self, t: Timestamp) -> Option<usize> {
        let idx = self.instants.partition_point(|inst| inst.timestamp() <= t);
        if idx == 0 || idx >= self.instants.len() {
            None
        } else {
            Some(idx - 1)
        }
    }

    /// Spec §4.6.1: evaluates the sequence at `t`, interpolating inside a
    /// segment under the interpolation in effect.
    pub fn value_at(&self, t: Timestamp, kernel: &dyn GeomKernel) -> Result<Option<V>> {
        if !self.period.contains_timestamp(t) {
            return Ok(None);
        }
        if self.instants.len() == 1 {
            return Ok(Some(self.instants[0].value().clone()));
        }
        if let Some(i) = self.find_exact(t) {
            return Ok(Some(self.instants[i].value().clone()));
        }
        let idx = self
            .find_segment(t)
            .ok_or_else(|| Error::Internal("timestamp inside period but no covering segment".into()))?;
        let (a, b) = (&self.instants[idx], &self.instants[idx + 1]);
        match self.interp.effective(V::CONTINUOUS) {
            Interpolation::Step => Ok(Some(a.value().clone())),
            Interpolation::Linear => {
                let total = (b.timestamp().as_micros() - a.timestamp().as_micros()) as f64;
                let fraction = (t.as_micros() - a.timestamp().as_micros()) as f64 / total;
                Ok(Some(V::interpolate(a.value(), b.value(), fraction, kernel)?))
            }
        }
    }

    pub fn at_timestamp(&self, t: Timestamp, kernel: &dyn GeomKernel) -> Result<Option<TInstant<V>>> {
        Ok(self.value_at(t, kernel)?.map(|v| TInstant::new(v, t)))
    }

    /// Splits at `t` into 0, 1, or 2 pieces with adjusted bound
    /// inclusivity (spec §4.6.7), expressed via [`Self::at_period`].
    pub fn minus_timestamp(&self, t: Timestamp, kernel: &dyn GeomKernel) -> Result<Vec<Self>> {
        if !self.period.contains_timestamp(t) {
            return Ok(vec![self.clone()]);
        }
        let left = Period::new(self.period.lower(), t, self.period.is_lower_inclusive(), false).ok();
        let right = Period::new(t, self.period.upper(), false, self.period.is_upper_inclusive()).ok();

        let mut out = Vec::new();
        if let Some(lp) = left {
            if let Some(seq) = self.at_period(&lp, kernel)? {
                out.push(seq);
            }
        }
        if let Some(rp) = right {
            if let Some(seq) = self.at_period(&rp, kernel)? {
                out.push(seq);
            }
        }
        Ok(out)
    }

    /// Intersects `self.period` with `p`, interpolating new endpoints
    /// when the cut falls strictly inside a segment (spec §4.6.7).
    pub fn at_period(&self, p: &Period, kernel: &dyn GeomKernel) -> Result<Option<Self>> {
        let Some(inter) = self.period.intersection(p) else {
            return Ok(None);
        };

        let mut out_instants = Vec::new();
        if inter.is_lower_inclusive() {
            if let Some(v) = self.value_at(inter.lower(), kernel)? {
                out_instants.push(TInstant::new(v, inter.lower()));
            }
        }
        for inst in &self.instants {
            if inst.timestamp() > inter.lower() && inst.timestamp() < inter.upper() {
                out_instants.push(inst.clone());
            }
        }
        if inter.is_upper_inclusive() && inter.upper() != inter.lower() {
            if let Some(v) = self.value_at(inter.upper(), kernel)? {
                out_instants.push(TInstant::new(v, inter.upper()));
            }
        }

        if out_instants.is_empty() {
            return Ok(None);
        }

        let (lower_inc, upper_inc) = if out_instants.len() == 1 {
            (true, true)
        } else {
            (inter.is_lower_inclusive(), inter.is_upper_inclusive())
        };

        Ok(Some(Self::new(out_instants, lower_inc, upper_inc, self.interp, true, kernel)?))
    }

    /// Complement of `at_period` within `self.period`: at most 2 pieces.
    pub fn minus_period(&self, p: &Period, kernel: &dyn GeomKernel) -> Result<Vec<Self>> {
        if !self.period.overlaps(p) {
            return Ok(vec![self.clone()]);
        }
        let mut out = Vec::new();
        if self.period.lower() < p.lower() || (self.period.lower() == p.lower() && self.period.is_lower_inclusive() && !p.is_lower_inclusive())
        {
            if let Ok(left) = Period::new(self.period.lower(), p.lower(), self.period.is_lower_inclusive(), !p.is_lower_inclusive()) {
                if let Some(seq) = self.at_period(&left, kernel)? {
                    out.push(seq);
                }
            }
        }
        if self.period.upper() > p.upper() || (self.period.upper() == p.upper() && self.period.is_upper_inclusive() && !p.is_upper_inclusive())
        {
            if let Ok(right) = Period::new(p.upper(), self.period.upper(), !p.is_upper_inclusive(), self.period.is_upper_inclusive()) {
                if let Some(seq) = self.at_period(&right, kernel)? {
                    out.push(seq);
                }
            }
        }
        Ok(out)
    }

    /// Per segment: the whole segment when constant-equal, an instant
    /// when a crossing lies strictly inside, or nothing (spec §4.6.7).
    /// Adjacent same-value pieces are left unmerged here; the
    /// `SequenceSet` constructor performs that merge (spec §4.7).
    pub fn at_value(&self, v: &V, kernel: &dyn GeomKernel) -> Result<Vec<Self>> {
        let mut out = Vec::new();
        let effective = self.interp.effective(V::CONTINUOUS);
        let n = self.instants.len();

        if n == 1 {
            if self.instants[0].value().base_eq(v) {
                out.push(self.clone());
            }
            return Ok(out);
        }

        for i in 0..n - 1 {
            let a = &self.instants[i];
            let b = &self.instants[i + 1];
            let is_last = i == n - 2;

            match effective {
                Interpolation::Step => {
                    if a.value().base_eq(v) {
                        let lower_inc = if i == 0 { self.period.is_lower_inclusive() } else { true };
                        let upper_inc = is_last && self.period.is_upper_inclusive() && b.value().base_eq(v);
                        let pts = vec![TInstant::new(v.clone(), a.timestamp()), TInstant::new(v.clone(), b.timestamp())];
                        out.push(Self::new(pts, lower_inc, upper_inc, self.interp, true, kernel)?);
                    } else if is_last && self.period.is_upper_inclusive() && b.value().base_eq(v) {
                        out.push(Self::new(vec![TInstant::new(v.clone(), b.timestamp())], true, true, self.interp, true, kernel)?);
                    }
                }
                Interpolation::Linear => match (a.value().as_f64(), b.value().as_f64(), v.as_f64()) {
                    (Some(av), Some(bv), Some(tv)) => {
                        if av == bv {
                            if a.value().base_eq(v) {
                                let lower_inc = if i == 0 { self.period.is_lower_inclusive() } else { true };
                                let upper_inc = if is_last { self.period.is_upper_inclusive() } else { true };
                                let pts = vec![a.clone(), b.clone()];
                                out.push(Self::new(pts, lower_inc, upper_inc, self.interp, true, kernel)?);
                            }
                        } else {
                            let frac = (tv - av) / (bv - av);
                            if frac <= 0.0 {
                                if i == 0 && a.value().base_eq(v) {
                                    out.push(Self::new(vec![a.clone()], true, true, self.interp, true, kernel)?);
                                }
                            } else if frac >= 1.0 {
                                if is_last && b.value().base_eq(v) {
                                    out.push(Self::new(vec![b.clone()], true, true, self.interp, true, kernel)?);
                                }
                            } else {
                                let t = interp_time(a.timestamp(), b.timestamp(), frac);
                                let interp_val = V::interpolate(a.value(), b.value(), frac, kernel)?;
                                if interp_val.base_eq(v) {
                                    out.push(Self::new(vec![TInstant::new(v.clone(), t)], true, true, self.interp, true, kernel)?);
                                }
                            }
                        }
                    }
                    _ => {
                        if i == 0 && a.value().base_eq(v) {
                            out.push(Self::new(vec![a.clone()], true, true, self.interp, true, kernel)?);
                        }
                        if is_last && b.value().base_eq(v) {
                            out.push(Self::new(vec![b.clone()], true, true, self.interp, true, kernel)?);
                        }
                    }
                },
            }
        }
        Ok(out)
    }

    /// Symmetric difference of `at_value` within `self.period`.
    pub fn minus_value(&self, v: &V, kernel: &dyn GeomKernel) -> Result<Vec<Self>> {
        let keep = self.at_value(v, kernel)?;
        if keep.is_empty() {
            return Ok(vec![self.clone()]);
        }
        let mut out = vec![self.clone()];
        for piece in &keep {
            let mut next = Vec::new();
            for seq in out {
                next.extend(seq.minus_period(&piece.period(), kernel)?);
            }
            out = next;
        }
        Ok(out)
    }

    /// Segment-wise crossing at `lo`/`hi` followed by a midpoint-inside
    /// test (spec §4.6.7). Numeric bases only.
    pub fn at_range(&self, lo: f64, hi: f64, kernel: &dyn GeomKernel) -> Result<Vec<Self>> {
        if self.instants[0].value().as_f64().is_none() {
            return Err(Error::InvalidArgument("at_range requires a numeric base".into()));
        }
        let mut out = Vec::new();
        let n = self.instants.len();
        if n == 1 {
            let v = self.instants[0].value().as_f64().unwrap();
            if v >= lo && v <= hi {
                out.push(self.clone());
            }
            return Ok(out);
        }

        for i in 0..n - 1 {
            let a = &self.instants[i];
            let b = &self.instants[i + 1];
            let av = a.value().as_f64().unwrap();
            let bv = b.value().as_f64().unwrap();
            let is_last = i == n - 2;

            let mut cuts: Vec<f64> = vec![0.0, 1.0];
            if av != bv {
                for bound in [lo, hi] {
                    let f = (bound - av) / (bv - av);
                    if f > 0.0 && f < 1.0 {
                        cuts.push(f);
                    }
                }
            }
            cuts.sort_by(|x, y| x.partial_cmp(y).unwrap_or(std::cmp::Ordering::Equal));
            cuts.dedup();

            for w in cuts.windows(2) {
                let (f0, f1) = (w[0], w[1]);
                let mid = (f0 + f1) / 2.0;
                let mid_val = av + (bv - av) * mid;
                if mid_val < lo || mid_val > hi {
                    continue;
                }
                let t0 = interp_time(a.timestamp(), b.timestamp(), f0);
                let t1 = interp_time(a.timestamp(), b.timestamp(), f1);
                let v0 = V::interpolate(a.value(), b.value(), f0, kernel)?;
                let v1 = V::interpolate(a.value(), b.value(), f1, kernel)?;
                let lower_inc = if f0 == 0.0 { i == 0 && self.period.is_lower_inclusive() || i > 0 } else { true };
                let upper_inc = if f1 == 1.0 { is_last && self.period.is_upper_inclusive() || !is_last } else { true };
                let pts = vec![TInstant::new(v0, t0), TInstant::new(v1, t1)];
                out.push(Self::new(pts, lower_inc, upper_inc, self.interp, true, kernel)?);
            }
        }
        Ok(out)
    }

    pub fn minus_range(&self, lo: f64, hi: f64, kernel: &dyn GeomKernel) -> Result<Vec<Self>> {
        let keep = self.at_range(lo, hi, kernel)?;
        if keep.is_empty() {
            return Ok(vec![self.clone()]);
        }
        let mut out = vec![self.clone()];
        for piece in &keep {
            let mut next = Vec::new();
            for seq in out {
                next.extend(seq.minus_period(&piece.period(), kernel)?);
            }
            out = next;
        }
        Ok(out)
    }

    /// Appends `inst` (`inst.t > last.t`), re-normalizing at the tail
    /// only (spec §4.6.8).
    pub fn append(&self, inst: TInstant<V>, kernel: &dyn GeomKernel) -> Result<Self> {
        if inst.timestamp() <= self.end_instant().timestamp() {
            return Err(Error::InvalidArgument("append requires a strictly later timestamp".into()));
        }
        let mut instants = self.instants.clone();
        instants.push(inst);
        Self::new(instants, self.period.is_lower_inclusive(), true, self.interp, true, kernel)
    }
}

fn interp_time(a: Timestamp, b: Timestamp, fraction: f64) -> Timestamp {
    let total = (b.as_micros() - a.as_micros()) as f64;
    a.checked_add_micros((total * fraction).round() as i64).unwrap_or(b)
}

fn numeric_bbox<V: BaseValue>(instants: &[TInstant<V>]) -> Option<(f64, f64)> {
    let vals: Vec<f64> = instants.iter().filter_map(|i| i.value().as_f64()).collect();
    if vals.len() != instants.len() || vals.is_empty() {
        return None;
    }
    let lo = vals.iter().cloned().fold(f64::INFINITY, f64::min);
    let hi = vals.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    Some((lo, hi))
}

fn build_trajectory<V: BaseValue>(instants: &[TInstant<V>]) -> Option<Line> {
    let pts: Vec<_> = instants.iter().filter_map(|i| i.value().as_geom_point()).collect();
    if pts.len() != instants.len() || pts.is_empty() {
        return None;
    }
    Some(Line::new(pts))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::PlanarKernel;

    fn ts(v: i64) -> Timestamp {
        Timestamp::from_micros(v)
    }

    #[test]
    fn step_sequence_normalizes_and_restricts() {
        // Closed upper bound: an exclusive one here would violate §4.6.5,
        // since the last two stored instants (1, 2) differ (see DESIGN.md
        // Open Questions on spec.md §8 scenario 1's own contradiction).
        let k = PlanarKernel;
        let s = TSequence::new(
            vec![TInstant::new(1i32, ts(1)), TInstant::new(1i32, ts(2)), TInstant::new(2i32, ts(3))],
            true,
            true,
            Interpolation::Step,
            true,
            &k,
        )
        .unwrap();
        assert_eq!(s.num_instants(), 2);

        let at1 = s.at_value(&1, &k).unwrap();
        assert_eq!(at1.len(), 1);
        assert_eq!(at1[0].period(), Period::new(ts(1), ts(3), true, false).unwrap());
    }

    #[test]
    fn linear_sequence_value_at_midpoint() {
        let k = PlanarKernel;
        let s = TSequence::new(vec![TInstant::new(0.0f64, ts(1)), TInstant::new(4.0f64, ts(3))], true, true, Interpolation::Linear, true, &k)
            .unwrap();
        assert_eq!(s.value_at(ts(2), &k).unwrap(), Some(2.0));
    }

    #[test]
    fn exclusive_upper_bound_requires_equal_tail_on_step_base() {
        let k = PlanarKernel;
        let res = TSequence::new(
            vec![TInstant::new(1i32, ts(1)), TInstant::new(2i32, ts(2))],
            true,
            false,
            Interpolation::Step,
            false,
            &k,
        );
        assert!(matches!(res, Err(Error::NonContinuousExclusiveUpperBound)));
    }
}
