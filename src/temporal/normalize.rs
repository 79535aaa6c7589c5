use crate::error::Result;
use crate::geom::GeomKernel;
use crate::value::BaseValue;

use super::instant::TInstant;
use super::interpolation::Interpolation;

/// Single left-to-right sweep removing the middle instant `b` of every
/// consecutive triple `a, b, c` that carries no information under the
/// interpolation in effect (spec §4.6.4): idempotent step repeats,
/// plateaus, and collinear runs. Boundary instants are never dropped
/// here — only the bound-truncation rule of §4.6.5 may touch them.
pub fn normalize_instants<V: BaseValue>(
    instants: &[TInstant<V>],
    interp: Interpolation,
    kernel: &dyn GeomKernel,
) -> Result<Vec<TInstant<V>>> {
    if instants.len() < 3 {
        return Ok(instants.to_vec());
    }

    let effective = interp.effective(V::CONTINUOUS);
    let mut out: Vec<TInstant<V>> = Vec::with_capacity(instants.len());
    out.push(instants[0].clone());

    for i in 1..instants.len() - 1 {
        let a = out.last().unwrap();
        let b = &instants[i];
        let c = &instants[i + 1];

        if is_redundant(a, b, c, effective, kernel)? {
            continue;
        }
        out.push(b.clone());
    }
    out.push(instants.last().unwrap().clone());
    Ok(out)
}

fn is_redundant<V: BaseValue>(
    a: &TInstant<V>,
    b: &TInstant<V>,
    c: &TInstant<V>,
    effective: Interpolation,
    kernel: &dyn GeomKernel,
) -> Result<bool> {
    if !V::CONTINUOUS && a.value().base_eq(b.value()) {
        return Ok(true);
    }
    if a.value().base_eq(b.value()) && b.value().base_eq(c.value()) {
        return Ok(true);
    }
    if matches!(effective, Interpolation::Linear) && collinear(a, b, c, kernel)? {
        return Ok(true);
    }
    Ok(false)
}

/// `a, b, c` are collinear (spec §4.6.2) iff the segment `(a, c)`
/// evaluated at `b.t` equals `b.value` under linear interpolation.
fn collinear<V: BaseValue>(a: &TInstant<V>, b: &TInstant<V>, c: &TInstant<V>, kernel: &dyn GeomKernel) -> Result<bool> {
    let total = (c.timestamp().as_micros() - a.timestamp().as_micros()) as f64;
    if total == 0.0 {
        return Ok(a.value().base_eq(c.value()));
    }
    let fraction = (b.timestamp().as_micros() - a.timestamp().as_micros()) as f64 / total;
    let predicted = V::interpolate(a.value(), c.value(), fraction, kernel)?;
    Ok(predicted.base_eq(b.value()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collections::datetime::Timestamp;
    use crate::geom::PlanarKernel;

    fn ts(v: i64) -> Timestamp {
        Timestamp::from_micros(v)
    }

    #[test]
    fn collinear_float_run_collapses() {
        let k = PlanarKernel;
        let instants = vec![
            TInstant::new(0.0f64, ts(0)),
            TInstant::new(2.0f64, ts(1)),
            TInstant::new(4.0f64, ts(2)),
        ];
        let out = normalize_instants(&instants, Interpolation::Linear, &k).unwrap();
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn step_repeats_collapse() {
        let k = PlanarKernel;
        let instants = vec![TInstant::new(1i32, ts(0)), TInstant::new(1i32, ts(1)), TInstant::new(2i32, ts(2))];
        let out = normalize_instants(&instants, Interpolation::Step, &k).unwrap();
        assert_eq!(out.len(), 2);
    }
}
