use std::cmp::Ordering;
use std::fmt;

use crate::error::{Error, Result};
use crate::geom::GeomKernel;
use crate::value::{BaseKind, BaseValue, EPSILON};

/// Lexicographic-byte-order text value under the default collation (spec
/// §4.1). Always step-interpolated.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct TextValue(pub String);

impl TextValue {
    pub fn new(s: impl Into<String>) -> Self {
        TextValue(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TextValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub type Bool = bool;
pub type Int32 = i32;
pub type Float64 = f64;

impl BaseValue for bool {
    const KIND: BaseKind = BaseKind::Bool;
    const CONTINUOUS: bool = false;

    fn base_eq(&self, other: &Self) -> bool {
        self == other
    }

    fn base_cmp(&self, other: &Self) -> Option<Ordering> {
        self.partial_cmp(other)
    }

    fn interpolate(a: &Self, _b: &Self, _fraction: f64, _kernel: &dyn GeomKernel) -> Result<Self> {
        Ok(*a)
    }

    fn encode(&self, buf: &mut Vec<u8>) {
        buf.push(*self as u8);
    }

    fn decode(buf: &[u8]) -> Result<(Self, usize)> {
        match buf.first() {
            Some(&b) => Ok((b != 0, 1)),
            None => Err(Error::Internal("truncated bool".into())),
        }
    }
}

impl BaseValue for i32 {
    const KIND: BaseKind = BaseKind::Int32;
    const CONTINUOUS: bool = false;

    fn base_eq(&self, other: &Self) -> bool {
        self == other
    }

    fn base_cmp(&self, other: &Self) -> Option<Ordering> {
        self.partial_cmp(other)
    }

    fn as_f64(&self) -> Option<f64> {
        Some(*self as f64)
    }

    fn interpolate(a: &Self, _b: &Self, _fraction: f64, _kernel: &dyn GeomKernel) -> Result<Self> {
        Ok(*a)
    }

    fn encode(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.to_le_bytes());
    }

    fn decode(buf: &[u8]) -> Result<(Self, usize)> {
        let bytes: [u8; 4] = buf
            .get(0..4)
            .and_then(|s| s.try_into().ok())
            .ok_or_else(|| Error::Internal("truncated i32".into()))?;
        Ok((i32::from_le_bytes(bytes), 4))
    }
}

impl BaseValue for f64 {
    const KIND: BaseKind = BaseKind::Float64;
    const CONTINUOUS: bool = true;

    /// NaN-as-false (spec §9, open question iii).
    fn base_eq(&self, other: &Self) -> bool {
        !self.is_nan() && !other.is_nan() && self == other
    }

    fn base_cmp(&self, other: &Self) -> Option<Ordering> {
        self.partial_cmp(other)
    }

    fn as_f64(&self) -> Option<f64> {
        Some(*self)
    }

    fn interpolate(a: &Self, b: &Self, fraction: f64, _kernel: &dyn GeomKernel) -> Result<Self> {
        let fraction = clamp_fraction(fraction)?;
        Ok(a + (b - a) * fraction)
    }

    /// Spec §4.6.3 numeric case: solve `v1(t) = v2(t)` under linear
    /// interpolation with `x1=s1, x2=e1, x3=s2, x4=e2`.
    fn crossing_fraction(s1: &Self, e1: &Self, s2: &Self, e2: &Self) -> Result<Option<f64>> {
        let (x1, x2, x3, x4) = (*s1, *e1, *s2, *e2);
        let denom = x2 - x1 - x4 + x3;
        if denom == 0.0 {
            return Ok(None);
        }
        let fraction = (x3 - x1) / denom;
        if fraction > EPSILON && fraction < 1.0 - EPSILON {
            Ok(Some(fraction))
        } else {
            Ok(None)
        }
    }

    fn encode(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.to_le_bytes());
    }

    fn decode(buf: &[u8]) -> Result<(Self, usize)> {
        let bytes: [u8; 8] = buf
            .get(0..8)
            .and_then(|s| s.try_into().ok())
            .ok_or_else(|| Error::Internal("truncated f64".into()))?;
        Ok((f64::from_le_bytes(bytes), 8))
    }
}

impl BaseValue for TextValue {
    const KIND: BaseKind = BaseKind::Text;
    const CONTINUOUS: bool = false;

    fn base_eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }

    fn base_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.0.as_bytes().cmp(other.0.as_bytes()))
    }

    fn interpolate(a: &Self, _b: &Self, _fraction: f64, _kernel: &dyn GeomKernel) -> Result<Self> {
        Ok(a.clone())
    }

    fn encode(&self, buf: &mut Vec<u8>) {
        let bytes = self.0.as_bytes();
        buf.extend_from_slice(&(bytes.len() as u32).to_le_bytes());
        buf.extend_from_slice(bytes);
    }

    fn decode(buf: &[u8]) -> Result<(Self, usize)> {
        let len_bytes: [u8; 4] = buf
            .get(0..4)
            .and_then(|s| s.try_into().ok())
            .ok_or_else(|| Error::Internal("truncated text length".into()))?;
        let len = u32::from_le_bytes(len_bytes) as usize;
        let bytes = buf.get(4..4 + len).ok_or_else(|| Error::Internal("truncated text body".into()))?;
        let s = std::str::from_utf8(bytes).map_err(|e| Error::Internal(e.to_string()))?;
        Ok((TextValue::new(s), 4 + len))
    }
}

/// Clamps a fraction to `[0,1]` only when it falls outside by at most
/// `EPSILON`; otherwise fails (spec §4.6.1).
pub(crate) fn clamp_fraction(fraction: f64) -> Result<f64> {
    if !fraction.is_finite() {
        return Err(Error::InterpolationOutOfBounds(fraction));
    }
    if fraction < 0.0 {
        if fraction < -EPSILON {
            return Err(Error::InterpolationOutOfBounds(fraction));
        }
        return Ok(0.0);
    }
    if fraction > 1.0 {
        if fraction > 1.0 + EPSILON {
            return Err(Error::InterpolationOutOfBounds(fraction));
        }
        return Ok(1.0);
    }
    Ok(fraction)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::PlanarKernel;

    #[test]
    fn float_interpolates_linearly() {
        let k = PlanarKernel;
        assert_eq!(f64::interpolate(&0.0, &4.0, 0.5, &k).unwrap(), 2.0);
    }

    #[test]
    fn float_crossing_matches_example_scenario() {
        // A: 0.0 -> 4.0, B: 3.0 -> 1.0; crossing at fraction 0.5 (spec §8 scenario 3).
        let f = f64::crossing_fraction(&0.0, &4.0, &3.0, &1.0).unwrap().unwrap();
        assert!((f - 0.5).abs() < 1e-9);
    }

    #[test]
    fn nan_equality_is_false() {
        assert!(!f64::NAN.base_eq(&f64::NAN));
    }
}
