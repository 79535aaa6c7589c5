pub mod double_n;
pub mod point;
pub mod scalar;

use std::cmp::Ordering;
use std::fmt;

use crate::error::Result;
use crate::geom::GeomKernel;

pub use double_n::{Double2, Double3, Double4};
pub use point::{GeogPoint, GeomPoint};
pub use scalar::{Bool, Float64, Int32, TextValue};

/// Fraction-domain epsilon (spec §4.1): applied to normalized `[0,1]`
/// interpolation fractions, never to absolute values.
pub const EPSILON: f64 = 1e-12;

/// Discriminates which member of the closed base-type union a `BaseValue`
/// implementation stands for (spec §3.1); stored in every temporal
/// value's header and on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseKind {
    Bool,
    Int32,
    Float64,
    Text,
    Double2,
    Double3,
    Double4,
    Geometry,
    Geography,
}

/// Uniform operations over one member of the closed base-value union
/// (spec §4.1). `Temporal<V>` is generic over `V: BaseValue` rather than
/// duplicated per concrete base type.
pub trait BaseValue: Clone + PartialEq + fmt::Debug + fmt::Display + Sized {
    const KIND: BaseKind;
    /// Whether a `Sequence` over this base may use `Linear` interpolation;
    /// `false` bases are always step, regardless of the sequence's flag.
    const CONTINUOUS: bool;

    /// NaN-as-false equality (spec §9, open question iii): a comparison
    /// with a NaN operand is `false`, matching IEEE-754, never panicking.
    fn base_eq(&self, other: &Self) -> bool;

    /// `None` when the comparison is undefined (a NaN operand); every
    /// directional predicate built atop `base_cmp` evaluates to `false`
    /// when it returns `None`.
    fn base_cmp(&self, other: &Self) -> Option<Ordering>;

    fn base_lt(&self, other: &Self) -> bool {
        matches!(self.base_cmp(other), Some(Ordering::Less))
    }
    fn base_le(&self, other: &Self) -> bool {
        matches!(self.base_cmp(other), Some(Ordering::Less) | Some(Ordering::Equal))
    }
    fn base_gt(&self, other: &Self) -> bool {
        matches!(self.base_cmp(other), Some(Ordering::Greater))
    }
    fn base_ge(&self, other: &Self) -> bool {
        matches!(self.base_cmp(other), Some(Ordering::Greater) | Some(Ordering::Equal))
    }

    /// Projection to `f64` (spec §4.1): defined for numeric bases only.
    fn as_f64(&self) -> Option<f64> {
        None
    }

    /// `Some((srid, has_z))` for point bases, `None` otherwise. Used by
    /// `InstantSet`/`Sequence`/`SequenceSet` constructors to enforce that
    /// all instants of a point-valued temporal value share one SRID and
    /// Z-flag (`MixedSRID` / `MixedDimensionality` otherwise).
    fn spatial_key(&self) -> Option<(i32, bool)> {
        None
    }

    /// Projection to a planar `GeomPoint`, used to build the trajectory
    /// cache of a point-valued `Sequence` (spec §4.6.6). `Geography`
    /// values are not cached this way; their trajectory length/shape is
    /// computed on demand through the kernel instead.
    fn as_geom_point(&self) -> Option<GeomPoint> {
        None
    }

    /// Value at `fraction ∈ [0,1]` along the segment `a -> b` (spec
    /// §4.6.1). Step-only bases must override this to always return
    /// `a.clone()` regardless of `fraction`.
    fn interpolate(a: &Self, b: &Self, fraction: f64, kernel: &dyn GeomKernel) -> Result<Self>;

    /// Segment×segment crossing fraction (spec §4.6.3): given two
    /// segments sharing a time domain, `s1 -> e1` and `s2 -> e2`, returns
    /// the fraction in `(0,1)` at which the two interpolated values
    /// become equal, or `None` if the segments are parallel / never cross.
    /// The default is "never crosses", correct for non-continuous bases.
    fn crossing_fraction(s1: &Self, e1: &Self, s2: &Self, e2: &Self) -> Result<Option<f64>> {
        let _ = (s1, e1, s2, e2);
        Ok(None)
    }

    fn to_text(&self) -> String {
        self.to_string()
    }

    fn encode(&self, buf: &mut Vec<u8>);
    fn decode(buf: &[u8]) -> Result<(Self, usize)>;
}

/// Checks that every value in `values` reports the same `spatial_key`
/// (spec §4.10): non-point bases always agree (`None == None`); point
/// bases must share one SRID and one Z-flag.
pub fn check_uniform_spatial_key<V: BaseValue>(values: &[V]) -> Result<()> {
    use crate::error::Error;

    let Some(first) = values.first().map(|v| v.spatial_key()) else {
        return Ok(());
    };
    for v in &values[1..] {
        let key = v.spatial_key();
        match (first, key) {
            (Some((srid_a, z_a)), Some((srid_b, z_b))) => {
                if srid_a != srid_b {
                    return Err(Error::MixedSrid { expected: srid_a, found: srid_b });
                }
                if z_a != z_b {
                    return Err(Error::MixedDimensionality);
                }
            }
            (None, None) => {}
            _ => return Err(Error::MixedDimensionality),
        }
    }
    Ok(())
}
