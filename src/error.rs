//! Wire-visible error taxonomy (spec §6.3).

use thiserror::Error;

/// Every failure mode the engine can surface. Construction failures are
/// fail-fast: no partial value is ever produced. Restriction and lifting
/// never raise on an empty result (they return `None` at the API boundary
/// instead); the variants below are reserved for genuine invariant
/// violations, unsupported combinations, and host-signaled cancellation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("sequence has a non-continuous base and an exclusive upper bound whose last two instants differ")]
    NonContinuousExclusiveUpperBound,

    #[error("mixed SRID: expected {expected}, found {found}")]
    MixedSrid { expected: i32, found: i32 },

    #[error("mixed dimensionality: instants disagree on the Z flag")]
    MixedDimensionality,

    #[error("empty geometry")]
    EmptyGeometry,

    #[error("the two temporal values do not intersect in time")]
    NoIntersection,

    #[error("interpolation fraction {0} fell outside [0, 1] by more than epsilon")]
    InterpolationOutOfBounds(f64),

    #[error("operation requires a continuous base type, which this temporal value does not have")]
    UnsupportedInterpolation,

    #[error("bounding boxes are missing a common axis for this operation")]
    IncompatibleBox,

    #[error("operation cancelled by host")]
    Cancelled,

    #[error("internal error: {0}")]
    Internal(String),

    /// A typed wrapper around a failure surfaced by the external geometry
    /// kernel (spec §7: "errors from the geometry kernel are surfaced
    /// unchanged with a typed wrapper").
    #[error("geometry kernel error: {0}")]
    Geom(String),
}

pub type Result<T> = std::result::Result<T, Error>;
