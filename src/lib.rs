//! In-memory engine for temporal values: construction, restriction,
//! synchronization, lifting and aggregation over time-varying booleans,
//! numbers, text and points.
//!
//! The algebra is generic over [`value::BaseValue`] rather than
//! duplicated per concrete base type: [`temporal::Temporal<V>`] is the
//! single duration-variant union (`Instant` / `InstantSet` / `Sequence` /
//! `SequenceSet`) instantiated with `V` set to `bool`, `i32`, `f64`,
//! [`value::TextValue`], [`value::Double2`]/`Double3`/`Double4`, or the
//! two point bases [`value::GeomPoint`]/[`value::GeogPoint`].
//!
//! Geometry and geography operations are delegated to a
//! [`geom::GeomKernel`] implementation: [`geom::PlanarKernel`] by
//! default, or [`geom::GeosKernel`] when the `geos` feature is enabled.

pub mod agg;
pub mod boxes;
pub mod collections;
pub mod error;
pub mod geom;
pub mod serde_wire;
pub mod temporal;
pub mod value;

pub use error::{Error, Result};
pub use temporal::{
    Interpolation, TBool, TDouble2, TDouble3, TDouble4, TFloat, TGeogPoint, TGeomPoint, TInstant, TInstantSet, TInt, TSequence, TSequenceSet,
    TText, Temporal,
};
pub use temporal::point as point_ops;
pub use value::{BaseKind, BaseValue, Double2, Double3, Double4, GeogPoint, GeomPoint, TextValue};
