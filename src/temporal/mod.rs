pub mod instant;
pub mod instant_set;
pub mod interpolation;
pub mod normalize;
pub mod point;
pub mod sequence;
pub mod sequence_set;
pub mod sync;

pub use instant::TInstant;
pub use instant_set::TInstantSet;
pub use interpolation::Interpolation;
pub use sequence::TSequence;
pub use sequence_set::TSequenceSet;

use crate::collections::datetime::{Period, Timestamp};
use crate::error::Result;
use crate::geom::GeomKernel;
use crate::value::{Bool, Double2, Double3, Double4, Float64, GeogPoint, GeomPoint, Int32, TextValue};
use crate::value::BaseValue;

/// The closed union of the four duration variants (spec §3.3): a single
/// value, a discrete set, a continuous run, or a disjoint run of runs.
/// Generic over the base type `V`, rather than combinatorially expanded
/// per base.
#[derive(Debug, Clone, PartialEq)]
pub enum Temporal<V: BaseValue> {
    Instant(TInstant<V>),
    InstantSet(TInstantSet<V>),
    Sequence(TSequence<V>),
    SequenceSet(TSequenceSet<V>),
}

impl<V: BaseValue> Temporal<V> {
    pub fn bounding_period(&self) -> Period {
        match self {
            Temporal::Instant(i) => Period::instant(i.timestamp()),
            Temporal::InstantSet(s) => s.bounding_period(),
            Temporal::Sequence(s) => s.period(),
            Temporal::SequenceSet(s) => s.span(),
        }
    }

    pub fn num_instants(&self) -> usize {
        match self {
            Temporal::Instant(_) => 1,
            Temporal::InstantSet(s) => s.num_instants(),
            Temporal::Sequence(s) => s.num_instants(),
            Temporal::SequenceSet(s) => s.sequences().iter().map(|seq| seq.num_instants()).sum(),
        }
    }

    pub fn min_value(&self) -> &V {
        match self {
            Temporal::Instant(i) => i.value(),
            Temporal::InstantSet(s) => s.min_value(),
            Temporal::Sequence(s) => s.min_value(),
            Temporal::SequenceSet(s) => s.min_value(),
        }
    }

    pub fn max_value(&self) -> &V {
        match self {
            Temporal::Instant(i) => i.value(),
            Temporal::InstantSet(s) => s.max_value(),
            Temporal::Sequence(s) => s.max_value(),
            Temporal::SequenceSet(s) => s.max_value(),
        }
    }

    pub fn ever_equals(&self, v: &V) -> bool {
        match self {
            Temporal::Instant(i) => i.ever_equals(v),
            Temporal::InstantSet(s) => s.ever_equals(v),
            Temporal::Sequence(s) => s.min_value().base_eq(v) || s.max_value().base_eq(v) || s.instants().iter().any(|i| i.value().base_eq(v)),
            Temporal::SequenceSet(s) => s.sequences().iter().any(|seq| seq.instants().iter().any(|i| i.value().base_eq(v))),
        }
    }

    pub fn always_equals(&self, v: &V) -> bool {
        match self {
            Temporal::Instant(i) => i.always_equals(v),
            Temporal::InstantSet(s) => s.always_equals(v),
            Temporal::Sequence(s) => s.instants().iter().all(|i| i.value().base_eq(v)),
            Temporal::SequenceSet(s) => s.sequences().iter().all(|seq| seq.instants().iter().all(|i| i.value().base_eq(v))),
        }
    }

    pub fn value_at(&self, t: Timestamp, kernel: &dyn GeomKernel) -> Result<Option<V>> {
        match self {
            Temporal::Instant(i) => Ok(i.value_at(t).cloned()),
            Temporal::InstantSet(s) => Ok(s.value_at(t).cloned()),
            Temporal::Sequence(s) => s.value_at(t, kernel),
            Temporal::SequenceSet(s) => s.value_at(t, kernel),
        }
    }

    pub fn at_timestamp(&self, t: Timestamp, kernel: &dyn GeomKernel) -> Result<Option<TInstant<V>>> {
        match self {
            Temporal::Instant(i) => Ok(i.at_timestamp(t)),
            Temporal::InstantSet(s) => Ok(s.at_timestamp(t)),
            Temporal::Sequence(s) => s.at_timestamp(t, kernel),
            Temporal::SequenceSet(s) => s.at_timestamp(t, kernel),
        }
    }

    pub fn minus_timestamp(&self, t: Timestamp, kernel: &dyn GeomKernel) -> Result<Option<Self>> {
        match self {
            Temporal::Instant(i) => Ok(i.minus_timestamp(t).map(Temporal::Instant)),
            Temporal::InstantSet(s) => Ok(s.minus_timestamp(t).map(Temporal::InstantSet)),
            Temporal::Sequence(s) => wrap_pieces(s.minus_timestamp(t, kernel)?),
            Temporal::SequenceSet(s) => Ok(s.minus_timestamp(t, kernel)?.map(Temporal::SequenceSet).and_then(collapse_singleton)),
        }
    }

    pub fn at_period(&self, p: &Period, kernel: &dyn GeomKernel) -> Result<Option<Self>> {
        match self {
            Temporal::Instant(i) => Ok(i.at_period(p).map(Temporal::Instant)),
            Temporal::InstantSet(s) => Ok(s.at_period(p).map(Temporal::InstantSet)),
            Temporal::Sequence(s) => Ok(s.at_period(p, kernel)?.map(Temporal::Sequence)),
            Temporal::SequenceSet(s) => Ok(s.at_period(p, kernel)?.map(Temporal::SequenceSet).and_then(collapse_singleton)),
        }
    }

    pub fn minus_period(&self, p: &Period, kernel: &dyn GeomKernel) -> Result<Option<Self>> {
        match self {
            Temporal::Instant(i) => Ok(i.minus_period(p).map(Temporal::Instant)),
            Temporal::InstantSet(s) => Ok(s.minus_period(p).map(Temporal::InstantSet)),
            Temporal::Sequence(s) => wrap_pieces(s.minus_period(p, kernel)?),
            Temporal::SequenceSet(s) => Ok(s.minus_period(p, kernel)?.map(Temporal::SequenceSet).and_then(collapse_singleton)),
        }
    }

    pub fn at_value(&self, v: &V, kernel: &dyn GeomKernel) -> Result<Option<Self>> {
        match self {
            Temporal::Instant(i) => Ok(i.at_value(v).map(Temporal::Instant)),
            Temporal::InstantSet(s) => Ok(s.at_value(v).map(Temporal::InstantSet)),
            Temporal::Sequence(s) => wrap_pieces(s.at_value(v, kernel)?),
            Temporal::SequenceSet(s) => Ok(s.at_value(v, kernel)?.map(Temporal::SequenceSet).and_then(collapse_singleton)),
        }
    }

    pub fn minus_value(&self, v: &V, kernel: &dyn GeomKernel) -> Result<Option<Self>> {
        match self {
            Temporal::Instant(i) => Ok(i.minus_value(v).map(Temporal::Instant)),
            Temporal::InstantSet(s) => Ok(s.minus_value(v).map(Temporal::InstantSet)),
            Temporal::Sequence(s) => wrap_pieces(s.minus_value(v, kernel)?),
            Temporal::SequenceSet(s) => Ok(s.minus_value(v, kernel)?.map(Temporal::SequenceSet).and_then(collapse_singleton)),
        }
    }

    pub fn at_range(&self, lo: f64, hi: f64, kernel: &dyn GeomKernel) -> Result<Option<Self>> {
        if self.min_value().as_f64().is_none() {
            return Err(crate::error::Error::InvalidArgument("at_range requires a numeric base".into()));
        }
        match self {
            Temporal::Instant(i) => Ok(i.value().as_f64().filter(|v| *v >= lo && *v <= hi).map(|_| Temporal::Instant(i.clone()))),
            Temporal::InstantSet(s) => {
                let matched: Vec<TInstant<V>> =
                    s.instants().iter().filter(|i| i.value().as_f64().is_some_and(|v| v >= lo && v <= hi)).cloned().collect();
                if matched.is_empty() { Ok(None) } else { Ok(Some(Temporal::InstantSet(TInstantSet::new(matched)?))) }
            }
            Temporal::Sequence(s) => wrap_pieces(s.at_range(lo, hi, kernel)?),
            Temporal::SequenceSet(s) => Ok(s.at_range(lo, hi, kernel)?.map(Temporal::SequenceSet).and_then(collapse_singleton)),
        }
    }

    pub fn minus_range(&self, lo: f64, hi: f64, kernel: &dyn GeomKernel) -> Result<Option<Self>> {
        match self {
            Temporal::Sequence(s) => wrap_pieces(s.minus_range(lo, hi, kernel)?),
            Temporal::SequenceSet(s) => Ok(s.minus_range(lo, hi, kernel)?.map(Temporal::SequenceSet).and_then(collapse_singleton)),
            other => {
                let kept = other.at_range(lo, hi, kernel)?;
                Ok(match kept {
                    None => Some(other.clone()),
                    Some(_) => None,
                })
            }
        }
    }
}

fn wrap_pieces<V: BaseValue>(pieces: Vec<TSequence<V>>) -> Result<Option<Temporal<V>>> {
    match pieces.len() {
        0 => Ok(None),
        1 => Ok(Some(Temporal::Sequence(pieces.into_iter().next().unwrap()))),
        _ => Ok(Some(Temporal::SequenceSet(TSequenceSet::new(pieces)?))),
    }
}

fn collapse_singleton<V: BaseValue>(t: Temporal<V>) -> Option<Temporal<V>> {
    match t {
        Temporal::SequenceSet(s) if s.num_sequences() == 1 => Some(Temporal::Sequence(s.sequences()[0].clone())),
        other => Some(other),
    }
}

impl<V: BaseValue> Temporal<V> {
    /// Maps every value through `f`, keeping the duration shape and
    /// timestamps unchanged. Used by the aggregation module to turn a
    /// running `Double2(sum, count)` accumulator into a plain average.
    pub fn map<R: BaseValue>(&self, f: impl Fn(&V) -> R, interp: Interpolation, kernel: &dyn GeomKernel) -> Result<Temporal<R>> {
        match self {
            Temporal::Instant(i) => Ok(Temporal::Instant(TInstant::new(f(i.value()), i.timestamp()))),
            Temporal::InstantSet(s) => {
                let instants: Vec<TInstant<R>> = s.instants().iter().map(|i| TInstant::new(f(i.value()), i.timestamp())).collect();
                Ok(Temporal::InstantSet(TInstantSet::new(instants)?))
            }
            Temporal::Sequence(s) => {
                let instants: Vec<TInstant<R>> = s.instants().iter().map(|i| TInstant::new(f(i.value()), i.timestamp())).collect();
                let p = s.period();
                Ok(Temporal::Sequence(TSequence::new(instants, p.is_lower_inclusive(), p.is_upper_inclusive(), interp, true, kernel)?))
            }
            Temporal::SequenceSet(s) => {
                let mut pieces = Vec::with_capacity(s.num_sequences());
                for seq in s.sequences() {
                    let instants: Vec<TInstant<R>> = seq.instants().iter().map(|i| TInstant::new(f(i.value()), i.timestamp())).collect();
                    let p = seq.period();
                    pieces.push(TSequence::new(instants, p.is_lower_inclusive(), p.is_upper_inclusive(), interp, true, kernel)?);
                }
                Ok(Temporal::SequenceSet(TSequenceSet::new(pieces)?))
            }
        }
    }
}

pub type TBool = Temporal<Bool>;
pub type TInt = Temporal<Int32>;
pub type TFloat = Temporal<Float64>;
pub type TText = Temporal<TextValue>;
pub type TDouble2 = Temporal<Double2>;
pub type TDouble3 = Temporal<Double3>;
pub type TDouble4 = Temporal<Double4>;
pub type TGeomPoint = Temporal<GeomPoint>;
pub type TGeogPoint = Temporal<GeogPoint>;
