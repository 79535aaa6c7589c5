use super::collection::Collection;

/// A contiguous, possibly half-open range over an ordered domain. Mirrors
/// the teacher's `Span` trait (`collections/base/span.rs`); implemented
/// here by `Period` (spec §4.2) rather than over an FFI span pointer.
pub trait Span: Collection {
    type Width;

    fn lower(&self) -> Self::Elem;
    fn upper(&self) -> Self::Elem;
    fn is_lower_inclusive(&self) -> bool;
    fn is_upper_inclusive(&self) -> bool;

    fn shift(&self, delta: Self::Width) -> Self;
    fn scale(&self, width: Self::Width) -> Self;
    fn shift_scale(&self, delta: Option<Self::Width>, width: Option<Self::Width>) -> Self;

    fn intersection(&self, other: &Self) -> Option<Self>
    where
        Self: Sized;
}
