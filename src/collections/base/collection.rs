use std::fmt::Debug;

/// Shared topological and positional vocabulary for the time-domain
/// collection types (`Period`, `TimestampSet`, `PeriodSet`). Mirrors the
/// teacher's own `Collection` trait (`collections/base/collection.rs`),
/// generalized from an FFI-backed span wrapper to a plain owned-data trait.
pub trait Collection: Clone + Debug + PartialEq {
    type Elem: Clone;

    /// Whether `self` is fully contained in `container`.
    fn is_contained_in(&self, container: &Self) -> bool;

    /// Whether `self` contains the given element.
    fn contains(&self, elem: &Self::Elem) -> bool;

    /// Whether `self` and `other` share at least one instant.
    fn overlaps(&self, other: &Self) -> bool;

    /// `self` ends strictly before `other` starts.
    fn is_left(&self, other: &Self) -> bool;

    /// `self` ends before or at the same bound as `other` ends.
    fn is_over_or_left(&self, other: &Self) -> bool;

    /// `self` starts after or at the same bound as `other` starts.
    fn is_over_or_right(&self, other: &Self) -> bool;

    /// `self` starts strictly after `other` ends.
    fn is_right(&self, other: &Self) -> bool;
}
