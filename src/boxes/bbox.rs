/// Common shape for the pruning boxes (spec §4.3). Generalizes the
/// teacher's `Box` trait away from WKB/FFI plumbing to owned-data
/// geometric pruning: union/intersection may fail when an axis present on
/// one operand is absent on the other (`Error::IncompatibleBox`).
pub trait BoundingBox: Sized + Clone + PartialEq {
    fn is_adjacent(&self, other: &Self) -> bool;
    fn intersection(&self, other: &Self) -> Option<Self>;
    fn union(&self, other: &Self) -> crate::error::Result<Self>;
}
