use super::{collection::Collection, span::Span};

/// A sorted set of pairwise-disjoint, non-mergeable spans. Mirrors the
/// teacher's `SpanSet` trait; implemented here by `PeriodSet`.
pub trait SpanSet: Collection {
    type SpanType: Span;

    fn spans(&self) -> &[Self::SpanType];
    fn num_spans(&self) -> usize {
        self.spans().len()
    }
    fn start_span(&self) -> &Self::SpanType {
        &self.spans()[0]
    }
    fn end_span(&self) -> &Self::SpanType {
        self.spans().last().expect("spansets are never empty")
    }
}
