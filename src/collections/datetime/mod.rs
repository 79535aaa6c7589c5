pub mod timestamp;
pub mod tstz_set;
pub mod tstz_span;
pub mod tstz_span_set;

pub use timestamp::Timestamp;
pub use tstz_set::TimestampSet;
pub use tstz_span::Period;
pub use tstz_span_set::PeriodSet;
