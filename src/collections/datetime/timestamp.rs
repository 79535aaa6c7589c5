use std::fmt;

use chrono::{DateTime, TimeZone, Utc};

/// Microseconds since the Unix epoch. The epoch is irrelevant to every
/// operation in this crate (spec §6.2); it only matters when converting
/// to/from `chrono`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(pub i64);

impl Timestamp {
    pub const fn from_micros(micros: i64) -> Self {
        Timestamp(micros)
    }

    pub const fn as_micros(self) -> i64 {
        self.0
    }

    pub fn checked_add_micros(self, micros: i64) -> Option<Self> {
        self.0.checked_add(micros).map(Timestamp)
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for Timestamp {
    fn from(dt: DateTime<Tz>) -> Self {
        Timestamp(dt.with_timezone(&Utc).timestamp_micros())
    }
}

impl From<Timestamp> for DateTime<Utc> {
    fn from(t: Timestamp) -> Self {
        DateTime::from_timestamp_micros(t.0).unwrap_or_else(|| DateTime::from_timestamp(0, 0).unwrap())
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dt: DateTime<Utc> = (*self).into();
        write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S%.6f+00"))
    }
}
