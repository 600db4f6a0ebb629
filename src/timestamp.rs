use std::fmt;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

/// A bound point in time together with the zone it was interpreted in.
///
/// The zero value is the Unix epoch in UTC; fields that receive an empty
/// input string are reset to it.
///
/// # Examples
///
/// ```
/// use formbind::Timestamp;
///
/// let zero = Timestamp::default();
/// assert_eq!(zero.unix(), 0);
/// assert_eq!(zero.zone_name(), "UTC");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timestamp(DateTime<Tz>);

impl Timestamp {
    /// Wraps a zoned date-time.
    pub fn new(datetime: DateTime<Tz>) -> Self {
        Self(datetime)
    }

    /// Seconds since the Unix epoch.
    pub fn unix(&self) -> i64 {
        self.0.timestamp()
    }

    /// IANA name of the zone, e.g. `Asia/Chongqing` or `UTC`.
    pub fn zone_name(&self) -> &'static str {
        self.0.timezone().name()
    }

    /// Borrows the underlying date-time.
    pub fn as_datetime(&self) -> &DateTime<Tz> {
        &self.0
    }

    /// Returns the underlying date-time.
    pub fn into_inner(self) -> DateTime<Tz> {
        self.0
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self(DateTime::<Utc>::UNIX_EPOCH.with_timezone(&Tz::UTC))
    }
}

impl From<DateTime<Tz>> for Timestamp {
    fn from(datetime: DateTime<Tz>) -> Self {
        Self(datetime)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.0.to_rfc3339(), self.zone_name())
    }
}
