//! String to primitive conversions.
//!
//! All functions here are pure. An empty input converts to the zero value of
//! the numeric and boolean kinds; anything else must follow the kind's
//! grammar exactly.

use std::str::FromStr;

use chrono::format::{parse, Item, Parsed, StrftimeItems};
use chrono::{DateTime, TimeZone};
use chrono_tz::Tz;

use crate::error::CoerceError;
use crate::layout;
use crate::tag::TagDescriptor;
use crate::timestamp::Timestamp;

/// Parses a signed base-10 integer of the target width.
///
/// # Examples
///
/// ```
/// use formbind::coerce::parse_int;
///
/// assert_eq!(parse_int::<i8>("127"), Ok(127));
/// assert_eq!(parse_int::<i8>("-128"), Ok(-128));
/// assert!(parse_int::<i8>("128").is_err());
/// ```
pub fn parse_int<T>(raw: &str) -> Result<T, CoerceError>
where
    T: FromStr<Err = std::num::ParseIntError> + Default,
{
    if raw.is_empty() {
        return Ok(T::default());
    }
    Ok(raw.parse()?)
}

/// Parses a non-negative base-10 integer of the target width.
///
/// A leading `+` or `-` is rejected even though the standard parser accepts
/// `+`.
pub fn parse_uint<T>(raw: &str) -> Result<T, CoerceError>
where
    T: FromStr<Err = std::num::ParseIntError> + Default,
{
    if raw.starts_with(['+', '-']) {
        return Err(CoerceError::Sign);
    }
    parse_int(raw)
}

/// Parses a decimal or exponential floating point literal.
pub fn parse_float<T>(raw: &str) -> Result<T, CoerceError>
where
    T: FromStr<Err = std::num::ParseFloatError> + Default,
{
    if raw.is_empty() {
        return Ok(T::default());
    }
    Ok(raw.parse()?)
}

/// Parses a boolean token.
///
/// Accepted: `true 1 t T` and `false 0 f F`. Matching is case-sensitive, so
/// `TRUE` and `False` are rejected.
pub fn parse_bool(raw: &str) -> Result<bool, CoerceError> {
    match raw {
        "" => Ok(false),
        "true" | "1" | "t" | "T" => Ok(true),
        "false" | "0" | "f" | "F" => Ok(false),
        _ => Err(CoerceError::Bool),
    }
}

/// How a timestamp string is read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeFormat {
    /// A strftime string (translated from a reference layout if needed)
    Strftime(String),
    /// RFC 3339, accepting `Z` as an offset
    Rfc3339,
    /// Integer seconds since the epoch
    Unix,
    /// Integer milliseconds since the epoch
    UnixMilli,
    /// Integer nanoseconds since the epoch
    UnixNano,
}

impl TimeFormat {
    /// Interprets a `time_format` annotation value.
    pub fn from_annotation(format: &str) -> Self {
        match format {
            "unix" => TimeFormat::Unix,
            "unixmilli" => TimeFormat::UnixMilli,
            "unixnano" => TimeFormat::UnixNano,
            layout::RFC3339 => TimeFormat::Rfc3339,
            other => TimeFormat::Strftime(layout::to_strftime(other)),
        }
    }
}

/// A resolved time configuration: how to read the input and which zone a
/// zone-less input belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeSpec {
    /// Input format
    pub format: TimeFormat,
    /// Zone the result is expressed in
    pub zone: Tz,
}

impl TimeSpec {
    /// Resolves the time directives of a descriptor.
    ///
    /// `time_location` takes precedence over `time_utc`, which takes
    /// precedence over `fallback`.
    ///
    /// # Errors
    ///
    /// Returns a human-readable reason when the descriptor has no time
    /// format, the format contains an unknown strftime directive, or the
    /// descriptor names an unknown zone.
    pub fn resolve(desc: &TagDescriptor, fallback: Tz) -> Result<Self, String> {
        let format = desc
            .time_format
            .as_deref()
            .ok_or_else(|| "time_format is required for timestamp fields".to_string())?;
        let format = match TimeFormat::from_annotation(format) {
            TimeFormat::Strftime(f) if StrftimeItems::new(&f).any(|i| i == Item::Error) => {
                return Err(format!("malformed time_format {:?}", format));
            }
            resolved => resolved,
        };

        let zone = match desc.time_location.as_deref() {
            Some(name) => name
                .parse::<Tz>()
                .map_err(|_| format!("unknown time zone {:?}", name))?,
            None if desc.time_utc => Tz::UTC,
            None => fallback,
        };

        Ok(Self { format, zone })
    }
}

/// Parses a timestamp according to `spec`.
///
/// A zone-less input is taken as local time in `spec.zone`; an input with an
/// explicit offset is converted into `spec.zone`.
///
/// # Examples
///
/// ```
/// use formbind::coerce::{parse_time, TimeFormat, TimeSpec};
///
/// let spec = TimeSpec {
///     format: TimeFormat::from_annotation("2006-01-02"),
///     zone: "Asia/Chongqing".parse().unwrap(),
/// };
/// let ts = parse_time("2017-11-15", &spec).unwrap();
/// assert_eq!(ts.unix(), 1510675200);
/// assert_eq!(ts.zone_name(), "Asia/Chongqing");
/// ```
pub fn parse_time(raw: &str, spec: &TimeSpec) -> Result<Timestamp, CoerceError> {
    if raw.is_empty() {
        return Ok(Timestamp::default());
    }

    let utc = match &spec.format {
        TimeFormat::Unix => DateTime::from_timestamp(raw.parse()?, 0),
        TimeFormat::UnixMilli => DateTime::from_timestamp_millis(raw.parse()?),
        TimeFormat::UnixNano => Some(DateTime::from_timestamp_nanos(raw.parse()?)),
        TimeFormat::Rfc3339 => {
            let fixed = DateTime::parse_from_rfc3339(raw)?;
            return Ok(Timestamp::new(fixed.with_timezone(&spec.zone)));
        }
        TimeFormat::Strftime(format) => return parse_layout(raw, format, spec.zone),
    };

    utc.map(|dt| Timestamp::new(dt.with_timezone(&spec.zone)))
        .ok_or(CoerceError::TimeOutOfRange)
}

fn parse_layout(raw: &str, format: &str, zone: Tz) -> Result<Timestamp, CoerceError> {
    let mut parsed = Parsed::new();
    parse(&mut parsed, raw, StrftimeItems::new(format))?;

    if let Ok(fixed) = parsed.to_datetime() {
        return Ok(Timestamp::new(fixed.with_timezone(&zone)));
    }

    let date = parsed.to_naive_date()?;
    let naive = match parsed.to_naive_time() {
        Ok(time) => date.and_time(time),
        Err(_) => date.and_hms_opt(0, 0, 0).ok_or(CoerceError::TimeOutOfRange)?,
    };

    zone.from_local_datetime(&naive)
        .earliest()
        .map(Timestamp::new)
        .ok_or(CoerceError::NonexistentTime)
}
