//! Reference-time layouts.
//!
//! Time formats in annotations may be written by example, spelling out the
//! reference instant `Mon Jan 2 15:04:05 MST 2006` in the desired shape
//! (`2006-01-02`, `02/01/2006 15:04`). This module rewrites such layouts into
//! strftime strings understood by `chrono`. Formats that already contain `%`
//! are taken as strftime and passed through.

/// Layout tokens, longest first so that `January` wins over `Jan` and `2006`
/// wins over `2`.
///
/// The `Z` offset forms and the hour-only `-07` map to chrono's permissive
/// offset, which accepts `Z`, an optional colon and missing minutes.
const TOKENS: &[(&str, &str)] = &[
    ("January", "%B"),
    ("Monday", "%A"),
    (".000000000", "%.9f"),
    (".999999999", "%.f"),
    (".000000", "%.6f"),
    (".999999", "%.f"),
    ("Z07:00", "%#z"),
    ("-07:00", "%:z"),
    ("Z0700", "%#z"),
    ("-0700", "%z"),
    (".000", "%.3f"),
    (".999", "%.f"),
    ("2006", "%Y"),
    ("Jan", "%b"),
    ("Mon", "%a"),
    ("MST", "%Z"),
    ("Z07", "%#z"),
    ("-07", "%#z"),
    ("__2", "%j"),
    ("002", "%j"),
    ("_2", "%e"),
    ("01", "%m"),
    ("02", "%d"),
    ("03", "%I"),
    ("04", "%M"),
    ("05", "%S"),
    ("06", "%y"),
    ("15", "%H"),
    ("PM", "%p"),
    ("pm", "%p"),
    ("1", "%-m"),
    ("2", "%-d"),
    ("3", "%-I"),
    ("4", "%-M"),
    ("5", "%-S"),
];

/// The RFC 3339 reference layout. Inputs in this layout go through chrono's
/// RFC 3339 parser, which also accepts `Z`.
pub const RFC3339: &str = "2006-01-02T15:04:05Z07:00";

/// Rewrites a reference layout into a strftime format string.
///
/// Characters that are not part of a token are copied literally. A string
/// already containing `%` is returned unchanged.
///
/// # Examples
///
/// ```
/// use formbind::layout::to_strftime;
///
/// assert_eq!(to_strftime("2006-01-02"), "%Y-%m-%d");
/// assert_eq!(to_strftime("02 Jan 06 15:04 -0700"), "%d %b %y %H:%M %z");
/// assert_eq!(to_strftime("%Y/%m/%d"), "%Y/%m/%d");
/// ```
pub fn to_strftime(layout: &str) -> String {
    if layout.contains('%') {
        return layout.to_string();
    }

    let mut out = String::with_capacity(layout.len() * 2);
    let mut rest = layout;
    'outer: while !rest.is_empty() {
        for (token, spec) in TOKENS {
            if let Some(tail) = rest.strip_prefix(token) {
                out.push_str(spec);
                rest = tail;
                continue 'outer;
            }
        }
        let mut chars = rest.chars();
        if let Some(c) = chars.next() {
            out.push(c);
        }
        rest = chars.as_str();
    }
    out
}
