//! Field annotation parsing.
//!
//! Every bindable field carries an annotation string made of space-separated
//! `name:"value"` entries, for example:
//!
//! ```text
//! form:"page,default=1" binding:"required"
//! form:"since" time_format:"2006-01-02" time_location:"Europe/Paris"
//! ```
//!
//! The entry selected by the active strategy (`form`, `uri`, `header`, ...)
//! supplies the binding key and an optional default. `binding` carries
//! validation directives of which only `required` is interpreted here.

/// Annotation entry holding validation directives.
pub const BINDING: &str = "binding";
/// Annotation entry holding the time layout of a timestamp field.
pub const TIME_FORMAT: &str = "time_format";
/// Annotation entry forcing UTC interpretation of a timestamp field.
pub const TIME_UTC: &str = "time_utc";
/// Annotation entry naming the IANA zone of a timestamp field.
pub const TIME_LOCATION: &str = "time_location";

const DEFAULT_PREFIX: &str = "default=";
const REQUIRED: &str = "required";
const IGNORE: &str = "-";

/// Parsed per-field binding metadata.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TagDescriptor {
    /// Key looked up in the input mapping
    pub key: String,
    /// Literal used when the key is absent or empty
    pub default: Option<String>,
    /// Whether a missing key is an error
    pub required: bool,
    /// Layout for timestamp fields
    pub time_format: Option<String>,
    /// Interpret timestamps in UTC
    pub time_utc: bool,
    /// IANA zone name for timestamp fields
    pub time_location: Option<String>,
}

/// Why a field is left alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The annotation has no entry for the key name
    Absent,
    /// The entry exists but its key is empty
    Empty,
    /// The key is `-`
    Ignored,
    /// The annotation could not be parsed up to the entry
    Malformed,
}

/// Outcome of parsing one field's annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagParse {
    /// The field opts out of binding.
    Skip(SkipReason),
    /// The field binds under the descriptor's key.
    Bind(TagDescriptor),
}

/// Parses `annotation` for the entry named `key_name`.
///
/// # Examples
///
/// ```
/// use formbind::tag::{parse, TagParse};
///
/// let TagParse::Bind(desc) = parse(r#"form:"bar,default=hello" binding:"required""#, "form") else {
///     panic!("expected a binding key");
/// };
/// assert_eq!(desc.key, "bar");
/// assert_eq!(desc.default.as_deref(), Some("hello"));
/// assert!(desc.required);
/// ```
pub fn parse(annotation: &str, key_name: &str) -> TagParse {
    let raw = match lookup(annotation, key_name) {
        Some(raw) => raw,
        None if is_well_formed(annotation) => return TagParse::Skip(SkipReason::Absent),
        None => return TagParse::Skip(SkipReason::Malformed),
    };

    let (key, default) = split_key(&raw);
    if key.is_empty() {
        return TagParse::Skip(SkipReason::Empty);
    }
    if key == IGNORE {
        return TagParse::Skip(SkipReason::Ignored);
    }

    let required = lookup(annotation, BINDING)
        .map(|directives| directives.split(',').any(|d| d.trim() == REQUIRED))
        .unwrap_or(false);

    TagParse::Bind(TagDescriptor {
        key: key.to_string(),
        default: default.map(str::to_string),
        required,
        time_format: lookup(annotation, TIME_FORMAT).filter(|f| !f.is_empty()),
        time_utc: lookup(annotation, TIME_UTC)
            .and_then(|v| crate::coerce::parse_bool(&v).ok())
            .unwrap_or(false),
        time_location: lookup(annotation, TIME_LOCATION).filter(|l| !l.is_empty()),
    })
}

/// Splits `key[,default=value]` on its first comma.
fn split_key(raw: &str) -> (&str, Option<&str>) {
    match raw.split_once(',') {
        Some((key, rest)) => (key, rest.strip_prefix(DEFAULT_PREFIX)),
        None => (raw, None),
    }
}

/// Returns the unquoted value of the entry `name`, if present.
///
/// Scanning stops at the first malformed entry, so entries after a syntax
/// error are never found.
pub fn lookup(annotation: &str, name: &str) -> Option<String> {
    for entry in Entries::new(annotation) {
        let (entry_name, quoted) = entry.ok()?;
        if entry_name == name {
            return unquote(quoted);
        }
    }
    None
}

/// Reports whether the whole annotation follows the entry grammar.
pub fn is_well_formed(annotation: &str) -> bool {
    Entries::new(annotation).all(|entry| entry.map(|(_, q)| unquote(q).is_some()).unwrap_or(false))
}

struct Malformed;

/// Iterator over raw `(name, "quoted value")` entries.
struct Entries<'a> {
    rest: &'a str,
    done: bool,
}

impl<'a> Entries<'a> {
    fn new(annotation: &'a str) -> Self {
        Self {
            rest: annotation,
            done: false,
        }
    }
}

impl<'a> Iterator for Entries<'a> {
    type Item = Result<(&'a str, &'a str), Malformed>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let tag = self.rest.trim_start_matches(' ');
        if tag.is_empty() {
            self.done = true;
            return None;
        }

        let bytes = tag.as_bytes();
        let mut i = 0;
        while i < bytes.len()
            && bytes[i] > b' '
            && bytes[i] != b':'
            && bytes[i] != b'"'
            && bytes[i] != 0x7f
        {
            i += 1;
        }
        if i == 0 || i + 1 >= bytes.len() || bytes[i] != b':' || bytes[i + 1] != b'"' {
            self.done = true;
            return Some(Err(Malformed));
        }
        let name = &tag[..i];
        let value_start = i + 1;

        let mut j = value_start + 1;
        while j < bytes.len() && bytes[j] != b'"' {
            if bytes[j] == b'\\' {
                j += 1;
            }
            j += 1;
        }
        if j >= bytes.len() {
            self.done = true;
            return Some(Err(Malformed));
        }

        self.rest = &tag[j + 1..];
        Some(Ok((name, &tag[value_start..=j])))
    }
}

/// Strips the surrounding quotes and resolves backslash escapes.
fn unquote(quoted: &str) -> Option<String> {
    let inner = quoted.strip_prefix('"')?.strip_suffix('"')?;
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next()? {
            '\\' => out.push('\\'),
            '"' => out.push('"'),
            '\'' => out.push('\''),
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            _ => return None,
        }
    }
    Some(out)
}
