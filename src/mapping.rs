//! Input mappings and the decoders that produce them.

use std::collections::HashMap;

use url::form_urlencoded;

use crate::error::BindError;

/// Media type of url-encoded form bodies.
pub const MIME_POST_FORM: &str = "application/x-www-form-urlencoded";
/// Media type of multipart form bodies.
pub const MIME_MULTIPART_POST_FORM: &str = "multipart/form-data";

/// Keys mapped to one or more string values.
///
/// Repeated keys keep their values in insertion order. Every key holds at
/// least one value.
///
/// # Examples
///
/// ```
/// use formbind::ValueMap;
///
/// let mut map = ValueMap::new();
/// map.insert("id", "1");
/// map.insert("id", "2");
/// assert_eq!(map.get("id").unwrap(), ["1", "2"]);
/// assert_eq!(map.first("id"), Some("1"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValueMap {
    values: HashMap<String, Vec<String>>,
    case_insensitive: bool,
}

impl ValueMap {
    /// Creates an empty, case-sensitive mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty mapping whose keys compare ASCII case-insensitively.
    pub fn case_insensitive() -> Self {
        Self {
            values: HashMap::new(),
            case_insensitive: true,
        }
    }

    fn normalize(&self, key: &str) -> String {
        if self.case_insensitive {
            key.to_ascii_lowercase()
        } else {
            key.to_string()
        }
    }

    /// Appends a value under `key`.
    pub fn insert(&mut self, key: impl AsRef<str>, value: impl Into<String>) {
        let key = self.normalize(key.as_ref());
        self.values.entry(key).or_default().push(value.into());
    }

    /// Appends all values of `other` after the values already present.
    pub fn append(&mut self, other: ValueMap) {
        for (key, values) in other.values {
            let key = self.normalize(&key);
            self.values.entry(key).or_default().extend(values);
        }
    }

    /// All values under `key`, in insertion order.
    pub fn get(&self, key: &str) -> Option<&[String]> {
        let found = if self.case_insensitive {
            self.values.get(&key.to_ascii_lowercase())
        } else {
            self.values.get(key)
        };
        found.map(Vec::as_slice)
    }

    /// The first value under `key`.
    pub fn first(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(|v| v.first()).map(String::as_str)
    }

    /// Returns true if `key` has at least one value.
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the mapping has no keys.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates over keys and their values in unspecified key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for ValueMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = ValueMap::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

impl From<HashMap<String, Vec<String>>> for ValueMap {
    fn from(values: HashMap<String, Vec<String>>) -> Self {
        Self {
            values: values.into_iter().filter(|(_, v)| !v.is_empty()).collect(),
            case_insensitive: false,
        }
    }
}

/// Single-valued parameters captured from a route template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams {
    params: Vec<(String, String)>,
}

impl PathParams {
    /// Creates an empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `key`, replacing an earlier value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.params.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.params.push((key, value)),
        }
    }

    /// The value captured for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Number of parameters.
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Returns true if no parameter was captured.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Iterates in capture order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Converts into a mapping with one value per key.
    pub fn to_value_map(&self) -> ValueMap {
        self.iter().collect()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PathParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = PathParams::new();
        for (key, value) in iter {
            params.insert(key, value);
        }
        params
    }
}

/// Decodes the query string of `url` (absolute or origin-form).
///
/// # Examples
///
/// ```
/// use formbind::decode_query;
///
/// let map = decode_query("/search?q=rust+lang&tag=a&tag=b#top");
/// assert_eq!(map.first("q"), Some("rust lang"));
/// assert_eq!(map.get("tag").unwrap(), ["a", "b"]);
/// ```
pub fn decode_query(url: &str) -> ValueMap {
    let without_fragment = url.split_once('#').map_or(url, |(head, _)| head);
    match without_fragment.split_once('?') {
        Some((_, query)) => decode_urlencoded(query.as_bytes()),
        None => ValueMap::new(),
    }
}

fn decode_urlencoded(input: &[u8]) -> ValueMap {
    form_urlencoded::parse(input)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

/// Decodes a url-encoded or multipart form body.
///
/// File parts of multipart bodies are ignored.
///
/// # Errors
///
/// - [`BindError::BodyDecoderRequired`] for any other content type
/// - [`BindError::MalformedBody`] for a multipart body that cannot be split
pub fn decode_form_body(body: &[u8], content_type: &str) -> Result<ValueMap, BindError> {
    match media_type(content_type).as_str() {
        MIME_POST_FORM => Ok(decode_urlencoded(body)),
        MIME_MULTIPART_POST_FORM => {
            let boundary = content_type_param(content_type, "boundary").ok_or_else(|| {
                BindError::MalformedBody {
                    reason: "multipart content type without boundary".to_string(),
                }
            })?;
            decode_multipart(body, &boundary)
        }
        _ => Err(BindError::BodyDecoderRequired {
            content_type: content_type.to_string(),
        }),
    }
}

/// Lowercased media type without parameters.
pub fn media_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

fn content_type_param(content_type: &str, name: &str) -> Option<String> {
    content_type.split(';').skip(1).find_map(|param| {
        let (key, value) = param.split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case(name)
            .then(|| value.trim().trim_matches('"').to_string())
    })
}

fn find(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    if from > haystack.len() {
        return None;
    }
    haystack[from..]
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|p| p + from)
}

fn decode_multipart(body: &[u8], boundary: &str) -> Result<ValueMap, BindError> {
    let malformed = |reason: &str| BindError::MalformedBody {
        reason: reason.to_string(),
    };
    let delimiter = format!("--{}", boundary).into_bytes();
    let separator = format!("\r\n--{}", boundary).into_bytes();

    let mut map = ValueMap::new();
    let mut pos = find(body, &delimiter, 0).ok_or_else(|| malformed("missing opening boundary"))?
        + delimiter.len();

    loop {
        if body[pos..].starts_with(b"--") {
            return Ok(map);
        }
        // transport padding may follow a boundary line
        while matches!(body.get(pos), Some(b' ' | b'\t')) {
            pos += 1;
        }
        if !body[pos..].starts_with(b"\r\n") {
            return Err(malformed("boundary not followed by CRLF"));
        }
        pos += 2;

        let (headers, content_start) = if body[pos..].starts_with(b"\r\n") {
            ("", pos + 2)
        } else {
            let headers_end = find(body, b"\r\n\r\n", pos)
                .ok_or_else(|| malformed("unterminated part headers"))?;
            let headers = std::str::from_utf8(&body[pos..headers_end])
                .map_err(|_| malformed("part headers are not UTF-8"))?;
            (headers, headers_end + 4)
        };
        let content_end =
            find(body, &separator, content_start).ok_or_else(|| malformed("missing closing boundary"))?;

        if let Some(name) = form_field_name(headers) {
            let value = std::str::from_utf8(&body[content_start..content_end])
                .map_err(|_| malformed("form field value is not UTF-8"))?;
            map.insert(name, value);
        }
        pos = content_end + separator.len();
    }
}

/// Name of a non-file form-data part.
fn form_field_name(headers: &str) -> Option<String> {
    // folded header lines continue the previous one
    let unfolded = headers.replace("\r\n ", " ").replace("\r\n\t", " ");
    let disposition = unfolded.split("\r\n").find_map(|line| {
        let (name, value) = line.split_once(':')?;
        name.trim()
            .eq_ignore_ascii_case("content-disposition")
            .then_some(value)
    })?;

    let mut params = split_params(disposition).into_iter();
    if !params.next()?.trim().eq_ignore_ascii_case("form-data") {
        return None;
    }
    let mut field = None;
    for param in params {
        let Some((key, value)) = param.split_once('=') else {
            continue;
        };
        match key.trim().to_ascii_lowercase().as_str() {
            "filename" | "filename*" => return None,
            "name" => field = Some(unquote(value.trim())),
            _ => {}
        }
    }
    field
}

/// Splits a header value on `;` outside quoted strings.
fn split_params(value: &str) -> Vec<&str> {
    let mut params = Vec::new();
    let mut start = 0;
    let mut quoted = false;
    let mut escaped = false;
    for (i, c) in value.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' if quoted => escaped = true,
            '"' => quoted = !quoted,
            ';' if !quoted => {
                params.push(&value[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    params.push(&value[start..]);
    params
}

fn unquote(value: &str) -> String {
    let Some(inner) = value.strip_prefix('"').and_then(|v| v.strip_suffix('"')) else {
        return value.to_string();
    };
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.extend(chars.next()),
            _ => out.push(c),
        }
    }
    out
}

/// Matches `path` against a route template.
///
/// `:name` captures one segment, `*name` captures the remainder of the path
/// (without its leading slash). Literal segments must match exactly.
///
/// # Examples
///
/// ```
/// use formbind::extract_path_params;
///
/// let params = extract_path_params("/users/:id/files/*path", "/users/42/files/a/b.txt").unwrap();
/// assert_eq!(params.get("id"), Some("42"));
/// assert_eq!(params.get("path"), Some("a/b.txt"));
/// assert!(extract_path_params("/users/:id", "/teams/42").is_none());
/// ```
pub fn extract_path_params(route: &str, path: &str) -> Option<PathParams> {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let mut route_segments = route.trim_start_matches('/').split('/');
    let mut path_segments = path.trim_start_matches('/').split('/');
    let mut params = PathParams::new();

    loop {
        match (route_segments.next(), path_segments.next()) {
            (None, None) => return Some(params),
            (Some(segment), rest) if segment.starts_with('*') => {
                let mut tail: Vec<&str> = rest.into_iter().collect();
                tail.extend(path_segments);
                params.insert(&segment[1..], tail.join("/"));
                return Some(params);
            }
            (Some(segment), Some(value)) if segment.starts_with(':') => {
                if value.is_empty() {
                    return None;
                }
                params.insert(&segment[1..], value);
            }
            (Some(segment), Some(value)) if segment == value => {}
            _ => return None,
        }
    }
}
