use std::fmt;

use crate::mapping::{PathParams, ValueMap};

/// HTTP method of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    /// HTTP GET method
    Get,
    /// HTTP HEAD method
    Head,
    /// HTTP POST method
    Post,
    /// HTTP PUT method
    Put,
    /// HTTP PATCH method
    Patch,
    /// HTTP DELETE method
    Delete,
    /// HTTP OPTIONS method
    Options,
}

impl HttpMethod {
    /// Parses a method name, case-insensitively.
    pub fn from_name(name: &str) -> Option<Self> {
        const METHODS: [(&str, HttpMethod); 7] = [
            ("GET", HttpMethod::Get),
            ("HEAD", HttpMethod::Head),
            ("POST", HttpMethod::Post),
            ("PUT", HttpMethod::Put),
            ("PATCH", HttpMethod::Patch),
            ("DELETE", HttpMethod::Delete),
            ("OPTIONS", HttpMethod::Options),
        ];
        METHODS
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, m)| *m)
    }

    /// Returns true for methods whose body carries form fields.
    pub fn has_body(self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HttpMethod::Get => write!(f, "GET"),
            HttpMethod::Head => write!(f, "HEAD"),
            HttpMethod::Post => write!(f, "POST"),
            HttpMethod::Put => write!(f, "PUT"),
            HttpMethod::Patch => write!(f, "PATCH"),
            HttpMethod::Delete => write!(f, "DELETE"),
            HttpMethod::Options => write!(f, "OPTIONS"),
        }
    }
}

/// Framework-neutral view of an incoming request.
///
/// Holds owned data only. Framework integrations convert their request
/// type into a `RawRequest` before binding.
///
/// # Examples
///
/// ```
/// use formbind::{HttpMethod, RawRequest};
///
/// let mut request = RawRequest::new(HttpMethod::Post, "/login?next=%2Fhome")
///     .with_body("application/x-www-form-urlencoded", "user=alice");
/// request.add_header("X-Request-Id", "req-1");
/// request.add_path_param("tenant", "acme");
///
/// assert_eq!(request.content_type(), "application/x-www-form-urlencoded");
/// assert_eq!(request.headers().first("x-request-id"), Some("req-1"));
/// assert_eq!(request.path_params().get("tenant"), Some("acme"));
/// ```
#[derive(Debug, Clone)]
pub struct RawRequest {
    method: HttpMethod,
    url: String,
    content_type: Option<String>,
    body: Vec<u8>,
    headers: ValueMap,
    path_params: PathParams,
}

impl RawRequest {
    /// Creates a request without body, headers or path parameters.
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            content_type: None,
            body: Vec::new(),
            headers: ValueMap::case_insensitive(),
            path_params: PathParams::new(),
        }
    }

    /// Attaches a body with its content type.
    pub fn with_body(mut self, content_type: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        self.content_type = Some(content_type.into());
        self.body = body.into();
        self
    }

    /// Adds a header value. Repeated names accumulate.
    pub fn add_header(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
        self.headers.insert(name, value);
    }

    /// Adds a path parameter captured by the router.
    pub fn add_path_param(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.path_params.insert(name, value);
    }

    /// Replaces all path parameters.
    pub fn set_path_params(&mut self, params: PathParams) {
        self.path_params = params;
    }

    /// Returns the request method.
    pub fn method(&self) -> HttpMethod {
        self.method
    }

    /// Returns the request target as received.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns the body content type, falling back to the `Content-Type`
    /// header, or an empty string.
    pub fn content_type(&self) -> &str {
        self.content_type
            .as_deref()
            .or_else(|| self.headers.first("content-type"))
            .unwrap_or_default()
    }

    /// Returns the raw body bytes.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Returns the headers, keyed case-insensitively.
    pub fn headers(&self) -> &ValueMap {
        &self.headers
    }

    /// Returns the path parameters.
    pub fn path_params(&self) -> &PathParams {
        &self.path_params
    }
}
