//! Mapping-based binding strategies and strategy selection.
//!
//! A strategy decides which part of a request supplies the input mapping and
//! which annotation entry names the binding keys. Whole-body formats such as
//! JSON are not handled here; [`select`] reports them as
//! [`Selection::Delegate`] so the caller can hand the body to a decoder.

use crate::error::BindError;
use crate::mapping::{
    decode_form_body, decode_query, media_type, ValueMap, MIME_MULTIPART_POST_FORM, MIME_POST_FORM,
};
use crate::options::BindOptions;
use crate::request::{HttpMethod, RawRequest};

/// Media type of JSON bodies.
pub const MIME_JSON: &str = "application/json";
/// Media type of XML bodies.
pub const MIME_XML: &str = "application/xml";
/// Alternative media type of XML bodies.
pub const MIME_XML2: &str = "text/xml";
/// Media type of YAML bodies.
pub const MIME_YAML: &str = "application/x-yaml";
/// Alternative media type of YAML bodies.
pub const MIME_YAML2: &str = "application/yaml";
/// Media type of MessagePack bodies.
pub const MIME_MSGPACK: &str = "application/x-msgpack";
/// Alternative media type of MessagePack bodies.
pub const MIME_MSGPACK2: &str = "application/msgpack";
/// Media type of Protocol Buffers bodies.
pub const MIME_PROTOBUF: &str = "application/x-protobuf";

/// Name of the [`Query`] strategy.
pub const QUERY: &str = "query";
/// Name of the [`Form`] strategy.
pub const FORM: &str = "form";
/// Name of the [`FormPost`] strategy.
pub const FORM_POST: &str = "form-urlencoded";
/// Name of the [`FormMultipart`] strategy.
pub const FORM_MULTIPART: &str = "multipart/form-data";
/// Name of the [`Uri`] strategy.
pub const URI: &str = "uri";
/// Name of the [`Header`] strategy.
pub const HEADER: &str = "header";

/// Produces the input mapping for one part of a request.
pub trait MappingStrategy: Send + Sync {
    /// Registry name of the strategy.
    fn name(&self) -> &'static str;

    /// Annotation entry holding the binding keys.
    fn tag_key(&self) -> &'static str {
        "form"
    }

    /// Builds the input mapping from `request`.
    fn mapping(&self, request: &RawRequest, options: &BindOptions) -> Result<ValueMap, BindError>;
}

/// URL query string only.
#[derive(Debug, Clone, Copy, Default)]
pub struct Query;

impl MappingStrategy for Query {
    fn name(&self) -> &'static str {
        QUERY
    }

    fn mapping(&self, request: &RawRequest, _: &BindOptions) -> Result<ValueMap, BindError> {
        Ok(decode_query(request.url()))
    }
}

/// Query string merged with a url-encoded or multipart body.
///
/// Bodies of other content types, and bodies of methods that carry no form
/// fields, are ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct Form;

impl MappingStrategy for Form {
    fn name(&self) -> &'static str {
        FORM
    }

    fn mapping(&self, request: &RawRequest, options: &BindOptions) -> Result<ValueMap, BindError> {
        let query = decode_query(request.url());
        if !request.method().has_body() {
            return Ok(query);
        }

        let content_type = request.content_type();
        let body = match media_type(content_type).as_str() {
            MIME_POST_FORM | MIME_MULTIPART_POST_FORM => {
                decode_form_body(request.body(), content_type)?
            }
            _ => ValueMap::new(),
        };
        Ok(options.form_precedence.merge(query, body))
    }
}

/// Url-encoded body only. Other content types yield an empty mapping.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormPost;

impl MappingStrategy for FormPost {
    fn name(&self) -> &'static str {
        FORM_POST
    }

    fn mapping(&self, request: &RawRequest, _: &BindOptions) -> Result<ValueMap, BindError> {
        let content_type = request.content_type();
        if media_type(content_type) == MIME_POST_FORM {
            decode_form_body(request.body(), content_type)
        } else {
            Ok(ValueMap::new())
        }
    }
}

/// Text fields of a multipart body. File parts are ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormMultipart;

impl MappingStrategy for FormMultipart {
    fn name(&self) -> &'static str {
        FORM_MULTIPART
    }

    fn mapping(&self, request: &RawRequest, _: &BindOptions) -> Result<ValueMap, BindError> {
        let content_type = request.content_type();
        if media_type(content_type) != MIME_MULTIPART_POST_FORM {
            return Err(BindError::MalformedBody {
                reason: format!("expected {} body, got {:?}", MIME_MULTIPART_POST_FORM, content_type),
            });
        }
        decode_form_body(request.body(), content_type)
    }
}

/// Path parameters captured by the router.
#[derive(Debug, Clone, Copy, Default)]
pub struct Uri;

impl MappingStrategy for Uri {
    fn name(&self) -> &'static str {
        URI
    }

    fn tag_key(&self) -> &'static str {
        "uri"
    }

    fn mapping(&self, request: &RawRequest, _: &BindOptions) -> Result<ValueMap, BindError> {
        Ok(request.path_params().to_value_map())
    }
}

/// Request headers, with case-insensitive keys.
#[derive(Debug, Clone, Copy, Default)]
pub struct Header;

impl MappingStrategy for Header {
    fn name(&self) -> &'static str {
        HEADER
    }

    fn tag_key(&self) -> &'static str {
        "header"
    }

    fn mapping(&self, request: &RawRequest, _: &BindOptions) -> Result<ValueMap, BindError> {
        Ok(request.headers().clone())
    }
}

/// A body format that needs a whole-body decoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodyFormat {
    /// JSON document
    Json,
    /// XML document
    Xml,
    /// YAML document
    Yaml,
    /// MessagePack document
    MsgPack,
    /// Protocol Buffers message
    ProtoBuf,
    /// Any other media type, lowercased without parameters
    Other(String),
}

/// Outcome of [`select`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Bind through the named mapping strategy.
    Mapping(&'static str),
    /// Hand the body to a decoder for this format.
    Delegate(BodyFormat),
}

/// Picks a strategy from the request method and declared content type.
///
/// Methods without a form body read the query string. Url-encoded and
/// multipart bodies use the merged form strategy. Everything else is
/// delegated.
///
/// # Examples
///
/// ```
/// use formbind::{select, BodyFormat, HttpMethod, Selection};
///
/// assert_eq!(select(HttpMethod::Get, ""), Selection::Mapping("query"));
/// assert_eq!(
///     select(HttpMethod::Post, "application/x-www-form-urlencoded"),
///     Selection::Mapping("form"),
/// );
/// assert_eq!(
///     select(HttpMethod::Post, "application/json; charset=utf-8"),
///     Selection::Delegate(BodyFormat::Json),
/// );
/// ```
pub fn select(method: HttpMethod, content_type: &str) -> Selection {
    if !method.has_body() {
        return Selection::Mapping(QUERY);
    }
    let media = media_type(content_type);
    match media.as_str() {
        MIME_POST_FORM | MIME_MULTIPART_POST_FORM => Selection::Mapping(FORM),
        MIME_JSON => Selection::Delegate(BodyFormat::Json),
        MIME_XML | MIME_XML2 => Selection::Delegate(BodyFormat::Xml),
        MIME_YAML | MIME_YAML2 => Selection::Delegate(BodyFormat::Yaml),
        MIME_MSGPACK | MIME_MSGPACK2 => Selection::Delegate(BodyFormat::MsgPack),
        MIME_PROTOBUF => Selection::Delegate(BodyFormat::ProtoBuf),
        _ => Selection::Delegate(BodyFormat::Other(media)),
    }
}
