//! Tag-driven binding of request values into typed structures.
//!
//! This crate populates plain Rust structs from flat key → values mappings
//! such as URL query strings, form bodies, route parameters and headers:
//! - **Annotations**: each field carries a `form:"key,default=value"` style
//!   string naming its key, default, `required` flag and time directives
//! - **Coercion**: raw strings become integers, floats, booleans, strings
//!   and zone-aware [`Timestamp`]s, width-checked and with precise errors
//! - **Strategies**: a [`Binder`] picks which part of a request feeds the
//!   mapping and which annotation entry names the keys
//!
//! # Core Types
//!
//! - [`Bind`]: implemented for target structs, usually through [`impl_bind!`]
//! - [`Field`] / [`Kind`]: the shape of every bindable field type
//! - [`ValueMap`]: the input mapping
//! - [`Binder`]: immutable strategy registry built with [`BinderBuilder`]
//! - [`BindError`]: the first failure met during a walk
//!
//! # Examples
//!
//! ```
//! use formbind::{bind_from_mapping, impl_bind, Timestamp, ValueMap};
//!
//! #[derive(Default)]
//! struct Search {
//!     query: String,
//!     page: u32,
//!     tags: Vec<String>,
//!     since: Option<Timestamp>,
//! }
//!
//! impl_bind!(Search {
//!     query: r#"form:"q" binding:"required""#,
//!     page: r#"form:"page,default=1""#,
//!     tags: r#"form:"tag""#,
//!     since: r#"form:"since" time_format:"2006-01-02" time_location:"Europe/Paris""#,
//! });
//!
//! let input: ValueMap = [("q", "rust"), ("tag", "web"), ("tag", "cli"), ("since", "2024-03-01")]
//!     .into_iter()
//!     .collect();
//!
//! let mut search = Search::default();
//! bind_from_mapping(&input, &mut search).unwrap();
//! assert_eq!(search.query, "rust");
//! assert_eq!(search.page, 1);
//! assert_eq!(search.tags, ["web", "cli"]);
//! assert_eq!(search.since.unwrap().zone_name(), "Europe/Paris");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod binder;
pub mod coerce;
mod error;
mod field;
pub mod layout;
mod mapping;
mod options;
mod request;
mod setter;
mod strategy;
pub mod tag;
mod timestamp;
mod walker;

pub use binder::{Binder, BinderBuilder};
pub use error::{BindError, CoerceError};
pub use field::{Field, Kind, Pointer, Sequence, Slot};
pub use mapping::{
    decode_form_body, decode_query, extract_path_params, media_type, PathParams, ValueMap,
    MIME_MULTIPART_POST_FORM, MIME_POST_FORM,
};
pub use options::{BindOptions, FormPrecedence};
pub use request::{HttpMethod, RawRequest};
pub use strategy::{
    select, BodyFormat, Form, FormMultipart, FormPost, Header, MappingStrategy, Query, Selection,
    Uri, FORM, FORM_MULTIPART, FORM_POST, HEADER, MIME_JSON, MIME_MSGPACK, MIME_MSGPACK2,
    MIME_PROTOBUF, MIME_XML, MIME_XML2, MIME_YAML, MIME_YAML2, QUERY, URI,
};
pub use timestamp::Timestamp;
pub use walker::{bind_from_mapping, bind_mapping_with, Bind, Fields, DEFAULT_TAG_KEY};
