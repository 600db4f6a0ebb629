//! Depth-first traversal of a target structure.

use crate::coerce::TimeSpec;
use crate::error::{BindError, CoerceError};
use crate::field::{Field, Kind, Slot};
use crate::mapping::ValueMap;
use crate::options::BindOptions;
use crate::setter::{set_values, SetError};
use crate::tag::{self, SkipReason, TagDescriptor, TagParse};

/// Annotation key read by [`bind_from_mapping`].
pub const DEFAULT_TAG_KEY: &str = "form";

/// A structure whose fields can be populated from a [`ValueMap`].
///
/// Implementations list every field in declaration order. [`impl_bind!`]
/// generates one from a field list:
///
/// ```
/// use formbind::{bind_from_mapping, impl_bind, ValueMap};
///
/// #[derive(Default)]
/// struct Page {
///     number: u32,
///     size: Option<u8>,
///     cursor: String,
/// }
///
/// impl_bind!(Page {
///     number: r#"form:"page,default=1""#,
///     size: r#"form:"size""#,
///     #[unexported] cursor: r#"form:"cursor""#,
/// });
///
/// let input: ValueMap = [("size", "20"), ("cursor", "abc")].into_iter().collect();
/// let mut page = Page::default();
/// bind_from_mapping(&input, &mut page).unwrap();
/// assert_eq!(page.number, 1);
/// assert_eq!(page.size, Some(20));
/// assert_eq!(page.cursor, "");
/// ```
pub trait Bind {
    /// Visits every field through `fields`, stopping at the first error.
    fn bind_fields(&mut self, fields: &mut Fields<'_>) -> Result<(), BindError>;
}

/// Per-call visitor handed to [`Bind::bind_fields`].
pub struct Fields<'a> {
    mapping: &'a ValueMap,
    tag_key: &'a str,
    options: &'a BindOptions,
    path: Vec<&'static str>,
    assigned: usize,
    scan_only: bool,
}

impl<'a> Fields<'a> {
    fn new(mapping: &'a ValueMap, tag_key: &'a str, options: &'a BindOptions) -> Self {
        Self {
            mapping,
            tag_key,
            options,
            path: Vec::new(),
            assigned: 0,
            scan_only: false,
        }
    }

    /// Binds one field described by `annotation`.
    pub fn field<F: Field>(
        &mut self,
        name: &'static str,
        annotation: &str,
        value: &mut F,
    ) -> Result<(), BindError> {
        self.visit(name, annotation, &F::kind(), value)
    }

    /// Records a field that binding must never write.
    pub fn unexported(&mut self, name: &'static str, annotation: &str) {
        tracing::trace!(field = %self.path_of(name), annotation, "skipping unexported field");
    }

    fn visit(
        &mut self,
        name: &'static str,
        annotation: &str,
        kind: &Kind,
        value: &mut dyn Field,
    ) -> Result<(), BindError> {
        if kind.contains_map() {
            return Err(BindError::UnsupportedFieldType {
                field: self.path_of(name),
                kind: kind.clone(),
            });
        }
        if self.scan_only {
            if *kind.pointee() == Kind::Struct {
                return self.descend(name, value);
            }
            return Ok(());
        }
        if self.options.strict_tags && !tag::is_well_formed(annotation) {
            return Err(BindError::MalformedTag {
                field: self.path_of(name),
                tag: annotation.to_string(),
            });
        }

        let parsed = tag::parse(annotation, self.tag_key);
        if parsed == TagParse::Skip(SkipReason::Ignored) {
            tracing::trace!(field = %self.path_of(name), "field opted out");
            if *kind.pointee() == Kind::Struct {
                return self.scan(name, value);
            }
            return Ok(());
        }
        if *kind.pointee() == Kind::Struct {
            return self.descend(name, value);
        }
        if *kind.leaf() == Kind::Struct {
            return Err(BindError::UnsupportedFieldType {
                field: self.path_of(name),
                kind: kind.clone(),
            });
        }

        let desc = match parsed {
            TagParse::Bind(desc) => desc,
            TagParse::Skip(reason) => {
                tracing::trace!(field = %self.path_of(name), ?reason, "no binding key");
                return Ok(());
            }
        };

        let Some(values) = self.values_for(name, &desc)? else {
            return Ok(());
        };

        let time = if *kind.leaf() == Kind::Time {
            let spec = TimeSpec::resolve(&desc, self.options.default_time_zone).map_err(|reason| {
                BindError::InvalidTimeConfiguration {
                    field: self.path_of(name),
                    reason,
                }
            })?;
            Some(spec)
        } else {
            None
        };

        set_values(value, kind, &values, time.as_ref()).map_err(|err| match err {
            SetError::Coerce { raw, cause } => BindError::TypeCoercionFailed {
                field: self.path_of(name),
                key: desc.key.clone(),
                raw,
                target: match cause {
                    CoerceError::Length { .. } => kind.clone(),
                    _ => kind.leaf().clone(),
                },
                cause,
            },
            SetError::Unsupported => BindError::UnsupportedFieldType {
                field: self.path_of(name),
                kind: kind.clone(),
            },
        })?;
        self.assigned += 1;
        Ok(())
    }

    /// Resolves the raw values for a field, applying defaults and the
    /// required check. `None` leaves the field untouched.
    fn values_for(
        &self,
        name: &'static str,
        desc: &TagDescriptor,
    ) -> Result<Option<Vec<String>>, BindError> {
        let supplied = self.mapping.get(&desc.key);
        let present = supplied.is_some_and(|values| values.iter().any(|v| !v.is_empty()));

        match (present, &desc.default, supplied) {
            (false, Some(default), _) => Ok(Some(vec![default.clone()])),
            (_, _, Some(values)) => Ok(Some(values.to_vec())),
            (_, _, None) if desc.required => Err(BindError::MissingRequiredField {
                field: self.path_of(name),
                key: desc.key.clone(),
            }),
            (_, _, None) => {
                tracing::trace!(field = %self.path_of(name), key = %desc.key, "key absent");
                Ok(None)
            }
        }
    }

    /// Walks an opted-out structure for map fields only. Nothing inside it
    /// is written.
    fn scan(&mut self, name: &'static str, value: &mut dyn Field) -> Result<(), BindError> {
        let outer = std::mem::replace(&mut self.scan_only, true);
        let result = self.descend(name, value);
        self.scan_only = outer;
        result
    }

    fn descend(&mut self, name: &'static str, value: &mut dyn Field) -> Result<(), BindError> {
        match value.slot() {
            Slot::Pointer(pointer) => {
                // an optional structure stays empty unless one of its fields was set
                let fresh = !pointer.is_allocated();
                let before = self.assigned;
                let result = self.descend(name, pointer.alloc());
                if fresh && self.assigned == before {
                    pointer.release();
                }
                result
            }
            Slot::Struct(inner) => {
                self.path.push(name);
                let result = inner.bind_fields(self);
                self.path.pop();
                result
            }
            _ => Err(BindError::UnsupportedFieldType {
                field: self.path_of(name),
                kind: Kind::Struct,
            }),
        }
    }

    fn path_of(&self, name: &str) -> String {
        let mut path = self.path.join(".");
        if !path.is_empty() {
            path.push('.');
        }
        path.push_str(name);
        path
    }
}

/// Binds `mapping` into `target` using the `form` annotation key and default
/// options.
///
/// # Errors
///
/// Returns the first [`BindError`] met during the walk. Fields written
/// before the failure keep their new values.
pub fn bind_from_mapping<T: Bind + ?Sized>(
    mapping: &ValueMap,
    target: &mut T,
) -> Result<(), BindError> {
    bind_mapping_with(mapping, DEFAULT_TAG_KEY, &BindOptions::default(), target)
}

/// Binds `mapping` into `target`, reading binding keys from the annotation
/// entry `tag_key`.
pub fn bind_mapping_with<T: Bind + ?Sized>(
    mapping: &ValueMap,
    tag_key: &str,
    options: &BindOptions,
    target: &mut T,
) -> Result<(), BindError> {
    let mut fields = Fields::new(mapping, tag_key, options);
    target.bind_fields(&mut fields)
}

/// Implements [`Bind`] and [`Field`] for a structure from its field list.
///
/// Each entry is `field: "annotation"`. Prefix an entry with
/// `#[unexported]` to declare a field that binding must never touch.
#[macro_export]
macro_rules! impl_bind {
    (@field $this:ident, $fields:ident, #[unexported] $field:ident, $tag:expr) => {
        $fields.unexported(stringify!($field), $tag);
    };
    (@field $this:ident, $fields:ident, $field:ident, $tag:expr) => {
        $fields.field(stringify!($field), $tag, &mut $this.$field)?;
    };
    ($ty:ty { $($(#[$marker:ident])? $field:ident : $tag:expr),* $(,)? }) => {
        impl $crate::Bind for $ty {
            #[allow(unused_variables)]
            fn bind_fields(
                &mut self,
                fields: &mut $crate::Fields<'_>,
            ) -> ::core::result::Result<(), $crate::BindError> {
                $( $crate::impl_bind!(@field self, fields, $(#[$marker])? $field, $tag); )*
                ::core::result::Result::Ok(())
            }
        }

        impl $crate::Field for $ty {
            fn kind() -> $crate::Kind {
                $crate::Kind::Struct
            }

            fn slot(&mut self) -> $crate::Slot<'_> {
                $crate::Slot::Struct(self)
            }
        }
    };
}
