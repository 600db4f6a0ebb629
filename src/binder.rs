use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::BindError;
use crate::mapping::{PathParams, ValueMap};
use crate::options::BindOptions;
use crate::request::RawRequest;
use crate::strategy::{
    select, Form, FormMultipart, FormPost, Header, MappingStrategy, Query, Selection, Uri, URI,
};
use crate::walker::{bind_mapping_with, Bind};

/// Immutable registry of binding strategies.
///
/// `Binder` is the only entry point that binds whole requests. It is built
/// once with [`BinderBuilder`] and shared by reference afterwards.
///
/// # Examples
///
/// ```
/// use formbind::{impl_bind, Binder, HttpMethod, RawRequest};
///
/// #[derive(Default)]
/// struct Login {
///     user: String,
///     remember: bool,
/// }
///
/// impl_bind!(Login {
///     user: r#"form:"user" binding:"required""#,
///     remember: r#"form:"remember,default=false""#,
/// });
///
/// let binder = Binder::builder().with_builtin_strategies().build().unwrap();
/// let request = RawRequest::new(HttpMethod::Post, "/login")
///     .with_body("application/x-www-form-urlencoded", "user=alice&remember=true");
///
/// let mut login = Login::default();
/// binder.bind_request(&request, &mut login).unwrap();
/// assert_eq!(login.user, "alice");
/// assert!(login.remember);
/// ```
#[derive(Clone)]
pub struct Binder {
    strategies: HashMap<&'static str, Arc<dyn MappingStrategy>>,
    options: BindOptions,
}

impl fmt::Debug for Binder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binder")
            .field("strategies", &self.strategy_names())
            .field("options", &self.options)
            .finish()
    }
}

impl Default for Binder {
    /// A binder with the builtin strategies and default options.
    fn default() -> Self {
        let strategies: [Arc<dyn MappingStrategy>; 6] = [
            Arc::new(Query),
            Arc::new(Form),
            Arc::new(FormPost),
            Arc::new(FormMultipart),
            Arc::new(Uri),
            Arc::new(Header),
        ];
        Self {
            strategies: strategies.into_iter().map(|s| (s.name(), s)).collect(),
            options: BindOptions::default(),
        }
    }
}

impl Binder {
    /// Starts an empty builder.
    pub fn builder() -> BinderBuilder {
        BinderBuilder::new()
    }

    /// Returns the options applied to every call.
    pub fn options(&self) -> &BindOptions {
        &self.options
    }

    /// Returns the registered strategy names, sorted.
    pub fn strategy_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.strategies.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Binds `request` into `target` through the strategy called `name`.
    ///
    /// # Errors
    ///
    /// Returns [`BindError::UnknownStrategy`] when no strategy has that name,
    /// or the first error raised while building the mapping or walking
    /// `target`.
    pub fn bind<T: Bind + ?Sized>(
        &self,
        name: &str,
        request: &RawRequest,
        target: &mut T,
    ) -> Result<(), BindError> {
        let strategy = self
            .strategies
            .get(name)
            .ok_or_else(|| BindError::UnknownStrategy {
                name: name.to_string(),
            })?;

        let mapping = strategy.mapping(request, &self.options)?;
        tracing::debug!(
            strategy = strategy.name(),
            method = %request.method(),
            keys = mapping.len(),
            "binding request"
        );
        bind_mapping_with(&mapping, strategy.tag_key(), &self.options, target)
    }

    /// Selects a strategy from the request's method and content type, then
    /// binds through it.
    ///
    /// # Errors
    ///
    /// Returns [`BindError::BodyDecoderRequired`] when the content type needs
    /// a whole-body decoder.
    pub fn bind_request<T: Bind + ?Sized>(
        &self,
        request: &RawRequest,
        target: &mut T,
    ) -> Result<(), BindError> {
        match select(request.method(), request.content_type()) {
            Selection::Mapping(name) => self.bind(name, request, target),
            Selection::Delegate(format) => {
                tracing::debug!(?format, "request body needs a decoder");
                Err(BindError::BodyDecoderRequired {
                    content_type: request.content_type().to_string(),
                })
            }
        }
    }

    /// Binds route parameters into `target` using `uri` annotations.
    pub fn bind_path<T: Bind + ?Sized>(
        &self,
        params: &PathParams,
        target: &mut T,
    ) -> Result<(), BindError> {
        bind_mapping_with(&params.to_value_map(), URI, &self.options, target)
    }

    /// Binds an already decoded mapping, reading keys from `tag_key`.
    pub fn bind_mapping<T: Bind + ?Sized>(
        &self,
        mapping: &ValueMap,
        tag_key: &str,
        target: &mut T,
    ) -> Result<(), BindError> {
        bind_mapping_with(mapping, tag_key, &self.options, target)
    }
}

/// Builder for [`Binder`].
///
/// Registration order does not matter; duplicate names are reported by
/// [`build`](BinderBuilder::build).
///
/// # Examples
///
/// ```
/// use formbind::{BindError, Binder, BindOptions, Query};
///
/// let err = Binder::builder()
///     .with_builtin_strategies()
///     .register(Query)
///     .build()
///     .unwrap_err();
/// assert_eq!(err, BindError::DuplicateStrategy { name: "query".to_string() });
///
/// let binder = Binder::builder()
///     .register(Query)
///     .options(BindOptions::default().with_strict_tags(true))
///     .build()
///     .unwrap();
/// assert_eq!(binder.strategy_names(), ["query"]);
/// ```
#[derive(Default)]
pub struct BinderBuilder {
    strategies: Vec<Arc<dyn MappingStrategy>>,
    options: BindOptions,
}

impl BinderBuilder {
    /// Creates a builder with no strategies and default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the six builtin strategies.
    pub fn with_builtin_strategies(mut self) -> Self {
        self.strategies
            .extend(Binder::default().strategies.into_values());
        self
    }

    /// Adds a strategy.
    pub fn register(mut self, strategy: impl MappingStrategy + 'static) -> Self {
        self.strategies.push(Arc::new(strategy));
        self
    }

    /// Sets the options used by every call.
    pub fn options(mut self, options: BindOptions) -> Self {
        self.options = options;
        self
    }

    /// Builds the registry.
    ///
    /// # Errors
    ///
    /// Returns [`BindError::DuplicateStrategy`] if two strategies share a
    /// name.
    pub fn build(self) -> Result<Binder, BindError> {
        let mut strategies = HashMap::with_capacity(self.strategies.len());
        for strategy in self.strategies {
            let name = strategy.name();
            if strategies.insert(name, strategy).is_some() {
                return Err(BindError::DuplicateStrategy {
                    name: name.to_string(),
                });
            }
        }
        tracing::debug!(count = strategies.len(), "binder built");
        Ok(Binder {
            strategies,
            options: self.options,
        })
    }
}
