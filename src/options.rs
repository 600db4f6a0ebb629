use chrono_tz::Tz;

use crate::mapping::ValueMap;

/// Which source wins when the query string and a form body share a key.
///
/// Values of the preferred source come first in the merged sequence, so
/// scalar fields take the preferred source's value while sequence fields
/// receive both sources in that order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormPrecedence {
    /// Form body values first
    #[default]
    BodyFirst,
    /// Query string values first
    QueryFirst,
}

impl FormPrecedence {
    /// Merges the two sources according to the precedence.
    pub fn merge(self, query: ValueMap, body: ValueMap) -> ValueMap {
        let (mut first, second) = match self {
            FormPrecedence::BodyFirst => (body, query),
            FormPrecedence::QueryFirst => (query, body),
        };
        first.append(second);
        first
    }
}

/// Per-binder configuration, fixed once the binder is built.
///
/// # Examples
///
/// ```
/// use formbind::{BindOptions, FormPrecedence};
///
/// let options = BindOptions::default()
///     .with_strict_tags(true)
///     .with_form_precedence(FormPrecedence::QueryFirst);
/// assert!(options.strict_tags);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindOptions {
    /// Fail on malformed annotations instead of skipping the field.
    pub strict_tags: bool,
    /// Zone for timestamps with neither `time_utc` nor `time_location`.
    pub default_time_zone: Tz,
    /// Merge order of query and body values for the `form` strategy.
    pub form_precedence: FormPrecedence,
}

impl Default for BindOptions {
    fn default() -> Self {
        Self {
            strict_tags: false,
            default_time_zone: Tz::UTC,
            form_precedence: FormPrecedence::default(),
        }
    }
}

impl BindOptions {
    /// Sets strict annotation parsing.
    pub fn with_strict_tags(mut self, strict: bool) -> Self {
        self.strict_tags = strict;
        self
    }

    /// Sets the fallback zone for timestamp fields.
    pub fn with_default_time_zone(mut self, zone: Tz) -> Self {
        self.default_time_zone = zone;
        self
    }

    /// Sets the query/body merge order.
    pub fn with_form_precedence(mut self, precedence: FormPrecedence) -> Self {
        self.form_precedence = precedence;
        self
    }
}
