use std::fmt;
use std::num::{ParseFloatError, ParseIntError};

use crate::field::Kind;

/// Errors that can occur while binding input values into a target structure.
///
/// The walker stops at the first error and returns it unchanged. Fields that
/// were written before the failure keep their new values.
#[derive(Debug, Clone, PartialEq)]
pub enum BindError {
    /// A field marked `required` had no value and no default.
    MissingRequiredField {
        /// Dotted path of the field inside the target structure
        field: String,
        /// Binding key that was looked up
        key: String,
    },
    /// A raw value could not be converted into the field's type.
    TypeCoercionFailed {
        /// Dotted path of the field inside the target structure
        field: String,
        /// Binding key the value was found under
        key: String,
        /// The offending raw input
        raw: String,
        /// The kind the value was converted into
        target: Kind,
        /// Underlying conversion failure
        cause: CoerceError,
    },
    /// The field's type cannot be populated from a flat mapping.
    UnsupportedFieldType {
        /// Dotted path of the field inside the target structure
        field: String,
        /// The rejected kind
        kind: Kind,
    },
    /// A timestamp field is missing its format or names an unknown zone.
    InvalidTimeConfiguration {
        /// Dotted path of the field inside the target structure
        field: String,
        /// What is wrong with the configuration
        reason: String,
    },
    /// A field annotation could not be parsed (strict tag mode only).
    MalformedTag {
        /// Dotted path of the field inside the target structure
        field: String,
        /// The raw annotation string
        tag: String,
    },
    /// No strategy is registered under the requested name.
    UnknownStrategy {
        /// The requested strategy name
        name: String,
    },
    /// A strategy name was registered twice.
    DuplicateStrategy {
        /// The conflicting strategy name
        name: String,
    },
    /// The request body must be handled by a whole-body decoder.
    BodyDecoderRequired {
        /// The declared content type of the body
        content_type: String,
    },
    /// The request body could not be decoded into key/value pairs.
    MalformedBody {
        /// Why decoding failed
        reason: String,
    },
}

impl BindError {
    /// Returns the dotted field path the error refers to, if any.
    pub fn field(&self) -> Option<&str> {
        match self {
            BindError::MissingRequiredField { field, .. }
            | BindError::TypeCoercionFailed { field, .. }
            | BindError::UnsupportedFieldType { field, .. }
            | BindError::InvalidTimeConfiguration { field, .. }
            | BindError::MalformedTag { field, .. } => Some(field),
            _ => None,
        }
    }
}

impl fmt::Display for BindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindError::MissingRequiredField { field, key } => {
                write!(f, "missing required field '{}' (key '{}')", field, key)
            }
            BindError::TypeCoercionFailed {
                field,
                key,
                raw,
                target,
                cause,
            } => write!(
                f,
                "cannot bind {:?} from key '{}' into field '{}' of type {}: {}",
                raw, key, field, target, cause
            ),
            BindError::UnsupportedFieldType { field, kind } => {
                write!(f, "field '{}' has unsupported type {}", field, kind)
            }
            BindError::InvalidTimeConfiguration { field, reason } => {
                write!(f, "invalid time configuration on field '{}': {}", field, reason)
            }
            BindError::MalformedTag { field, tag } => {
                write!(f, "malformed annotation on field '{}': {:?}", field, tag)
            }
            BindError::UnknownStrategy { name } => write!(f, "unknown binding strategy '{}'", name),
            BindError::DuplicateStrategy { name } => {
                write!(f, "binding strategy '{}' registered twice", name)
            }
            BindError::BodyDecoderRequired { content_type } => {
                write!(f, "content type '{}' requires a body decoder", content_type)
            }
            BindError::MalformedBody { reason } => write!(f, "malformed request body: {}", reason),
        }
    }
}

impl std::error::Error for BindError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BindError::TypeCoercionFailed { cause, .. } => Some(cause),
            _ => None,
        }
    }
}

/// Why a single raw string could not be converted into a primitive.
#[derive(Debug, Clone, PartialEq)]
pub enum CoerceError {
    /// Malformed or out-of-range integer
    Int(ParseIntError),
    /// Malformed floating point number
    Float(ParseFloatError),
    /// Token outside the boolean grammar
    Bool,
    /// Leading sign on an unsigned integer
    Sign,
    /// Input did not match the time format
    Time(chrono::ParseError),
    /// Local time that does not exist in the target zone
    NonexistentTime,
    /// Timestamp outside the representable range
    TimeOutOfRange,
    /// Wrong number of values for a fixed-size array
    Length {
        /// Number of values the array holds
        expected: usize,
        /// Number of values supplied
        actual: usize,
    },
}

impl fmt::Display for CoerceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoerceError::Int(e) => write!(f, "{}", e),
            CoerceError::Float(e) => write!(f, "{}", e),
            CoerceError::Bool => write!(f, "invalid boolean literal"),
            CoerceError::Sign => write!(f, "unsigned value must not carry a sign"),
            CoerceError::Time(e) => write!(f, "{}", e),
            CoerceError::NonexistentTime => write!(f, "local time does not exist in zone"),
            CoerceError::TimeOutOfRange => write!(f, "timestamp out of range"),
            CoerceError::Length { expected, actual } => {
                write!(f, "expected {} values, got {}", expected, actual)
            }
        }
    }
}

impl std::error::Error for CoerceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CoerceError::Int(e) => Some(e),
            CoerceError::Float(e) => Some(e),
            CoerceError::Time(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ParseIntError> for CoerceError {
    fn from(e: ParseIntError) -> Self {
        CoerceError::Int(e)
    }
}

impl From<ParseFloatError> for CoerceError {
    fn from(e: ParseFloatError) -> Self {
        CoerceError::Float(e)
    }
}

impl From<chrono::ParseError> for CoerceError {
    fn from(e: chrono::ParseError) -> Self {
        CoerceError::Time(e)
    }
}
