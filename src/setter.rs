//! Writes coerced values into fields.

use crate::coerce::{parse_bool, parse_float, parse_int, parse_time, parse_uint, TimeSpec};
use crate::error::CoerceError;
use crate::field::{Field, Kind, Slot};

/// Why a value could not be written.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum SetError {
    /// The raw input did not convert.
    Coerce { raw: String, cause: CoerceError },
    /// The slot is not a scalar, or a timestamp has no time spec.
    Unsupported,
}

/// Writes `values` into `field`.
///
/// Sequence and array kinds receive every value in order; all other kinds
/// receive the first value. `Option` layers are allocated on the way down.
pub(crate) fn set_values(
    field: &mut dyn Field,
    kind: &Kind,
    values: &[String],
    time: Option<&TimeSpec>,
) -> Result<(), SetError> {
    if kind.element().is_some() {
        return set_sequence(field, values, time);
    }
    match values.first() {
        Some(raw) => set_value(field, raw, time),
        None => Ok(()),
    }
}

fn set_sequence(
    field: &mut dyn Field,
    values: &[String],
    time: Option<&TimeSpec>,
) -> Result<(), SetError> {
    match field.slot() {
        Slot::Pointer(pointer) => set_sequence(pointer.alloc(), values, time),
        Slot::Sequence(seq) => {
            seq.reset(values.len())
                .map_err(|expected| SetError::Coerce {
                    raw: values.join(","),
                    cause: CoerceError::Length {
                        expected,
                        actual: values.len(),
                    },
                })?;
            for (element, raw) in seq.elements().into_iter().zip(values) {
                set_value(element, raw, time)?;
            }
            Ok(())
        }
        _ => Err(SetError::Unsupported),
    }
}

fn set_value(field: &mut dyn Field, raw: &str, time: Option<&TimeSpec>) -> Result<(), SetError> {
    let coerce = |cause: CoerceError| SetError::Coerce {
        raw: raw.to_string(),
        cause,
    };

    match field.slot() {
        Slot::Pointer(pointer) => set_value(pointer.alloc(), raw, time),
        Slot::Bool(v) => parse_bool(raw).map(|x| *v = x).map_err(coerce),
        Slot::I8(v) => parse_int(raw).map(|x| *v = x).map_err(coerce),
        Slot::I16(v) => parse_int(raw).map(|x| *v = x).map_err(coerce),
        Slot::I32(v) => parse_int(raw).map(|x| *v = x).map_err(coerce),
        Slot::I64(v) => parse_int(raw).map(|x| *v = x).map_err(coerce),
        Slot::U8(v) => parse_uint(raw).map(|x| *v = x).map_err(coerce),
        Slot::U16(v) => parse_uint(raw).map(|x| *v = x).map_err(coerce),
        Slot::U32(v) => parse_uint(raw).map(|x| *v = x).map_err(coerce),
        Slot::U64(v) => parse_uint(raw).map(|x| *v = x).map_err(coerce),
        Slot::F32(v) => parse_float(raw).map(|x| *v = x).map_err(coerce),
        Slot::F64(v) => parse_float(raw).map(|x| *v = x).map_err(coerce),
        Slot::String(v) => {
            raw.clone_into(v);
            Ok(())
        }
        Slot::Time(v) => {
            let spec = time.ok_or(SetError::Unsupported)?;
            parse_time(raw, spec).map(|x| *v = x).map_err(coerce)
        }
        Slot::Sequence(_) | Slot::Struct(_) | Slot::Map => Err(SetError::Unsupported),
    }
}
