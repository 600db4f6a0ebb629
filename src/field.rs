//! Field kinds and typed write access.
//!
//! Rust has no runtime reflection, so every bindable type describes itself
//! through [`Field`]: a static [`Kind`] used for dispatch, and a [`Slot`]
//! giving typed mutable access to the value.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::timestamp::Timestamp;
use crate::walker::Bind;

/// The closed set of field shapes the walker understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Kind {
    /// `bool`
    Bool,
    /// `i8`
    I8,
    /// `i16`
    I16,
    /// `i32`
    I32,
    /// `i64`
    I64,
    /// `u8`
    U8,
    /// `u16`
    U16,
    /// `u32`
    U32,
    /// `u64`
    U64,
    /// `f32`
    F32,
    /// `f64`
    F64,
    /// `String`
    String,
    /// [`Timestamp`]
    Time,
    /// `Option<T>` or `Box<T>`
    Pointer(Box<Kind>),
    /// `Vec<T>`
    Sequence(Box<Kind>),
    /// `[T; N]`
    Array(Box<Kind>, usize),
    /// A type implementing [`Bind`]
    Struct,
    /// A key/value container such as `HashMap`
    UnorderedMap,
}

impl Kind {
    /// Strips pointer layers.
    pub fn pointee(&self) -> &Kind {
        match self {
            Kind::Pointer(inner) => inner.pointee(),
            other => other,
        }
    }

    /// Strips pointers, sequences and arrays down to the element kind.
    pub fn leaf(&self) -> &Kind {
        match self {
            Kind::Pointer(inner) | Kind::Sequence(inner) | Kind::Array(inner, _) => inner.leaf(),
            other => other,
        }
    }

    /// Returns true if a map appears anywhere in this kind.
    pub fn contains_map(&self) -> bool {
        match self {
            Kind::UnorderedMap => true,
            Kind::Pointer(inner) | Kind::Sequence(inner) | Kind::Array(inner, _) => {
                inner.contains_map()
            }
            _ => false,
        }
    }

    /// Returns the element kind for sequences and arrays.
    pub fn element(&self) -> Option<&Kind> {
        match self.pointee() {
            Kind::Sequence(inner) | Kind::Array(inner, _) => Some(inner),
            _ => None,
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::Bool => write!(f, "bool"),
            Kind::I8 => write!(f, "i8"),
            Kind::I16 => write!(f, "i16"),
            Kind::I32 => write!(f, "i32"),
            Kind::I64 => write!(f, "i64"),
            Kind::U8 => write!(f, "u8"),
            Kind::U16 => write!(f, "u16"),
            Kind::U32 => write!(f, "u32"),
            Kind::U64 => write!(f, "u64"),
            Kind::F32 => write!(f, "f32"),
            Kind::F64 => write!(f, "f64"),
            Kind::String => write!(f, "String"),
            Kind::Time => write!(f, "Timestamp"),
            Kind::Pointer(inner) => write!(f, "Option<{}>", inner),
            Kind::Sequence(inner) => write!(f, "Vec<{}>", inner),
            Kind::Array(inner, len) => write!(f, "[{}; {}]", inner, len),
            Kind::Struct => write!(f, "struct"),
            Kind::UnorderedMap => write!(f, "map"),
        }
    }
}

/// Typed mutable view of a field.
pub enum Slot<'a> {
    /// `bool` field
    Bool(&'a mut bool),
    /// `i8` field
    I8(&'a mut i8),
    /// `i16` field
    I16(&'a mut i16),
    /// `i32` field
    I32(&'a mut i32),
    /// `i64` field
    I64(&'a mut i64),
    /// `u8` field
    U8(&'a mut u8),
    /// `u16` field
    U16(&'a mut u16),
    /// `u32` field
    U32(&'a mut u32),
    /// `u64` field
    U64(&'a mut u64),
    /// `f32` field
    F32(&'a mut f32),
    /// `f64` field
    F64(&'a mut f64),
    /// `String` field
    String(&'a mut String),
    /// Timestamp field
    Time(&'a mut Timestamp),
    /// One level of indirection
    Pointer(&'a mut dyn Pointer),
    /// Sequence or fixed array
    Sequence(&'a mut dyn Sequence),
    /// Nested structure
    Struct(&'a mut dyn Bind),
    /// Key/value container, never writable
    Map,
}

/// A type the walker can bind into.
///
/// Implemented here for primitives, `String`, [`Timestamp`], `Option<T>`,
/// `Box<T>`, `Vec<T>`, `[T; N]` and maps. Structures get an implementation
/// from [`impl_bind!`](crate::impl_bind).
pub trait Field {
    /// Static shape of the type.
    fn kind() -> Kind
    where
        Self: Sized;

    /// Typed mutable access to the value.
    fn slot(&mut self) -> Slot<'_>;
}

/// One level of indirection that can be allocated on demand.
pub trait Pointer {
    /// Returns true if the pointee exists.
    fn is_allocated(&self) -> bool;

    /// Returns the pointee, allocating a default value first if empty.
    fn alloc(&mut self) -> &mut dyn Field;

    /// Drops the pointee again, if the pointer can be empty.
    fn release(&mut self);
}

/// A container receiving one element per repeated input value.
pub trait Sequence {
    /// Prepares the container for `len` elements.
    ///
    /// Fixed-size containers return `Err(expected)` when `len` does not
    /// match their length.
    fn reset(&mut self, len: usize) -> Result<(), usize>;

    /// Mutable access to each element, in order.
    fn elements(&mut self) -> Vec<&mut dyn Field>;
}

macro_rules! scalar_field {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl Field for $ty {
                fn kind() -> Kind {
                    Kind::$variant
                }

                fn slot(&mut self) -> Slot<'_> {
                    Slot::$variant(self)
                }
            }
        )*
    };
}

scalar_field! {
    bool => Bool,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    f32 => F32,
    f64 => F64,
    String => String,
    Timestamp => Time,
}

impl<T: Field + Default> Pointer for Option<T> {
    fn is_allocated(&self) -> bool {
        self.is_some()
    }

    fn alloc(&mut self) -> &mut dyn Field {
        self.get_or_insert_with(T::default)
    }

    fn release(&mut self) {
        *self = None;
    }
}

impl<T: Field + Default> Field for Option<T> {
    fn kind() -> Kind {
        Kind::Pointer(Box::new(T::kind()))
    }

    fn slot(&mut self) -> Slot<'_> {
        Slot::Pointer(self)
    }
}

impl<T: Field> Pointer for Box<T> {
    fn is_allocated(&self) -> bool {
        true
    }

    fn alloc(&mut self) -> &mut dyn Field {
        &mut **self
    }

    fn release(&mut self) {}
}

impl<T: Field> Field for Box<T> {
    fn kind() -> Kind {
        Kind::Pointer(Box::new(T::kind()))
    }

    fn slot(&mut self) -> Slot<'_> {
        Slot::Pointer(self)
    }
}

impl<T: Field + Default> Sequence for Vec<T> {
    fn reset(&mut self, len: usize) -> Result<(), usize> {
        self.clear();
        self.resize_with(len, T::default);
        Ok(())
    }

    fn elements(&mut self) -> Vec<&mut dyn Field> {
        self.iter_mut().map(|e| e as &mut dyn Field).collect()
    }
}

impl<T: Field + Default> Field for Vec<T> {
    fn kind() -> Kind {
        Kind::Sequence(Box::new(T::kind()))
    }

    fn slot(&mut self) -> Slot<'_> {
        Slot::Sequence(self)
    }
}

impl<T: Field, const N: usize> Sequence for [T; N] {
    fn reset(&mut self, len: usize) -> Result<(), usize> {
        if len == N {
            Ok(())
        } else {
            Err(N)
        }
    }

    fn elements(&mut self) -> Vec<&mut dyn Field> {
        self.iter_mut().map(|e| e as &mut dyn Field).collect()
    }
}

impl<T: Field, const N: usize> Field for [T; N] {
    fn kind() -> Kind {
        Kind::Array(Box::new(T::kind()), N)
    }

    fn slot(&mut self) -> Slot<'_> {
        Slot::Sequence(self)
    }
}

impl<K, V, S> Field for HashMap<K, V, S> {
    fn kind() -> Kind {
        Kind::UnorderedMap
    }

    fn slot(&mut self) -> Slot<'_> {
        Slot::Map
    }
}

impl<K, V> Field for BTreeMap<K, V> {
    fn kind() -> Kind {
        Kind::UnorderedMap
    }

    fn slot(&mut self) -> Slot<'_> {
        Slot::Map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_compose() {
        assert_eq!(<Option<Option<i32>>>::kind().pointee(), &Kind::I32);
        assert_eq!(<Vec<u8>>::kind().element(), Some(&Kind::U8));
        assert_eq!(<Option<Vec<Option<Timestamp>>>>::kind().leaf(), &Kind::Time);
        assert_eq!(<Option<[bool; 2]>>::kind().element(), Some(&Kind::Bool));
        assert_eq!(<Box<String>>::kind().to_string(), "Option<String>");
        assert_eq!(<[i16; 3]>::kind().to_string(), "[i16; 3]");
    }

    #[test]
    fn map_detection_looks_through_wrappers() {
        assert!(<HashMap<String, String>>::kind().contains_map());
        assert!(<Option<BTreeMap<String, i32>>>::kind().contains_map());
        assert!(<Vec<HashMap<String, String>>>::kind().contains_map());
        assert!(!<Vec<Option<i32>>>::kind().contains_map());
    }

    #[test]
    fn option_alloc_fills_default_once() {
        let mut value: Option<i32> = None;
        match value.alloc().slot() {
            Slot::I32(v) => *v = 7,
            _ => panic!("expected i32 slot"),
        }
        assert_eq!(value, Some(7));

        // a second allocation keeps the existing value
        match value.alloc().slot() {
            Slot::I32(v) => assert_eq!(*v, 7),
            _ => panic!("expected i32 slot"),
        }
    }

    #[test]
    fn array_reset_checks_length() {
        let mut arr = [0u8; 2];
        assert_eq!(arr.reset(2), Ok(()));
        assert_eq!(arr.reset(3), Err(2));
        assert_eq!(arr.elements().len(), 2);
    }

    #[test]
    fn vec_reset_resizes() {
        let mut v = vec![9i32; 5];
        v.reset(2).unwrap();
        assert_eq!(v, vec![0, 0]);
    }
}
