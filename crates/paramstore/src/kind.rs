//! Destination kinds, typed values and field slots.
//!
//! The set of supported destination types is closed: every supported kind has
//! a [`FieldKind`] variant, a [`ParamValue`] variant carrying a coerced value
//! and a [`FieldRef`] variant borrowing the field it is written into.

use std::fmt;

/// The destination kind of a record field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// `i8`
    I8,
    /// `i16`
    I16,
    /// `i32`
    I32,
    /// `i64`
    I64,
    /// `i128`
    I128,
    /// `isize`
    Isize,
    /// `u8`
    U8,
    /// `u16`
    U16,
    /// `u32`
    U32,
    /// `u64`
    U64,
    /// `u128`
    U128,
    /// `usize`
    Usize,
    /// `f32`
    F32,
    /// `f64`
    F64,
    /// `bool`
    Bool,
    /// `String`
    String,
    /// Any other type, described by its declared type text.
    Unsupported(&'static str),
}

impl FieldKind {
    /// Returns the type description used in error messages.
    pub const fn description(&self) -> &'static str {
        match self {
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::I128 => "i128",
            Self::Isize => "isize",
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
            Self::U128 => "u128",
            Self::Usize => "usize",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::Bool => "bool",
            Self::String => "String",
            Self::Unsupported(desc) => *desc,
        }
    }

    /// Returns true if values can be coerced into this kind.
    pub const fn is_supported(&self) -> bool {
        !matches!(self, Self::Unsupported(_))
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// A value coerced from a raw parameter string.
#[derive(Debug, Clone, PartialEq)]
#[allow(missing_docs)]
pub enum ParamValue {
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    I128(i128),
    Isize(isize),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    U128(u128),
    Usize(usize),
    F32(f32),
    F64(f64),
    Bool(bool),
    String(String),
}

/// A mutable slot into one record field.
#[derive(Debug)]
#[allow(missing_docs)]
pub enum FieldRef<'a> {
    I8(&'a mut i8),
    I16(&'a mut i16),
    I32(&'a mut i32),
    I64(&'a mut i64),
    I128(&'a mut i128),
    Isize(&'a mut isize),
    U8(&'a mut u8),
    U16(&'a mut u16),
    U32(&'a mut u32),
    U64(&'a mut u64),
    U128(&'a mut u128),
    Usize(&'a mut usize),
    F32(&'a mut f32),
    F64(&'a mut f64),
    Bool(&'a mut bool),
    String(&'a mut String),
    /// A field whose type cannot be written by the loader.
    Unsupported(&'static str),
}

impl FieldRef<'_> {
    /// Returns the kind of the borrowed field.
    pub const fn kind(&self) -> FieldKind {
        match self {
            Self::I8(_) => FieldKind::I8,
            Self::I16(_) => FieldKind::I16,
            Self::I32(_) => FieldKind::I32,
            Self::I64(_) => FieldKind::I64,
            Self::I128(_) => FieldKind::I128,
            Self::Isize(_) => FieldKind::Isize,
            Self::U8(_) => FieldKind::U8,
            Self::U16(_) => FieldKind::U16,
            Self::U32(_) => FieldKind::U32,
            Self::U64(_) => FieldKind::U64,
            Self::U128(_) => FieldKind::U128,
            Self::Usize(_) => FieldKind::Usize,
            Self::F32(_) => FieldKind::F32,
            Self::F64(_) => FieldKind::F64,
            Self::Bool(_) => FieldKind::Bool,
            Self::String(_) => FieldKind::String,
            Self::Unsupported(desc) => FieldKind::Unsupported(*desc),
        }
    }

    /// Writes `value` into the field.
    ///
    /// Returns the value back if its kind does not match the slot.
    pub fn assign(self, value: ParamValue) -> Result<(), ParamValue> {
        match (self, value) {
            (Self::I8(slot), ParamValue::I8(v)) => *slot = v,
            (Self::I16(slot), ParamValue::I16(v)) => *slot = v,
            (Self::I32(slot), ParamValue::I32(v)) => *slot = v,
            (Self::I64(slot), ParamValue::I64(v)) => *slot = v,
            (Self::I128(slot), ParamValue::I128(v)) => *slot = v,
            (Self::Isize(slot), ParamValue::Isize(v)) => *slot = v,
            (Self::U8(slot), ParamValue::U8(v)) => *slot = v,
            (Self::U16(slot), ParamValue::U16(v)) => *slot = v,
            (Self::U32(slot), ParamValue::U32(v)) => *slot = v,
            (Self::U64(slot), ParamValue::U64(v)) => *slot = v,
            (Self::U128(slot), ParamValue::U128(v)) => *slot = v,
            (Self::Usize(slot), ParamValue::Usize(v)) => *slot = v,
            (Self::F32(slot), ParamValue::F32(v)) => *slot = v,
            (Self::F64(slot), ParamValue::F64(v)) => *slot = v,
            (Self::Bool(slot), ParamValue::Bool(v)) => *slot = v,
            (Self::String(slot), ParamValue::String(v)) => *slot = v,
            (_, value) => return Err(value),
        }
        Ok(())
    }
}

/// Types that can be loaded from a parameter.
///
/// Implemented for every supported destination type. The derive macro and
/// [`ParamsSchema`](crate::ParamsSchema) use it to borrow typed slots.
pub trait ParamField {
    /// The kind of this type.
    const KIND: FieldKind;

    /// Borrows `self` as a typed field slot.
    fn field_ref(&mut self) -> FieldRef<'_>;
}

macro_rules! impl_param_field {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl ParamField for $ty {
                const KIND: FieldKind = FieldKind::$variant;

                fn field_ref(&mut self) -> FieldRef<'_> {
                    FieldRef::$variant(self)
                }
            }
        )*
    };
}

impl_param_field! {
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    i128 => I128,
    isize => Isize,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    u128 => U128,
    usize => Usize,
    f32 => F32,
    f64 => F64,
    bool => Bool,
    String => String,
}
