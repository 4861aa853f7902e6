//! Params groups and load targets.
//!
//! A params group is a record whose fields are bound to external parameter
//! names. Records describe their fields through [`ParamsGroup`], usually via
//! `#[derive(ParamsGroup)]` or a [`ParamsSchema`](crate::ParamsSchema).
//!
//! The loader accepts anything implementing [`IntoTarget`]. Only a mutable
//! reference to a params group resolves to a loadable record; every other
//! shape is rejected with [`ParamsError::InvalidTargetType`].

use crate::error::ParamsError;
use crate::kind::{FieldKind, FieldRef};

/// A record whose fields can be loaded from a parameter source.
///
/// Implementations must report fields in declaration order, and
/// `field_mut(i)` must borrow the field described at position `i` of
/// `field_bindings`.
///
/// # Example
///
/// ```
/// use paramstore::ParamsGroup;
///
/// #[derive(ParamsGroup, Default)]
/// struct Database {
///     #[param(ps = "db_host", env = "DB_HOST")]
///     host: String,
///     #[param(ps = "db_port")]
///     port: u16,
/// }
///
/// let db = Database::default();
/// let bindings = db.field_bindings("ps");
/// assert_eq!(bindings[0].param, "db_host");
/// assert_eq!(bindings[1].param, "db_port");
///
/// let bindings = db.field_bindings("env");
/// assert_eq!(bindings[1].param, "");
/// ```
pub trait ParamsGroup {
    /// Returns one binding per declared field for `binding_key`.
    ///
    /// Fields without a binding for the key have an empty `param`.
    fn field_bindings(&self, binding_key: &str) -> Vec<FieldBinding>;

    /// Borrows the field at `index` for writing.
    ///
    /// Returns `None` when the field cannot be written.
    fn field_mut(&mut self, index: usize) -> Option<FieldRef<'_>>;
}

/// The binding of one record field to an external parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldBinding {
    /// Position of the field in declaration order.
    pub index: usize,
    /// Field identifier.
    pub field: String,
    /// Bound parameter name, empty when unbound.
    pub param: String,
    /// Destination kind of the field.
    pub kind: FieldKind,
    /// Whether the loader may write the field.
    pub writable: bool,
}

impl FieldBinding {
    /// Creates a writable binding.
    pub fn new(
        index: usize,
        field: impl Into<String>,
        param: impl Into<String>,
        kind: FieldKind,
    ) -> Self {
        Self {
            index,
            field: field.into(),
            param: param.into(),
            kind,
            writable: true,
        }
    }

    /// Sets whether the field is writable.
    pub fn writable(mut self, writable: bool) -> Self {
        self.writable = writable;
        self
    }

    /// Returns true if the field has a parameter name for the binding key.
    pub fn is_bound(&self) -> bool {
        !self.param.is_empty()
    }
}

/// A value handed to the loader, resolved to its shape.
pub enum Target<'a> {
    /// A mutable record that can be loaded.
    Record(&'a mut dyn ParamsGroup),
    /// Anything else, with a description of what it is.
    Invalid(&'static str),
}

impl<'a> Target<'a> {
    /// Returns the record, or [`ParamsError::InvalidTargetType`].
    pub fn into_record(self) -> Result<&'a mut dyn ParamsGroup, ParamsError> {
        match self {
            Self::Record(group) => Ok(group),
            Self::Invalid(found) => Err(ParamsError::invalid_target(found)),
        }
    }
}

impl std::fmt::Debug for Target<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Record(_) => f.write_str("Target::Record"),
            Self::Invalid(found) => write!(f, "Target::Invalid({found})"),
        }
    }
}

/// Conversion into a load [`Target`].
pub trait IntoTarget<'a> {
    /// Resolves the value's shape.
    fn into_target(self) -> Target<'a>;
}

impl<'a> IntoTarget<'a> for Target<'a> {
    fn into_target(self) -> Target<'a> {
        self
    }
}

impl<'a, T: ParamsGroup> IntoTarget<'a> for &'a mut T {
    fn into_target(self) -> Target<'a> {
        Target::Record(self)
    }
}

impl<'a, T: ParamsGroup> IntoTarget<'a> for &'a T {
    fn into_target(self) -> Target<'a> {
        Target::Invalid("read-only reference to a record")
    }
}

macro_rules! invalid_target {
    ($($ty:ty => $desc:literal),* $(,)?) => {
        $(
            impl<'a> IntoTarget<'a> for $ty {
                fn into_target(self) -> Target<'a> {
                    Target::Invalid($desc)
                }
            }
        )*
    };
}

invalid_target! {
    &'a str => "&str",
    String => "String",
    &'a String => "&String",
    &'a mut String => "&mut String",
    bool => "bool",
    &'a mut bool => "&mut bool",
    i32 => "i32",
    &'a mut i32 => "&mut i32",
    i64 => "i64",
    &'a mut i64 => "&mut i64",
    u32 => "u32",
    &'a mut u32 => "&mut u32",
    u64 => "u64",
    &'a mut u64 => "&mut u64",
    f64 => "f64",
    &'a mut f64 => "&mut f64",
}

impl<'a, T> IntoTarget<'a> for &'a mut Vec<T> {
    fn into_target(self) -> Target<'a> {
        Target::Invalid("&mut Vec")
    }
}

impl<'a, K, V, S> IntoTarget<'a> for &'a mut std::collections::HashMap<K, V, S> {
    fn into_target(self) -> Target<'a> {
        Target::Invalid("&mut HashMap")
    }
}
