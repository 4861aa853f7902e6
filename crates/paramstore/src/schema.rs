//! Manual field registration.
//!
//! [`ParamsSchema`] describes a record without the derive macro: each field is
//! registered with an accessor and its bindings. Binding a schema to a value
//! produces a [`BoundGroup`] the loader can fill.
//!
//! # Example
//!
//! ```
//! use paramstore::{load_params_group, MemorySource, ParamsSchema};
//!
//! #[derive(Default)]
//! struct Server {
//!     host: String,
//!     port: u16,
//! }
//!
//! let schema = ParamsSchema::<Server>::builder()
//!     .field("host", |s| &mut s.host)
//!     .bind("ps", "server_host")
//!     .field("port", |s| &mut s.port)
//!     .bind("ps", "server_port")
//!     .build();
//!
//! let source = MemorySource::new()
//!     .with("server_host", "localhost")
//!     .with("server_port", "0x1f90");
//!
//! let mut server = Server::default();
//! load_params_group(&mut schema.bind(&mut server), &source, "ps").unwrap();
//! assert_eq!(server.host, "localhost");
//! assert_eq!(server.port, 8080);
//! ```

use std::collections::HashMap;
use std::fmt;

use crate::group::{FieldBinding, ParamsGroup};
use crate::kind::{FieldKind, FieldRef, ParamField};

trait Accessor<T>: Send + Sync {
    fn field_ref<'a>(&self, target: &'a mut T) -> FieldRef<'a>;
}

struct TypedAccessor<T, V> {
    get: fn(&mut T) -> &mut V,
}

impl<T, V: ParamField + 'static> Accessor<T> for TypedAccessor<T, V> {
    fn field_ref<'a>(&self, target: &'a mut T) -> FieldRef<'a> {
        (self.get)(target).field_ref()
    }
}

enum Slot<T> {
    Writable(Box<dyn Accessor<T>>),
    ReadOnly,
    Unsupported(&'static str),
}

struct FieldSpec<T> {
    name: String,
    kind: FieldKind,
    bindings: HashMap<String, String>,
    slot: Slot<T>,
}

/// A registered description of a record's fields.
pub struct ParamsSchema<T> {
    fields: Vec<FieldSpec<T>>,
}

impl<T> fmt::Debug for ParamsSchema<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParamsSchema")
            .field(
                "fields",
                &self.fields.iter().map(|spec| &spec.name).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl<T: 'static> ParamsSchema<T> {
    /// Starts a new schema.
    pub fn builder() -> ParamsSchemaBuilder<T> {
        ParamsSchemaBuilder { fields: Vec::new() }
    }

    /// Binds the schema to a value, producing a loadable group.
    pub fn bind<'s, 't>(&'s self, target: &'t mut T) -> BoundGroup<'s, 't, T> {
        BoundGroup {
            schema: self,
            target,
        }
    }

    /// Returns the number of registered fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if no fields are registered.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Builder for [`ParamsSchema`].
///
/// Fields are kept in registration order, which is the order the loader
/// assigns them in. [`bind`](Self::bind) attaches a binding to the most
/// recently registered field.
pub struct ParamsSchemaBuilder<T> {
    fields: Vec<FieldSpec<T>>,
}

impl<T: 'static> ParamsSchemaBuilder<T> {
    /// Registers a writable field.
    pub fn field<V: ParamField + 'static>(
        mut self,
        name: impl Into<String>,
        get: fn(&mut T) -> &mut V,
    ) -> Self {
        self.fields.push(FieldSpec {
            name: name.into(),
            kind: V::KIND,
            bindings: HashMap::new(),
            slot: Slot::Writable(Box::new(TypedAccessor { get })),
        });
        self
    }

    /// Registers a field the loader must not write.
    pub fn readonly(mut self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.fields.push(FieldSpec {
            name: name.into(),
            kind,
            bindings: HashMap::new(),
            slot: Slot::ReadOnly,
        });
        self
    }

    /// Registers a field whose type the loader cannot coerce into.
    pub fn unsupported(mut self, name: impl Into<String>, type_desc: &'static str) -> Self {
        self.fields.push(FieldSpec {
            name: name.into(),
            kind: FieldKind::Unsupported(type_desc),
            bindings: HashMap::new(),
            slot: Slot::Unsupported(type_desc),
        });
        self
    }

    /// Binds the last registered field to `param` under `binding_key`.
    ///
    /// Has no effect before the first field is registered.
    pub fn bind(mut self, binding_key: impl Into<String>, param: impl Into<String>) -> Self {
        if let Some(spec) = self.fields.last_mut() {
            spec.bindings.insert(binding_key.into(), param.into());
        }
        self
    }

    /// Finishes the schema.
    pub fn build(self) -> ParamsSchema<T> {
        ParamsSchema {
            fields: self.fields,
        }
    }
}

/// A schema bound to a value.
pub struct BoundGroup<'s, 't, T> {
    schema: &'s ParamsSchema<T>,
    target: &'t mut T,
}

impl<T> fmt::Debug for BoundGroup<'_, '_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundGroup")
            .field("schema", self.schema)
            .finish_non_exhaustive()
    }
}

impl<T> ParamsGroup for BoundGroup<'_, '_, T> {
    fn field_bindings(&self, binding_key: &str) -> Vec<FieldBinding> {
        self.schema
            .fields
            .iter()
            .enumerate()
            .map(|(index, spec)| {
                let param = spec.bindings.get(binding_key).cloned().unwrap_or_default();
                FieldBinding::new(index, spec.name.clone(), param, spec.kind)
                    .writable(!matches!(spec.slot, Slot::ReadOnly))
            })
            .collect()
    }

    fn field_mut(&mut self, index: usize) -> Option<FieldRef<'_>> {
        match &self.schema.fields.get(index)?.slot {
            Slot::Writable(accessor) => Some(accessor.field_ref(self.target)),
            Slot::ReadOnly => None,
            Slot::Unsupported(desc) => Some(FieldRef::Unsupported(*desc)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Limits {
        max_conns: u32,
        ratio: f64,
        tags: Vec<String>,
    }

    fn schema() -> ParamsSchema<Limits> {
        ParamsSchema::<Limits>::builder()
            .field("max_conns", |l| &mut l.max_conns)
            .bind("ps", "max_conns")
            .bind("env", "MAX_CONNS")
            .field("ratio", |l| &mut l.ratio)
            .bind("ps", "ratio")
            .unsupported("tags", "Vec<String>")
            .readonly("build_id", FieldKind::String)
            .bind("ps", "build_id")
            .build()
    }

    #[test]
    fn test_bindings_per_key() {
        let schema = schema();
        let mut limits = Limits::default();
        let group = schema.bind(&mut limits);

        let ps = group.field_bindings("ps");
        assert_eq!(ps.len(), 4);
        assert_eq!(ps[0].param, "max_conns");
        assert_eq!(ps[0].kind, FieldKind::U32);
        assert_eq!(ps[2].kind, FieldKind::Unsupported("Vec<String>"));
        assert!(!ps[3].writable);

        let env = group.field_bindings("env");
        assert_eq!(env[0].param, "MAX_CONNS");
        assert!(!env[1].is_bound());
    }

    #[test]
    fn test_field_mut_writes_through() {
        let schema = schema();
        let mut limits = Limits::default();
        {
            let mut group = schema.bind(&mut limits);
            let slot = group.field_mut(1).unwrap();
            slot.assign(crate::ParamValue::F64(0.5)).unwrap();
            assert!(group.field_mut(3).is_none());
            assert!(matches!(group.field_mut(2), Some(FieldRef::Unsupported(_))));
            assert!(group.field_mut(9).is_none());
        }
        assert!((limits.ratio - 0.5).abs() < f64::EPSILON);
        assert!(limits.tags.is_empty());
    }

    #[test]
    fn test_load_through_schema() {
        let schema = ParamsSchema::<Limits>::builder()
            .field("max_conns", |l| &mut l.max_conns)
            .bind("ps", "max_conns")
            .field("ratio", |l| &mut l.ratio)
            .bind("ps", "ratio")
            .build();
        let source = crate::MemorySource::new()
            .with("max_conns", "0o777")
            .with("ratio", "0.75");

        let mut limits = Limits::default();
        crate::load_params_group(&mut schema.bind(&mut limits), &source, "ps").unwrap();
        assert_eq!(limits.max_conns, 511);
        assert!((limits.ratio - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn test_bind_before_field_is_ignored() {
        let schema = ParamsSchema::<Limits>::builder().bind("ps", "orphan").build();
        assert!(schema.is_empty());
    }
}
