//! # Paramstore
//!
//! Load typed struct fields from an external parameter source.
//!
//! A params group is a struct whose fields carry name bindings under one or
//! more binding keys. The loader scans the bindings for a key, asks a
//! [`ParameterSource`] for every bound name in a single call, then coerces
//! each returned string into its field's type.
//!
//! ## Example
//!
//! ```
//! use paramstore::{load_params_group, MemorySource, ParamsGroup};
//!
//! #[derive(ParamsGroup, Default)]
//! struct Database {
//!     #[param(ps = "db_host", env = "DB_HOST")]
//!     host: String,
//!     #[param(ps = "db_port", env = "DB_PORT")]
//!     port: u16,
//!     #[param(ps = "db_pool_size", env = "DB_POOL_SIZE")]
//!     pool_size: usize,
//! }
//!
//! let source = MemorySource::new()
//!     .with("db_host", "10.0.0.12")
//!     .with("db_port", "5432")
//!     .with("db_pool_size", "020");
//!
//! let mut db = Database::default();
//! load_params_group(&mut db, &source, "ps").unwrap();
//!
//! assert_eq!(db.host, "10.0.0.12");
//! assert_eq!(db.port, 5432);
//! assert_eq!(db.pool_size, 16); // leading zero is octal
//! ```
//!
//! ## Supported Field Types
//!
//! | Type | Accepted values |
//! |------|-----------------|
//! | `i8`..`i128`, `isize` | signed integers, base prefix `0x`, `0b`, `0o` or `0` |
//! | `u8`..`u128`, `usize` | unsigned integers, same prefixes, no sign |
//! | `f32`, `f64` | decimal, exponent, `inf` and `nan` literals |
//! | `bool` | `true`, `t`, `1`, `false`, `f`, `0` in any case |
//! | `String` | any value, verbatim |
//!
//! Any other field type fails the load with
//! [`ParamsError::UnsupportedType`] once the field is reached.
//!
//! ## Modules
//!
//! - [`coerce`] - String to value conversion
//! - [`config`] - Loader configuration
//! - [`source`] - Parameter sources

#![forbid(unsafe_code)]
#![warn(missing_docs)]

// Lets the derive macro refer to `::paramstore` from inside this crate.
extern crate self as paramstore;

pub mod coerce;
pub mod config;
mod error;
mod group;
mod kind;
mod loader;
mod params;
mod scan;
mod schema;
pub mod source;

pub use coerce::{coerce, CoerceError};
pub use config::{LoaderConfig, DEFAULT_BINDING_KEY};
pub use error::{BoxError, ConfigError, ParamsError, ParamsResult, SourceError};
pub use group::{FieldBinding, IntoTarget, ParamsGroup, Target};
pub use kind::{FieldKind, FieldRef, ParamField, ParamValue};
pub use loader::{load_params_group, ParamsLoader};
pub use params::ParameterMap;
pub use scan::{scan_bindings, BindingPolicy};
pub use schema::{BoundGroup, ParamsSchema, ParamsSchemaBuilder};
pub use source::{EnvSource, FnSource, MemorySource, ParameterSource};

/// Derive macro implementing [`ParamsGroup`] for a struct with named fields.
pub use paramstore_macros::ParamsGroup;
