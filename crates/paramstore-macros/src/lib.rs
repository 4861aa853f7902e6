//! Procedural macros for paramstore params groups.
//!
//! This crate provides `#[derive(ParamsGroup)]`, which describes a struct's
//! fields and their parameter bindings to the paramstore loader. Use it
//! through the re-export in `paramstore`; the generated code refers to
//! `::paramstore` paths.
//!
//! # Example
//!
//! ```rust,ignore
//! use paramstore::ParamsGroup;
//!
//! #[derive(ParamsGroup, Default)]
//! struct Database {
//!     #[param(ps = "db_host", env = "DB_HOST")]
//!     host: String,
//!     #[param(ps = "db_port", env = "DB_PORT")]
//!     port: u16,
//! }
//! ```
//!
//! # Macro Expansion
//!
//! The derive:
//!
//! 1. Parses every `#[param(...)]` attribute on each named field
//! 2. Classifies each field type as supported or unsupported
//! 3. Generates `field_bindings`, one `FieldBinding` per field in declaration order
//! 4. Generates `field_mut`, a typed slot per writable field

mod derive;
mod parse;

use proc_macro::TokenStream;

/// Derives `paramstore::ParamsGroup` for a struct with named fields.
///
/// # Attributes
///
/// Fields are annotated with `#[param(...)]`, which accepts:
///
/// - `key = "name"`: binds the field to parameter `name` under binding key `key`
/// - `readonly`: the field is reported but never written; loading it fails
///
/// A field may carry any number of bindings, across one or several
/// attributes. Fields with no binding for the requested key are reported
/// with an empty parameter name.
///
/// # Field Types
///
/// `i8` to `i128`, `isize`, `u8` to `u128`, `usize`, `f32`, `f64`, `bool`
/// and `String` are loaded directly. Any other type is accepted by the derive
/// and rejected by the loader when the field is reached. Type aliases are
/// not resolved.
///
/// # Example
///
/// ```rust,ignore
/// #[derive(ParamsGroup)]
/// struct Cache {
///     #[param(ps = "cache_ttl_secs")]
///     #[param(env = "CACHE_TTL_SECS")]
///     ttl_secs: u64,
///     #[param(ps = "cache_region", readonly)]
///     region: String,
/// }
/// ```
///
/// # Generated Code
///
/// The macro generates approximately:
///
/// ```rust,ignore
/// impl ::paramstore::ParamsGroup for Cache {
///     fn field_bindings(&self, binding_key: &str) -> Vec<FieldBinding> {
///         vec![
///             FieldBinding::new(0, "ttl_secs", match binding_key {
///                 "ps" => "cache_ttl_secs",
///                 "env" => "CACHE_TTL_SECS",
///                 _ => "",
///             }, <u64 as ParamField>::KIND).writable(true),
///             FieldBinding::new(1, "region", match binding_key {
///                 "ps" => "cache_region",
///                 _ => "",
///             }, <String as ParamField>::KIND).writable(false),
///         ]
///     }
///
///     fn field_mut(&mut self, index: usize) -> Option<FieldRef<'_>> {
///         match index {
///             0 => Some(ParamField::field_ref(&mut self.ttl_secs)),
///             1 => None,
///             _ => None,
///         }
///     }
/// }
/// ```
#[proc_macro_derive(ParamsGroup, attributes(param))]
pub fn derive_params_group(input: TokenStream) -> TokenStream {
    derive::expand_params_group(input.into())
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
