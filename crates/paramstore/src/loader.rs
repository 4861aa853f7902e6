//! Loading params groups from a parameter source.
//!
//! This module provides [`ParamsLoader`] and the [`load_params_group`]
//! shorthand. A load runs these steps in order and stops at the first error:
//!
//! 1. Resolve the target to a mutable record
//! 2. Scan field bindings for the configured key
//! 3. Request every bound name from the source, once
//! 4. Coerce and assign each field in declaration order
//!
//! Fields assigned before an error keep their new values. Load into a staging
//! value and swap it in on success when all-or-nothing behavior is needed.

use tracing::{debug, warn};

use crate::coerce::coerce;
use crate::config::LoaderConfig;
use crate::error::{ConfigError, ParamsError, ParamsResult};
use crate::group::{FieldBinding, IntoTarget, ParamsGroup};
use crate::params::ParameterMap;
use crate::scan::{scan_bindings, BindingPolicy};
use crate::source::ParameterSource;

/// Loads every field of `target` bound under `binding_key` from `source`.
///
/// Uses the strict policy: every field must carry a binding for the key.
///
/// # Example
///
/// ```
/// use paramstore::{load_params_group, MemorySource, ParamsGroup};
///
/// #[derive(ParamsGroup, Default)]
/// struct Limits {
///     #[param(ps = "max_conns")]
///     max_conns: u32,
///     #[param(ps = "sample_ratio")]
///     ratio: f32,
///     #[param(ps = "tracing")]
///     tracing: bool,
/// }
///
/// let source = MemorySource::new()
///     .with("max_conns", "0x400")
///     .with("sample_ratio", "0.25")
///     .with("tracing", "t");
///
/// let mut limits = Limits::default();
/// load_params_group(&mut limits, &source, "ps").unwrap();
/// assert_eq!(limits.max_conns, 1024);
/// assert_eq!(limits.ratio, 0.25);
/// assert!(limits.tracing);
/// ```
pub fn load_params_group<'a, T, S>(target: T, source: &S, binding_key: &str) -> ParamsResult<()>
where
    T: IntoTarget<'a>,
    S: ParameterSource + ?Sized,
{
    ParamsLoader::new(binding_key).load(target, source)
}

/// Loads params groups with a fixed binding key and policy.
///
/// # Example
///
/// ```
/// use paramstore::{BindingPolicy, MemorySource, ParamsGroup, ParamsLoader};
///
/// #[derive(ParamsGroup, Default)]
/// struct App {
///     #[param(env = "APP_NAME")]
///     name: String,
///     // Not bound under "env"; skipped by the permissive policy.
///     #[param(ps = "app_workers")]
///     workers: usize,
/// }
///
/// let loader = ParamsLoader::new("env").with_policy(BindingPolicy::Permissive);
/// let source = MemorySource::new().with("APP_NAME", "billing");
///
/// let mut app = App::default();
/// loader.load(&mut app, &source).unwrap();
/// assert_eq!(app.name, "billing");
/// assert_eq!(app.workers, 0);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamsLoader {
    binding_key: String,
    policy: BindingPolicy,
}

impl Default for ParamsLoader {
    fn default() -> Self {
        Self::from_config(LoaderConfig::default())
    }
}

impl ParamsLoader {
    /// Creates a strict loader reading `binding_key`.
    pub fn new(binding_key: impl Into<String>) -> Self {
        Self {
            binding_key: binding_key.into(),
            policy: BindingPolicy::Strict,
        }
    }

    /// Creates a loader from configuration.
    pub fn from_config(config: LoaderConfig) -> Self {
        Self {
            binding_key: config.binding_key,
            policy: config.policy,
        }
    }

    /// Creates a loader from validated configuration.
    pub fn try_from_config(config: LoaderConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_config(config))
    }

    /// Sets the binding policy.
    pub fn with_policy(mut self, policy: BindingPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Returns the binding key.
    pub fn binding_key(&self) -> &str {
        &self.binding_key
    }

    /// Returns the binding policy.
    pub fn policy(&self) -> BindingPolicy {
        self.policy
    }

    /// Loads `target` from `source`.
    ///
    /// # Errors
    ///
    /// - [`ParamsError::InvalidTargetType`] if `target` is not a mutable record
    /// - [`ParamsError::MissingBinding`] if a field is unbound (strict policy)
    /// - [`ParamsError::SourceFailure`] if the source fails; no field is written
    /// - [`ParamsError::FieldNotAssignable`] if a bound field is read-only
    /// - [`ParamsError::UnsupportedType`] if a bound field has an unsupported type
    /// - [`ParamsError::ParseFailure`] if a value cannot be coerced
    pub fn load<'a, T, S>(&self, target: T, source: &S) -> ParamsResult<()>
    where
        T: IntoTarget<'a>,
        S: ParameterSource + ?Sized,
    {
        let group = target.into_target().into_record()?;
        let bindings = scan_bindings(group, &self.binding_key, self.policy)?;

        debug!(
            binding_key = %self.binding_key,
            policy = self.policy.as_str(),
            fields = bindings.len(),
            "scanned params group"
        );

        let mut params = ParameterMap::with_names(bindings.iter().map(|b| b.param.clone()));
        source
            .get_params(&mut params)
            .map_err(ParamsError::source_failure)?;

        let unset = params.unset_names().count();
        if unset > 0 {
            debug!(
                unset,
                names = ?params.unset_names().collect::<Vec<_>>(),
                "parameter source left names unset"
            );
        }

        for binding in &bindings {
            assign_field(group, binding, &params)?;
        }

        debug!(
            binding_key = %self.binding_key,
            fields = bindings.len(),
            "loaded params group"
        );

        Ok(())
    }
}

// Write one field from the retrieved parameters
fn assign_field(
    group: &mut dyn ParamsGroup,
    binding: &FieldBinding,
    params: &ParameterMap,
) -> ParamsResult<()> {
    if !binding.writable {
        return Err(ParamsError::not_assignable(binding.field.clone()));
    }
    if !binding.kind.is_supported() {
        return Err(ParamsError::unsupported_type(
            binding.field.clone(),
            binding.kind.description(),
        ));
    }
    let slot = group
        .field_mut(binding.index)
        .ok_or_else(|| ParamsError::not_assignable(binding.field.clone()))?;

    let kind = slot.kind();
    if !kind.is_supported() {
        return Err(ParamsError::unsupported_type(
            binding.field.clone(),
            kind.description(),
        ));
    }

    let raw = params.get(&binding.param).unwrap_or_else(|| {
        warn!(
            field = %binding.field,
            param = %binding.param,
            "parameter source left value unset"
        );
        ""
    });

    let value = coerce(kind, raw).map_err(|cause| {
        ParamsError::parse_failure(
            binding.field.clone(),
            binding.param.clone(),
            kind.description(),
            cause,
        )
    })?;

    slot.assign(value)
        .map_err(|_| ParamsError::unsupported_type(binding.field.clone(), kind.description()))?;

    debug!(field = %binding.field, param = %binding.param, kind = %kind, "assigned field");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::{FieldKind, FieldRef};
    use crate::source::{FnSource, MemorySource};
    use std::cell::Cell;

    #[derive(Debug, Default, PartialEq)]
    struct Conn {
        host: String,
        port: u16,
        locked: u8,
        timeout: f64,
    }

    impl ParamsGroup for Conn {
        fn field_bindings(&self, binding_key: &str) -> Vec<FieldBinding> {
            let ps = binding_key == "ps";
            let name = |n: &'static str| if ps { n } else { "" };
            vec![
                FieldBinding::new(0, "host", name("conn_host"), FieldKind::String),
                FieldBinding::new(1, "port", name("conn_port"), FieldKind::U16),
                FieldBinding::new(2, "locked", name("conn_locked"), FieldKind::U8)
                    .writable(binding_key != "locked"),
                FieldBinding::new(3, "timeout", name("conn_timeout"), FieldKind::F64),
            ]
        }

        fn field_mut(&mut self, index: usize) -> Option<FieldRef<'_>> {
            match index {
                0 => Some(FieldRef::String(&mut self.host)),
                1 => Some(FieldRef::U16(&mut self.port)),
                2 => Some(FieldRef::U8(&mut self.locked)),
                3 => Some(FieldRef::F64(&mut self.timeout)),
                _ => None,
            }
        }
    }

    fn source() -> MemorySource {
        MemorySource::new()
            .with("conn_host", "db.internal")
            .with("conn_port", "5432")
            .with("conn_locked", "7")
            .with("conn_timeout", "2.5")
    }

    #[test]
    fn test_load_all_fields() {
        let mut conn = Conn::default();
        load_params_group(&mut conn, &source(), "ps").unwrap();
        assert_eq!(
            conn,
            Conn {
                host: "db.internal".to_string(),
                port: 5432,
                locked: 7,
                timeout: 2.5,
            }
        );
    }

    #[test]
    fn test_invalid_target_never_calls_source() {
        let called = Cell::new(false);
        let source = FnSource::new(|_: &mut ParameterMap| {
            called.set(true);
            Ok(())
        });

        let err = load_params_group("hello world!", &source, "ps").unwrap_err();
        assert!(matches!(err, ParamsError::InvalidTargetType { found: "&str" }));

        let conn = Conn::default();
        let err = load_params_group(&conn, &source, "ps").unwrap_err();
        assert!(matches!(err, ParamsError::InvalidTargetType { .. }));
        assert!(!called.get());
    }

    #[test]
    fn test_source_failure_leaves_target_untouched() {
        let source = FnSource::new(|params: &mut ParameterMap| {
            params.set("conn_host", "partially-filled");
            Err("cannot get parameters".into())
        });

        let mut conn = Conn::default();
        let err = load_params_group(&mut conn, &source, "ps").unwrap_err();
        assert_eq!(
            err.to_string(),
            "error executing ParameterSource::get_params: cannot get parameters"
        );
        assert_eq!(conn, Conn::default());
    }

    #[test]
    fn test_source_receives_every_bound_name_once() {
        let calls = Cell::new(0);
        let source = FnSource::new(|params: &mut ParameterMap| {
            calls.set(calls.get() + 1);
            assert_eq!(
                params.names().collect::<Vec<_>>(),
                vec!["conn_host", "conn_port", "conn_locked", "conn_timeout"]
            );
            source().get_params(params)
        });

        let mut conn = Conn::default();
        load_params_group(&mut conn, &source, "ps").unwrap();
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_parse_failure_stops_without_rollback() {
        let source = source().with("conn_port", "70000");
        let mut conn = Conn::default();
        let err = load_params_group(&mut conn, &source, "ps").unwrap_err();

        assert!(matches!(
            err,
            ParamsError::ParseFailure { ref field, ref param, ref kind, cause: crate::CoerceError::Overflow }
                if field == "port" && param == "conn_port" && kind == "u16"
        ));
        assert_eq!(conn.host, "db.internal");
        assert_eq!(conn.port, 0);
        assert_eq!(conn.locked, 0);
    }

    #[test]
    fn test_unset_value_coerces_from_empty_string() {
        let source = FnSource::new(|params: &mut ParameterMap| {
            params.set("conn_host", "db.internal");
            Ok(())
        });
        let mut conn = Conn::default();
        let err = load_params_group(&mut conn, &source, "ps").unwrap_err();
        assert_eq!(err.field(), Some("port"));
        assert_eq!(conn.host, "db.internal");
    }

    #[test]
    fn test_permissive_policy_with_no_bindings() {
        let called = Cell::new(false);
        let source = FnSource::new(|params: &mut ParameterMap| {
            called.set(true);
            assert!(params.is_empty());
            Ok(())
        });
        let loader = ParamsLoader::new("env").with_policy(BindingPolicy::Permissive);
        let mut conn = Conn::default();
        loader.load(&mut conn, &source).unwrap();
        assert!(called.get());
        assert_eq!(conn, Conn::default());
    }

    #[test]
    fn test_strict_missing_binding_before_source() {
        let called = Cell::new(false);
        let source = FnSource::new(|_: &mut ParameterMap| {
            called.set(true);
            Ok(())
        });
        let mut conn = Conn::default();
        let err = load_params_group(&mut conn, &source, "env").unwrap_err();
        assert_eq!(err.to_string(), "binding not set or empty for field host");
        assert!(!called.get());
    }

    struct Mismatched {
        value: i32,
    }

    impl ParamsGroup for Mismatched {
        fn field_bindings(&self, _binding_key: &str) -> Vec<FieldBinding> {
            vec![FieldBinding::new(0, "value", "value", FieldKind::I32)]
        }

        fn field_mut(&mut self, _index: usize) -> Option<FieldRef<'_>> {
            Some(FieldRef::Unsupported("Opaque"))
        }
    }

    #[test]
    fn test_unsupported_slot_overrides_binding_kind() {
        let source = MemorySource::new().with("value", "42");
        let mut target = Mismatched { value: 7 };
        let err = load_params_group(&mut target, &source, "ps").unwrap_err();
        assert!(matches!(
            err,
            ParamsError::UnsupportedType { ref field, ref kind }
                if field == "value" && kind == "Opaque"
        ));
        assert_eq!(target.value, 7);
    }

    #[test]
    fn test_from_config() {
        let config = LoaderConfig::new("ps").with_policy(BindingPolicy::Permissive);
        let loader = ParamsLoader::try_from_config(config).unwrap();
        assert_eq!(loader.binding_key(), "ps");
        assert_eq!(loader.policy(), BindingPolicy::Permissive);

        assert!(ParamsLoader::try_from_config(LoaderConfig::new("")).is_err());
        assert_eq!(ParamsLoader::default().binding_key(), "param");
    }
}
