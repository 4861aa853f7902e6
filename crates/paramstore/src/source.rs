//! Parameter sources.
//!
//! The loader talks to the outside world only through [`ParameterSource`].
//! A source receives a [`ParameterMap`] listing every requested name and must
//! fill in every value, or fail. The loader ignores the map entirely when the
//! source fails.
//!
//! Three sources are bundled:
//!
//! - [`MemorySource`] - fixed values, optionally read from a TOML or JSON file
//! - [`EnvSource`] - process environment variables, optionally from `.env`
//! - [`FnSource`] - a closure, for adapting other stores

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::error::{BoxError, ConfigError, SourceError};
use crate::params::ParameterMap;

/// An external store of named string parameters.
///
/// # Example
///
/// ```
/// use paramstore::{BoxError, ParameterMap, ParameterSource};
///
/// struct Upper;
///
/// impl ParameterSource for Upper {
///     fn get_params(&self, params: &mut ParameterMap) -> Result<(), BoxError> {
///         let names: Vec<String> = params.names().map(str::to_string).collect();
///         for name in names {
///             params.set(&name, name.to_uppercase());
///         }
///         Ok(())
///     }
/// }
///
/// let mut params = ParameterMap::with_names(["db_host"]);
/// Upper.get_params(&mut params).unwrap();
/// assert_eq!(params.get("db_host"), Some("DB_HOST"));
/// ```
pub trait ParameterSource {
    /// Fills in the value of every name in `params`.
    ///
    /// Called exactly once per load. Retries, caching and timeouts are the
    /// source's own concern.
    fn get_params(&self, params: &mut ParameterMap) -> Result<(), BoxError>;
}

impl<S: ParameterSource + ?Sized> ParameterSource for &S {
    fn get_params(&self, params: &mut ParameterMap) -> Result<(), BoxError> {
        (**self).get_params(params)
    }
}

impl<S: ParameterSource + ?Sized> ParameterSource for Box<S> {
    fn get_params(&self, params: &mut ParameterMap) -> Result<(), BoxError> {
        (**self).get_params(params)
    }
}

impl<S: ParameterSource + ?Sized> ParameterSource for Arc<S> {
    fn get_params(&self, params: &mut ParameterMap) -> Result<(), BoxError> {
        (**self).get_params(params)
    }
}

/// A source backed by an in-memory map.
///
/// Requesting a name the source does not hold fails with
/// [`SourceError::NotFound`].
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    values: HashMap<String, String>,
}

impl MemorySource {
    /// Creates an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a parameter.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    /// Inserts or replaces a parameter.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    /// Returns the value held for `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Returns the number of parameters held.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the source holds no parameters.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Reads parameters from a TOML document.
    ///
    /// Nested tables are flattened with `.` separators, so
    /// `[db] host = "x"` provides `db.host`. Scalars are stored in their
    /// textual form; arrays are rejected.
    ///
    /// # Example
    ///
    /// ```
    /// use paramstore::MemorySource;
    ///
    /// let source = MemorySource::from_toml_str(r#"
    ///     log_level = "debug"
    ///
    ///     [db]
    ///     port = 5432
    ///     tls = true
    /// "#).unwrap();
    ///
    /// assert_eq!(source.get("log_level"), Some("debug"));
    /// assert_eq!(source.get("db.port"), Some("5432"));
    /// assert_eq!(source.get("db.tls"), Some("true"));
    /// ```
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let table: toml::Table = toml::from_str(content)?;
        let mut source = Self::new();
        source.flatten_toml("", &table)?;
        Ok(source)
    }

    /// Reads parameters from a JSON object.
    ///
    /// Flattening rules match [`from_toml_str`](Self::from_toml_str); `null`
    /// is rejected along with arrays.
    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        let value: serde_json::Value = serde_json::from_str(content)?;
        let serde_json::Value::Object(object) = value else {
            return Err(ConfigError::invalid_value(
                "<root>",
                "expected a JSON object",
            ));
        };
        let mut source = Self::new();
        source.flatten_json("", &object)?;
        Ok(source)
    }

    /// Reads parameters from a `.toml` or `.json` file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::read_error(path, e))?;

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);

        match extension.as_deref() {
            Some("toml") => Self::from_toml_str(&content),
            Some("json") => Self::from_json_str(&content),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }

    fn flatten_toml(&mut self, prefix: &str, table: &toml::Table) -> Result<(), ConfigError> {
        for (key, value) in table {
            let name = join_key(prefix, key);
            match value {
                toml::Value::String(s) => self.insert(name, s.clone()),
                toml::Value::Integer(i) => self.insert(name, i.to_string()),
                toml::Value::Float(f) => self.insert(name, f.to_string()),
                toml::Value::Boolean(b) => self.insert(name, b.to_string()),
                toml::Value::Datetime(d) => self.insert(name, d.to_string()),
                toml::Value::Table(nested) => self.flatten_toml(&name, nested)?,
                toml::Value::Array(_) => return Err(ConfigError::NonScalarParam { name }),
            }
        }
        Ok(())
    }

    fn flatten_json(
        &mut self,
        prefix: &str,
        object: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<(), ConfigError> {
        for (key, value) in object {
            let name = join_key(prefix, key);
            match value {
                serde_json::Value::String(s) => self.insert(name, s.clone()),
                serde_json::Value::Number(n) => self.insert(name, n.to_string()),
                serde_json::Value::Bool(b) => self.insert(name, b.to_string()),
                serde_json::Value::Object(nested) => self.flatten_json(&name, nested)?,
                serde_json::Value::Array(_) | serde_json::Value::Null => {
                    return Err(ConfigError::NonScalarParam { name })
                }
            }
        }
        Ok(())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MemorySource {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let values = iter
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self { values }
    }
}

impl ParameterSource for MemorySource {
    fn get_params(&self, params: &mut ParameterMap) -> Result<(), BoxError> {
        let names: Vec<String> = params.names().map(str::to_string).collect();
        for name in names {
            let value = self
                .values
                .get(&name)
                .ok_or_else(|| SourceError::NotFound { name: name.clone() })?;
            params.set(&name, value.clone());
        }
        Ok(())
    }
}

fn join_key(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

/// A source reading process environment variables.
///
/// Each requested name is looked up as `prefix + name`. A missing variable
/// fails the whole retrieval.
#[derive(Debug, Clone, Default)]
pub struct EnvSource {
    prefix: String,
}

impl EnvSource {
    /// Creates a source without a prefix.
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepends `prefix` to every variable name.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Loads a `.env` file from the current directory or its parents.
    ///
    /// A missing file is not an error. Variables already set in the process
    /// environment take precedence.
    pub fn with_dotenv(self) -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(_) => Ok(self),
            Err(e) if e.not_found() => Ok(self),
            Err(e) => Err(e.into()),
        }
    }

    /// Loads variables from a specific `.env` file.
    pub fn with_dotenv_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        dotenvy::from_path(path.as_ref())?;
        Ok(self)
    }

    /// Returns the variable name used for `name`.
    pub fn var_name(&self, name: &str) -> String {
        format!("{}{name}", self.prefix)
    }
}

impl ParameterSource for EnvSource {
    fn get_params(&self, params: &mut ParameterMap) -> Result<(), BoxError> {
        let names: Vec<String> = params.names().map(str::to_string).collect();
        for name in names {
            let var = self.var_name(&name);
            let value = std::env::var(&var).map_err(|e| match e {
                std::env::VarError::NotPresent => SourceError::EnvVarMissing { var },
                std::env::VarError::NotUnicode(_) => SourceError::EnvVarNotUnicode { var },
            })?;
            params.set(&name, value);
        }
        Ok(())
    }
}

/// A source backed by a closure.
///
/// # Example
///
/// ```
/// use paramstore::{FnSource, ParameterMap, ParameterSource};
///
/// let source = FnSource::new(|params: &mut ParameterMap| {
///     let names: Vec<String> = params.names().map(str::to_string).collect();
///     for name in names {
///         params.set(&name, "42");
///     }
///     Ok(())
/// });
///
/// let mut params = ParameterMap::with_names(["answer"]);
/// source.get_params(&mut params).unwrap();
/// assert_eq!(params.get("answer"), Some("42"));
/// ```
pub struct FnSource<F> {
    fetch: F,
}

impl<F> FnSource<F>
where
    F: Fn(&mut ParameterMap) -> Result<(), BoxError>,
{
    /// Wraps `fetch` as a parameter source.
    pub fn new(fetch: F) -> Self {
        Self { fetch }
    }
}

impl<F> std::fmt::Debug for FnSource<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnSource").finish_non_exhaustive()
    }
}

impl<F> ParameterSource for FnSource<F>
where
    F: Fn(&mut ParameterMap) -> Result<(), BoxError>,
{
    fn get_params(&self, params: &mut ParameterMap) -> Result<(), BoxError> {
        (self.fetch)(params)
    }
}
