//! Error types for paramstore.
//!
//! [`ParamsError`] is returned by the loader and identifies exactly one
//! offending field, parameter or type per failure. [`ConfigError`] covers
//! loader configuration; [`SourceError`] is reported by the bundled sources.

use std::path::PathBuf;

use thiserror::Error;

use crate::coerce::CoerceError;

/// Boxed error returned by parameter sources.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type alias using [`ParamsError`].
pub type ParamsResult<T> = Result<T, ParamsError>;

/// Errors that can occur while loading a params group.
#[derive(Error, Debug)]
pub enum ParamsError {
    /// The target is not a mutable reference to a record.
    #[error("params group is not a mutable reference to a record (got {found})")]
    InvalidTargetType {
        /// Description of the value that was passed instead.
        found: &'static str,
    },

    /// A field has no binding for the requested key (strict policy).
    #[error("binding not set or empty for field {field}")]
    MissingBinding {
        /// The unbound field.
        field: String,
    },

    /// The parameter source failed to retrieve parameters.
    #[error("error executing ParameterSource::get_params: {source}")]
    SourceFailure {
        /// Error reported by the source.
        #[source]
        source: BoxError,
    },

    /// A retrieved value could not be coerced to the field type.
    #[error("cannot parse parameter {param} to field {field} of type {kind}")]
    ParseFailure {
        /// The destination field.
        field: String,
        /// The parameter the value came from.
        param: String,
        /// Description of the destination type.
        kind: String,
        /// Why coercion failed.
        #[source]
        cause: CoerceError,
    },

    /// The field cannot be written through the supplied handle.
    #[error("field {field} cannot be set")]
    FieldNotAssignable {
        /// The read-only field.
        field: String,
    },

    /// The field type is outside the supported set.
    #[error("type {kind} for field {field} not supported")]
    UnsupportedType {
        /// The offending field.
        field: String,
        /// Description of the field type.
        kind: String,
    },
}

impl ParamsError {
    /// Create a new invalid target error.
    pub fn invalid_target(found: &'static str) -> Self {
        Self::InvalidTargetType { found }
    }

    /// Create a new missing binding error.
    pub fn missing_binding(field: impl Into<String>) -> Self {
        Self::MissingBinding {
            field: field.into(),
        }
    }

    /// Wrap a parameter source failure.
    pub fn source_failure(source: impl Into<BoxError>) -> Self {
        Self::SourceFailure {
            source: source.into(),
        }
    }

    /// Create a new parse failure error.
    pub fn parse_failure(
        field: impl Into<String>,
        param: impl Into<String>,
        kind: impl Into<String>,
        cause: CoerceError,
    ) -> Self {
        Self::ParseFailure {
            field: field.into(),
            param: param.into(),
            kind: kind.into(),
            cause,
        }
    }

    /// Create a new field not assignable error.
    pub fn not_assignable(field: impl Into<String>) -> Self {
        Self::FieldNotAssignable {
            field: field.into(),
        }
    }

    /// Create a new unsupported type error.
    pub fn unsupported_type(field: impl Into<String>, kind: impl Into<String>) -> Self {
        Self::UnsupportedType {
            field: field.into(),
            kind: kind.into(),
        }
    }

    /// Returns the field this error is attributed to, if any.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::MissingBinding { field }
            | Self::ParseFailure { field, .. }
            | Self::FieldNotAssignable { field }
            | Self::UnsupportedType { field, .. } => Some(field),
            Self::InvalidTargetType { .. } | Self::SourceFailure { .. } => None,
        }
    }

    /// Returns the parameter this error is attributed to, if any.
    pub fn param(&self) -> Option<&str> {
        match self {
            Self::ParseFailure { param, .. } => Some(param),
            _ => None,
        }
    }
}

/// Errors raised by loader configuration and bundled sources.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file not found.
    #[error("configuration file not found: {path}")]
    FileNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// Failed to read a configuration file.
    #[error("failed to read configuration file: {path}")]
    ReadError {
        /// Path to the file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// TOML parsing error.
    #[error("failed to parse TOML configuration: {0}")]
    TomlError(#[from] toml::de::Error),

    /// JSON parsing error.
    #[error("failed to parse JSON configuration: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Unsupported configuration format.
    #[error("unsupported configuration format: {0}")]
    UnsupportedFormat(String),

    /// Invalid configuration value.
    #[error("invalid configuration value for {field}: {reason}")]
    InvalidValue {
        /// The field with the invalid value.
        field: String,
        /// Explanation of why the value is invalid.
        reason: String,
    },

    /// Environment variable parsing error.
    #[error("failed to parse environment variable {var}: {reason}")]
    EnvParseError {
        /// The environment variable name.
        var: String,
        /// Explanation of the parsing error.
        reason: String,
    },

    /// A source file holds a value that is not a scalar.
    #[error("parameter {name} is not a scalar value")]
    NonScalarParam {
        /// The parameter name.
        name: String,
    },

    /// Failed to load a `.env` file.
    #[error("failed to load .env file: {0}")]
    Dotenv(#[from] dotenvy::Error),
}

impl ConfigError {
    /// Create a new file not found error.
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// Create a new read error.
    pub fn read_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ReadError {
            path: path.into(),
            source,
        }
    }

    /// Create a new invalid value error.
    pub fn invalid_value(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create a new environment variable parse error.
    pub fn env_parse_error(var: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::EnvParseError {
            var: var.into(),
            reason: reason.into(),
        }
    }
}

/// Errors raised by the bundled parameter sources.
#[derive(Error, Debug)]
pub enum SourceError {
    /// The source has no value for a requested parameter.
    #[error("parameter not found: {name}")]
    NotFound {
        /// The parameter name.
        name: String,
    },

    /// A requested environment variable is not set.
    #[error("environment variable not set: {var}")]
    EnvVarMissing {
        /// The environment variable name.
        var: String,
    },

    /// A requested environment variable is not valid unicode.
    #[error("environment variable is not valid unicode: {var}")]
    EnvVarNotUnicode {
        /// The environment variable name.
        var: String,
    },
}
