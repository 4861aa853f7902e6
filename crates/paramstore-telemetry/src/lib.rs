//! Logging setup for applications using paramstore.
//!
//! The loader reports its progress through `tracing`. This crate installs a
//! subscriber for those events, configured through [`LogConfig`].
//!
//! # Example
//!
//! ```rust,ignore
//! use paramstore_telemetry::{init_logging, LogConfig};
//!
//! let config = LogConfig::production().with_level("warn,paramstore=debug");
//! init_logging(&config)?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod logging;

pub use error::TelemetryError;
pub use logging::{create_env_filter, init_logging, LogConfig};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
