// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the property store.
//!
//! This module defines the errors that can occur while loading, updating, and
//! persisting properties. All errors use `thiserror` for proper error handling
//! and conversion.

use std::io;
use std::num::{ParseFloatError, ParseIntError};
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for property store operations.
///
/// Recoverable parse failures of typed getters are *not* represented here; those
/// are reported as [`BadPropertyValue`](crate::domain::BadPropertyValue)
/// diagnostics and the caller's default is substituted.
///
/// # Examples
///
/// ```
/// use hexprops::domain::errors::PropertyError;
///
/// fn check(value: &str) -> Result<(), PropertyError> {
///     Err(PropertyError::ValidationRejected {
///         key: "imq.max_connections".to_string(),
///         reason: format!("{} is out of range", value),
///     })
/// }
/// ```
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PropertyError {
    /// The store was set up incorrectly, e.g. a second override target was bound.
    #[error("Invalid property store configuration: {message}")]
    Config {
        /// What was wrong
        message: String,
    },

    /// A property file could not be read.
    #[error("I/O error on '{path}': {source}")]
    Io {
        /// The file being read
        path: PathBuf,
        /// The underlying error
        #[source]
        source: io::Error,
    },

    /// A property file was readable but contained a malformed line.
    #[error("Failed to parse '{path}' at line {line}: {message}")]
    Parse {
        /// The file being parsed
        path: PathBuf,
        /// 1-based line number where the malformed entry starts
        line: usize,
        /// What was malformed
        message: String,
    },

    /// A listener refused a proposed value.
    #[error("Update of '{key}' rejected: {reason}")]
    ValidationRejected {
        /// The key whose update was rejected
        key: String,
        /// The reason given by the listener
        reason: String,
    },

    /// The in-memory update committed, but the override file could not be written.
    #[error("Failed to persist overrides to '{path}': {source}")]
    Persistence {
        /// The override file
        path: PathBuf,
        /// The underlying error
        #[source]
        source: io::Error,
    },

    /// A listener tried to mutate the store from inside one of its callbacks.
    #[error("Reentrant update of '{key}' from a listener callback")]
    ReentrantUpdate {
        /// The key the nested call tried to change
        key: String,
    },

    /// Failed to convert a property value to the requested type.
    #[error("Failed to convert value of '{key}' to type {target_type}: {source}")]
    TypeConversion {
        /// The key being converted
        key: String,
        /// The target type name
        target_type: String,
        /// The underlying conversion error
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl PropertyError {
    /// Creates a `TypeConversion` error from a `ParseIntError`.
    pub fn from_parse_int_error(key: String, err: ParseIntError) -> Self {
        PropertyError::TypeConversion {
            key,
            target_type: "integer".to_string(),
            source: Box::new(err),
        }
    }

    /// Creates a `TypeConversion` error from a `ParseFloatError`.
    pub fn from_parse_float_error(key: String, err: ParseFloatError) -> Self {
        PropertyError::TypeConversion {
            key,
            target_type: "float".to_string(),
            source: Box::new(err),
        }
    }

    /// Creates a `TypeConversion` error with a plain message as its source.
    pub fn conversion(key: impl Into<String>, target_type: &str, message: String) -> Self {
        PropertyError::TypeConversion {
            key: key.into(),
            target_type: target_type.to_string(),
            source: message.into(),
        }
    }

    /// Returns `true` when the error means a property file does not exist yet.
    ///
    /// A missing override file is the normal state of a fresh instance, so
    /// bootstrap code usually logs this case and carries on.
    pub fn is_not_found(&self) -> bool {
        matches!(self, PropertyError::Io { source, .. } if source.kind() == io::ErrorKind::NotFound)
    }
}

/// A specialized Result type for property store operations.
pub type Result<T> = std::result::Result<T, PropertyError>;
