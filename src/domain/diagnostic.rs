// SPDX-License-Identifier: MIT OR Apache-2.0

//! Recoverable diagnostics produced by typed property getters.

use std::fmt;

/// How serious a diagnostic is.
///
/// Conversion failures are recoverable, so every record the store emits is
/// informational.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum Severity {
    /// The caller's default was used and nothing failed.
    Info,
}

/// A property held a value that could not be converted to the requested type.
///
/// The getter that hit the bad value returns the caller's default and reports
/// this record to the store's [`DiagnosticSink`](crate::ports::DiagnosticSink).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BadPropertyValue {
    /// Always [`Severity::Info`] for conversion failures.
    pub severity: Severity,
    /// The key that was read.
    pub key: String,
    /// The raw string stored under the key.
    pub raw_value: String,
    /// Why the conversion failed.
    pub reason: String,
}

impl BadPropertyValue {
    /// Stable code identifying this kind of diagnostic.
    pub const CODE: &'static str = "BadPropertyValue";

    /// Creates an info-level record.
    pub fn new(key: impl Into<String>, raw_value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            key: key.into(),
            raw_value: raw_value.into(),
            reason: reason.into(),
        }
    }

    /// Returns [`Self::CODE`].
    pub fn code(&self) -> &'static str {
        Self::CODE
    }
}

impl fmt::Display for BadPropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: bad value '{}' for property {}: {}",
            Self::CODE,
            self.raw_value,
            self.key,
            self.reason
        )
    }
}
