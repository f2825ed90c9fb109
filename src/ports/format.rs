// SPDX-License-Identifier: MIT OR Apache-2.0

//! Property file format trait definition.
//!
//! This module defines the `PropertyFormat` trait, which turns the text of a
//! property file into a flat key-value map and back.

use std::collections::BTreeMap;

/// Why a line of a property file could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatError {
    /// 1-based line number where the offending entry starts.
    pub line: usize,
    /// What was wrong with it.
    pub message: String,
}

impl FormatError {
    /// Creates a new format error.
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

/// A trait for reading and writing property files.
///
/// Parsing is strict: a malformed entry fails the whole parse rather than
/// being skipped, so a damaged override file is noticed at startup.
///
/// # Examples
///
/// ```rust
/// use hexprops::ports::{FormatError, PropertyFormat};
/// use std::collections::BTreeMap;
///
/// struct LineFormat;
///
/// impl PropertyFormat for LineFormat {
///     fn parse(&self, content: &str) -> Result<BTreeMap<String, String>, FormatError> {
///         let mut map = BTreeMap::new();
///         for (n, line) in content.lines().enumerate() {
///             let (k, v) = line
///                 .split_once('=')
///                 .ok_or_else(|| FormatError::new(n + 1, "missing '='"))?;
///             map.insert(k.to_string(), v.to_string());
///         }
///         Ok(map)
///     }
///
///     fn render(&self, header: &str, values: &BTreeMap<String, String>) -> String {
///         let mut out = format!("#{}\n", header);
///         for (k, v) in values {
///             out.push_str(&format!("{}={}\n", k, v));
///         }
///         out
///     }
///
///     fn supported_extensions(&self) -> &[&str] {
///         &["lines"]
///     }
/// }
/// ```
pub trait PropertyFormat: Send + Sync {
    /// Parses file content into a flat key-value map.
    fn parse(&self, content: &str) -> Result<BTreeMap<String, String>, FormatError>;

    /// Renders `values` as file content, starting with `header` as a comment.
    fn render(&self, header: &str, values: &BTreeMap<String, String>) -> String;

    /// Returns the file extensions (without the leading dot) this format handles.
    fn supported_extensions(&self) -> &[&str];
}
