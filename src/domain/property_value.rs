// SPDX-License-Identifier: MIT OR Apache-2.0

//! Property value type with typed conversions.
//!
//! This module provides the `PropertyValue` type, which stores a property as a
//! string and converts it to the types the rest of the server consumes. The
//! conversions here are pure and return errors; the store decides when a
//! failure is turned into a default plus a diagnostic.

use crate::domain::errors::{PropertyError, Result};
use crate::domain::size::SizeQuantity;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Separator used by list and array properties.
pub const LIST_DELIMITER: char = ',';

/// A string property value with typed accessors.
///
/// # Examples
///
/// ```
/// use hexprops::domain::PropertyValue;
///
/// let value = PropertyValue::new("42".to_string());
/// assert_eq!(value.as_str(), "42");
/// assert_eq!(value.as_i32("imq.port").unwrap(), 42);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyValue(String);

impl PropertyValue {
    /// Creates a new `PropertyValue` from a `String`.
    pub fn new(value: String) -> Self {
        PropertyValue(value)
    }

    /// Returns the value as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns an owned copy of the value.
    pub fn as_string(&self) -> String {
        self.0.clone()
    }

    /// Returns `true` if the value is the empty string.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Converts the value to a boolean.
    ///
    /// Only `"true"` and `"false"` are recognized, ignoring case. Values such
    /// as `"1"` or `"yes"` are malformed.
    ///
    /// # Examples
    ///
    /// ```
    /// use hexprops::domain::PropertyValue;
    ///
    /// assert!(PropertyValue::from("TRUE").as_bool("imq.autocreate.queue").unwrap());
    /// assert!(PropertyValue::from("yes").as_bool("imq.autocreate.queue").is_err());
    /// ```
    pub fn as_bool(&self, key: &str) -> Result<bool> {
        match self.0.to_lowercase().as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            _ => Err(PropertyError::conversion(
                key,
                "boolean",
                format!("'{}' is not a boolean", self.0),
            )),
        }
    }

    /// Converts the value to an `i32`.
    pub fn as_i32(&self, key: &str) -> Result<i32> {
        self.0
            .parse::<i32>()
            .map_err(|e| PropertyError::from_parse_int_error(key.to_string(), e))
    }

    /// Converts the value to an `i64`.
    ///
    /// # Examples
    ///
    /// ```
    /// use hexprops::domain::PropertyValue;
    ///
    /// let value = PropertyValue::from("9223372036854775807");
    /// assert_eq!(value.as_i64("imq.message.max_size").unwrap(), i64::MAX);
    /// ```
    pub fn as_i64(&self, key: &str) -> Result<i64> {
        self.0
            .parse::<i64>()
            .map_err(|e| PropertyError::from_parse_int_error(key.to_string(), e))
    }

    /// Converts the value to an `f32`.
    pub fn as_f32(&self, key: &str) -> Result<f32> {
        self.0
            .parse::<f32>()
            .map_err(|e| PropertyError::from_parse_float_error(key.to_string(), e))
    }

    /// Converts a percentage such as `"85"` into a fraction (`0.85`).
    ///
    /// # Examples
    ///
    /// ```
    /// use hexprops::domain::PropertyValue;
    ///
    /// let value = PropertyValue::from("50");
    /// assert_eq!(value.as_percentage("imq.memory.threshold").unwrap(), 0.5);
    /// ```
    pub fn as_percentage(&self, key: &str) -> Result<f32> {
        self.as_f32(key).map(|v| v / 100.0)
    }

    /// Converts the value to a [`SizeQuantity`].
    pub fn as_size(&self, key: &str) -> Result<SizeQuantity> {
        self.0
            .parse::<SizeQuantity>()
            .map_err(|e| PropertyError::TypeConversion {
                key: key.to_string(),
                target_type: "size".to_string(),
                source: Box::new(e),
            })
    }

    /// Splits a comma separated value into trimmed, non-empty entries.
    ///
    /// # Examples
    ///
    /// ```
    /// use hexprops::domain::PropertyValue;
    ///
    /// let value = PropertyValue::from("a, b ,,c");
    /// assert_eq!(value.to_list(), vec!["a", "b", "c"]);
    /// ```
    pub fn to_list(&self) -> Vec<String> {
        self.0
            .split(LIST_DELIMITER)
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Splits a comma separated value into trimmed entries, keeping empty ones.
    ///
    /// Unlike [`to_list`](Self::to_list), positions are preserved: `"a,,b"`
    /// yields three entries. An empty value yields no entries.
    pub fn to_array(&self) -> Vec<String> {
        if self.0.is_empty() {
            return Vec::new();
        }
        self.0
            .split(LIST_DELIMITER)
            .map(|token| token.trim().to_string())
            .collect()
    }

    /// Parses the value into any type that implements `FromStr`.
    ///
    /// # Examples
    ///
    /// ```
    /// use hexprops::domain::PropertyValue;
    /// use std::net::IpAddr;
    ///
    /// let value = PropertyValue::from("127.0.0.1");
    /// let ip: IpAddr = value.parse("imq.hostname").unwrap();
    /// assert_eq!(ip.to_string(), "127.0.0.1");
    /// ```
    pub fn parse<T>(&self, key: &str) -> Result<T>
    where
        T: FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        self.0
            .parse::<T>()
            .map_err(|e| PropertyError::TypeConversion {
                key: key.to_string(),
                target_type: std::any::type_name::<T>().to_string(),
                source: Box::new(e),
            })
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        PropertyValue(s)
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        PropertyValue(s.to_string())
    }
}

impl From<&String> for PropertyValue {
    fn from(s: &String) -> Self {
        PropertyValue(s.clone())
    }
}

impl From<PropertyValue> for String {
    fn from(value: PropertyValue) -> Self {
        value.0
    }
}

impl AsRef<str> for PropertyValue {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for PropertyValue {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for PropertyValue {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
