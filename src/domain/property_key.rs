// SPDX-License-Identifier: MIT OR Apache-2.0

//! Property key newtype for type-safe key handling.
//!
//! This module provides the `PropertyKey` type, a newtype wrapper around `String`
//! that keeps property names from being confused with property values.

use std::borrow::Borrow;
use std::fmt;

/// A type-safe wrapper for property names.
///
/// Keys are compared and hashed by their string contents, and a `PropertyKey`
/// can be looked up in maps keyed by `PropertyKey` using a plain `&str`.
///
/// # Examples
///
/// ```
/// use hexprops::domain::PropertyKey;
///
/// let key = PropertyKey::from("imq.autocreate.queue");
/// assert_eq!(key.as_str(), "imq.autocreate.queue");
/// assert!(key.has_prefix("imq.autocreate"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PropertyKey(String);

impl PropertyKey {
    /// Creates a new `PropertyKey` from a `String`.
    pub fn new(key: String) -> Self {
        PropertyKey(key)
    }

    /// Returns the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Converts the `PropertyKey` into its inner `String`.
    pub fn into_string(self) -> String {
        self.0
    }

    /// Returns `true` if the key is the empty string.
    ///
    /// Empty keys are never accepted by the store.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns `true` if the key starts with `prefix`.
    pub fn has_prefix(&self, prefix: &str) -> bool {
        self.0.starts_with(prefix)
    }
}

impl From<String> for PropertyKey {
    fn from(s: String) -> Self {
        PropertyKey(s)
    }
}

impl From<&str> for PropertyKey {
    fn from(s: &str) -> Self {
        PropertyKey(s.to_string())
    }
}

impl From<&PropertyKey> for PropertyKey {
    fn from(key: &PropertyKey) -> Self {
        key.clone()
    }
}

impl From<PropertyKey> for String {
    fn from(key: PropertyKey) -> Self {
        key.0
    }
}

impl AsRef<str> for PropertyKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for PropertyKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_property_key_new() {
        let key = PropertyKey::new("test.key".to_string());
        assert_eq!(key.as_str(), "test.key");
    }

    #[test]
    fn test_property_key_into_string() {
        let key = PropertyKey::from("test.key");
        assert_eq!(key.into_string(), "test.key");
    }

    #[test]
    fn test_property_key_display() {
        let key = PropertyKey::from("test.key");
        assert_eq!(format!("{}", key), "test.key");
    }

    #[test]
    fn test_property_key_debug() {
        let key = PropertyKey::from("test.key");
        assert_eq!(format!("{:?}", key), "PropertyKey(\"test.key\")");
    }

    #[test]
    fn test_property_key_lookup_by_str() {
        let mut map = HashMap::new();
        map.insert(PropertyKey::from("test.key"), "value1");

        assert_eq!(map.get("test.key"), Some(&"value1"));
        assert_eq!(map.get("other.key"), None);
    }

    #[test]
    fn test_property_key_ordering() {
        let mut keys = vec![
            PropertyKey::from("b.key"),
            PropertyKey::from("a.key"),
            PropertyKey::from("a.b"),
        ];
        keys.sort();
        assert_eq!(keys[0].as_str(), "a.b");
        assert_eq!(keys[2].as_str(), "b.key");
    }

    #[test]
    fn test_property_key_prefix() {
        let key = PropertyKey::from("imq.persist.store");
        assert!(key.has_prefix("imq."));
        assert!(key.has_prefix(""));
        assert!(!key.has_prefix("jms."));
    }

    #[test]
    fn test_property_key_empty() {
        assert!(PropertyKey::from("").is_empty());
        assert!(!PropertyKey::from("k").is_empty());
    }
}
