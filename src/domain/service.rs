// SPDX-License-Identifier: MIT OR Apache-2.0

//! Property service trait definition.
//!
//! This module defines the `PropertyService` trait, the interface server
//! components use to read properties, change them through the validated
//! update path, and watch keys for changes. Components receive a shared
//! handle to one service instance from the process bootstrap instead of
//! reaching for global state.

use crate::domain::{PropertyKey, PropertyValue, Result};
use crate::ports::ListenerHandle;

/// The main property service trait.
///
/// # Examples
///
/// ```rust
/// use hexprops::domain::{PropertyKey, PropertyService, PropertyValue, Result};
/// use hexprops::ports::ListenerHandle;
/// use std::collections::HashMap;
/// use std::sync::RwLock;
///
/// #[derive(Default)]
/// struct MapService(RwLock<HashMap<String, String>>);
///
/// impl PropertyService for MapService {
///     fn get(&self, key: &str) -> Option<PropertyValue> {
///         self.0.read().unwrap().get(key).map(PropertyValue::from)
///     }
///
///     fn property_names(&self, prefix: &str) -> Vec<PropertyKey> {
///         self.0.read().unwrap().keys()
///             .filter(|k| k.starts_with(prefix))
///             .map(|k| PropertyKey::from(k.as_str()))
///             .collect()
///     }
///
///     fn set(&self, key: &str, value: &str) -> Result<()> {
///         self.0.write().unwrap().insert(key.to_string(), value.to_string());
///         Ok(())
///     }
///
///     fn set_group(&self, values: &[(&str, &str)]) -> Result<()> {
///         for (k, v) in values {
///             self.set(k, v)?;
///         }
///         Ok(())
///     }
///
///     fn remove_key(&self, key: &str) -> Result<()> {
///         self.0.write().unwrap().remove(key);
///         Ok(())
///     }
///
///     fn add_listener(&self, _key: &str, _listener: ListenerHandle) -> Result<()> {
///         Ok(())
///     }
///
///     fn remove_listener(&self, _key: &str, _listener: &ListenerHandle) -> Result<bool> {
///         Ok(false)
///     }
/// }
///
/// let service = MapService::default();
/// service.set("imq.port", "7676").unwrap();
/// assert_eq!(service.get_or_default("imq.port", "0").as_str(), "7676");
/// assert!(!service.has("imq.hostname"));
/// ```
pub trait PropertyService: Send + Sync {
    /// Returns the current value of `key`, or `None` if it is unset.
    fn get(&self, key: &str) -> Option<PropertyValue>;

    /// Returns the current value of `key`, or `default` if it is unset.
    fn get_or_default(&self, key: &str, default: &str) -> PropertyValue {
        self.get(key).unwrap_or_else(|| PropertyValue::from(default))
    }

    /// Returns `true` if `key` currently has a value.
    fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Returns every key that starts with `prefix`.
    fn property_names(&self, prefix: &str) -> Vec<PropertyKey>;

    /// Changes one property after every listener of `key` has accepted it.
    ///
    /// # Errors
    ///
    /// - `ValidationRejected` if a listener refuses the value; nothing changes
    /// - `Persistence` if the value was committed but could not be saved
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Changes several properties at once, validating all of them first.
    fn set_group(&self, values: &[(&str, &str)]) -> Result<()>;

    /// Removes `key` from the store and from the saved overrides.
    fn remove_key(&self, key: &str) -> Result<()>;

    /// Registers `listener` for changes to `key`.
    fn add_listener(&self, key: &str, listener: ListenerHandle) -> Result<()>;

    /// Removes the first registration of `listener` for `key`.
    ///
    /// Returns `true` if a registration was removed.
    fn remove_listener(&self, key: &str, listener: &ListenerHandle) -> Result<bool>;
}
