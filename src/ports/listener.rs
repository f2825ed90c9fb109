// SPDX-License-Identifier: MIT OR Apache-2.0

//! Property listener trait definition.
//!
//! This module defines the `PropertyListener` trait, the port through which
//! server components take part in property updates. A listener is first asked
//! to validate a proposed value and, once every listener involved has accepted,
//! told to apply it.

use crate::domain::PropertyKey;
use std::sync::Arc;
use thiserror::Error;

/// A listener's refusal of a proposed value.
///
/// # Examples
///
/// ```rust
/// use hexprops::ports::Rejection;
///
/// let rejection = Rejection::new("port must be below 65536");
/// assert_eq!(rejection.reason(), "port must be below 65536");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}")]
pub struct Rejection {
    reason: String,
}

impl Rejection {
    /// Creates a rejection carrying the given reason.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    /// Returns the reason given for the rejection.
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

/// Shared handle to a registered listener.
///
/// Registrations are compared by pointer identity, so the handle passed to
/// `remove_listener` must be a clone of the one passed to `add_listener`.
pub type ListenerHandle = Arc<dyn PropertyListener>;

/// A component that watches one or more property keys.
///
/// # Locking
///
/// Both callbacks run while the store's update lock is held. A listener may
/// read the store from a callback, but must not call any mutating method;
/// doing so fails immediately with
/// [`PropertyError::ReentrantUpdate`](crate::domain::PropertyError::ReentrantUpdate).
///
/// # Lifetime
///
/// The store only holds a reference to the listener. Components must remove
/// their registrations before they are torn down.
///
/// # Examples
///
/// ```rust
/// use hexprops::domain::PropertyKey;
/// use hexprops::ports::{PropertyListener, Rejection};
/// use std::sync::atomic::{AtomicU32, Ordering};
///
/// struct MaxConnections(AtomicU32);
///
/// impl PropertyListener for MaxConnections {
///     fn validate(&self, _key: &PropertyKey, value: Option<&str>) -> Result<(), Rejection> {
///         match value.map(str::parse::<u32>) {
///             Some(Ok(n)) if n > 0 => Ok(()),
///             _ => Err(Rejection::new("expected a positive integer")),
///         }
///     }
///
///     fn update(&self, _key: &PropertyKey, value: Option<&str>) {
///         if let Some(Ok(n)) = value.map(str::parse::<u32>) {
///             self.0.store(n, Ordering::SeqCst);
///         }
///     }
/// }
/// ```
pub trait PropertyListener: Send + Sync {
    /// Checks whether `value` is acceptable for `key`.
    ///
    /// Called before any change is made. Must not have side effects that
    /// assume the change will happen; the update can still be abandoned
    /// because another listener rejected it.
    fn validate(&self, key: &PropertyKey, value: Option<&str>) -> Result<(), Rejection>;

    /// Applies `value` for `key`.
    ///
    /// Only called after every listener involved in the update accepted it.
    fn update(&self, key: &PropertyKey, value: Option<&str>);
}

/// Returns `true` if both handles refer to the same listener instance.
pub(crate) fn same_listener(a: &ListenerHandle, b: &ListenerHandle) -> bool {
    std::ptr::eq(
        Arc::as_ptr(a) as *const (),
        Arc::as_ptr(b) as *const (),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct RecordingListener {
        updates: Mutex<Vec<String>>,
    }

    impl PropertyListener for RecordingListener {
        fn validate(&self, _key: &PropertyKey, value: Option<&str>) -> Result<(), Rejection> {
            match value {
                Some("bad") => Err(Rejection::new("bad value")),
                _ => Ok(()),
            }
        }

        fn update(&self, key: &PropertyKey, value: Option<&str>) {
            self.updates
                .lock()
                .unwrap()
                .push(format!("{}={}", key, value.unwrap_or("<unset>")));
        }
    }

    fn recording() -> Arc<RecordingListener> {
        Arc::new(RecordingListener {
            updates: Mutex::new(Vec::new()),
        })
    }

    #[test]
    fn test_listener_validate() {
        let listener = recording();
        let key = PropertyKey::from("k");
        assert!(listener.validate(&key, Some("good")).is_ok());
        let err = listener.validate(&key, Some("bad")).unwrap_err();
        assert_eq!(err.reason(), "bad value");
        assert_eq!(err.to_string(), "bad value");
    }

    #[test]
    fn test_listener_update() {
        let listener = recording();
        listener.update(&PropertyKey::from("k"), Some("v"));
        listener.update(&PropertyKey::from("k"), None);
        assert_eq!(*listener.updates.lock().unwrap(), vec!["k=v", "k=<unset>"]);
    }

    #[test]
    fn test_same_listener_identity() {
        let a: ListenerHandle = recording();
        let b: ListenerHandle = recording();
        let a2 = Arc::clone(&a);

        assert!(same_listener(&a, &a2));
        assert!(!same_listener(&a, &b));
    }

    #[test]
    fn test_listener_is_send_sync() {
        fn assert_send_sync<T: Send + Sync + ?Sized>() {}
        assert_send_sync::<dyn PropertyListener>();
    }
}
