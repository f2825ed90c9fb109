// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-key storage: plain values and watched values with their listeners.

use crate::domain::PropertyValue;
use crate::ports::listener::{same_listener, ListenerHandle};
use std::fmt;

/// A value together with the listeners registered for its key.
///
/// The listener list always exists; an empty list means nobody is watching.
#[derive(Clone, Default)]
pub struct WatchedEntry {
    value: Option<PropertyValue>,
    listeners: Vec<ListenerHandle>,
}

impl WatchedEntry {
    /// Creates a watched entry with no listeners.
    pub fn new(value: Option<PropertyValue>) -> Self {
        Self {
            value,
            listeners: Vec::new(),
        }
    }

    /// Returns the current value, if set.
    pub fn value(&self) -> Option<&PropertyValue> {
        self.value.as_ref()
    }

    /// Replaces the current value.
    pub fn set_value(&mut self, value: Option<PropertyValue>) {
        self.value = value;
    }

    /// Returns the registered listeners in registration order.
    pub fn listeners(&self) -> &[ListenerHandle] {
        &self.listeners
    }

    /// Appends a registration. The same listener may be registered more than once.
    pub fn add_listener(&mut self, listener: ListenerHandle) {
        self.listeners.push(listener);
    }

    /// Removes the first registration of `listener`, returning whether one was found.
    pub fn remove_listener(&mut self, listener: &ListenerHandle) -> bool {
        match self.listeners.iter().position(|l| same_listener(l, listener)) {
            Some(index) => {
                self.listeners.remove(index);
                true
            }
            None => false,
        }
    }

    /// Drops every registration. The entry stays watched.
    pub fn clear_listeners(&mut self) {
        self.listeners.clear();
    }
}

impl fmt::Debug for WatchedEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchedEntry")
            .field("value", &self.value)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

/// The contents of the store at a single key.
///
/// Promotion from [`Entry::Plain`] to [`Entry::Watched`] happens on the first
/// listener registration and is never reversed.
#[derive(Clone, Debug)]
pub enum Entry {
    /// A value with no listener list.
    Plain(PropertyValue),
    /// A value, possibly unset, with its listener list.
    Watched(WatchedEntry),
}

impl Entry {
    /// Returns the current value, if set.
    pub fn value(&self) -> Option<&PropertyValue> {
        match self {
            Entry::Plain(value) => Some(value),
            Entry::Watched(watched) => watched.value(),
        }
    }

    /// Returns `true` if this entry carries a listener list.
    pub fn is_watched(&self) -> bool {
        matches!(self, Entry::Watched(_))
    }

    /// Returns the registered listeners; plain entries have none.
    pub fn listeners(&self) -> &[ListenerHandle] {
        match self {
            Entry::Plain(_) => &[],
            Entry::Watched(watched) => watched.listeners(),
        }
    }

    /// Stores `value`, keeping the entry's representation.
    pub fn assign(&mut self, value: PropertyValue) {
        match self {
            Entry::Plain(current) => *current = value,
            Entry::Watched(watched) => watched.set_value(Some(value)),
        }
    }

    /// Registers `listener`, promoting a plain entry to a watched one first.
    pub fn add_listener(&mut self, listener: ListenerHandle) {
        match self {
            Entry::Watched(watched) => watched.add_listener(listener),
            Entry::Plain(value) => {
                let value = std::mem::replace(value, PropertyValue::from(""));
                let mut watched = WatchedEntry::new(Some(value));
                watched.add_listener(listener);
                *self = Entry::Watched(watched);
            }
        }
    }

    /// Returns the watched entry, or `None` for plain entries.
    pub fn as_watched_mut(&mut self) -> Option<&mut WatchedEntry> {
        match self {
            Entry::Watched(watched) => Some(watched),
            Entry::Plain(_) => None,
        }
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entry::Plain(value) => write!(f, "{}", value),
            Entry::Watched(watched) => match watched.value() {
                Some(value) => write!(f, "{} [{} listeners]", value, watched.listeners().len()),
                None => write!(f, "<unset> [{} listeners]", watched.listeners().len()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PropertyKey;
    use crate::ports::{PropertyListener, Rejection};
    use std::sync::Arc;

    struct NoopListener;

    impl PropertyListener for NoopListener {
        fn validate(&self, _key: &PropertyKey, _value: Option<&str>) -> Result<(), Rejection> {
            Ok(())
        }

        fn update(&self, _key: &PropertyKey, _value: Option<&str>) {}
    }

    #[test]
    fn test_plain_entry() {
        let entry = Entry::Plain(PropertyValue::from("v"));
        assert_eq!(entry.value().unwrap().as_str(), "v");
        assert!(!entry.is_watched());
        assert!(entry.listeners().is_empty());
    }

    #[test]
    fn test_add_listener_promotes_and_keeps_value() {
        let mut entry = Entry::Plain(PropertyValue::from("v"));
        let listener: ListenerHandle = Arc::new(NoopListener);
        entry.add_listener(listener);

        assert!(entry.is_watched());
        assert_eq!(entry.value().unwrap().as_str(), "v");
        assert_eq!(entry.listeners().len(), 1);
    }

    #[test]
    fn test_add_listener_to_watched_entry() {
        let mut entry = Entry::Watched(WatchedEntry::new(None));
        let listener: ListenerHandle = Arc::new(NoopListener);
        entry.add_listener(Arc::clone(&listener));
        entry.add_listener(listener);
        assert_eq!(entry.listeners().len(), 2);
        assert!(entry.value().is_none());
    }

    #[test]
    fn test_assign_keeps_representation() {
        let mut entry = Entry::Watched(WatchedEntry::new(None));
        entry.assign(PropertyValue::from("x"));
        assert!(entry.is_watched());
        assert_eq!(entry.value().unwrap().as_str(), "x");

        let mut plain = Entry::Plain(PropertyValue::from("a"));
        plain.assign(PropertyValue::from("b"));
        assert!(!plain.is_watched());
        assert_eq!(plain.value().unwrap().as_str(), "b");
    }

    #[test]
    fn test_remove_listener_removes_first_match_only() {
        let a: ListenerHandle = Arc::new(NoopListener);
        let b: ListenerHandle = Arc::new(NoopListener);
        let mut watched = WatchedEntry::new(None);
        watched.add_listener(Arc::clone(&a));
        watched.add_listener(Arc::clone(&b));
        watched.add_listener(Arc::clone(&a));

        assert!(watched.remove_listener(&a));
        assert_eq!(watched.listeners().len(), 2);
        assert!(same_listener(&watched.listeners()[0], &b));
        assert!(same_listener(&watched.listeners()[1], &a));
    }

    #[test]
    fn test_remove_absent_listener() {
        let a: ListenerHandle = Arc::new(NoopListener);
        let mut watched = WatchedEntry::new(None);
        assert!(!watched.remove_listener(&a));
    }

    #[test]
    fn test_clear_listeners_stays_watched() {
        let mut entry = Entry::Plain(PropertyValue::from("v"));
        entry.add_listener(Arc::new(NoopListener));
        entry.as_watched_mut().unwrap().clear_listeners();
        assert!(entry.is_watched());
        assert!(entry.listeners().is_empty());
    }

    #[test]
    fn test_display() {
        let mut entry = Entry::Plain(PropertyValue::from("v"));
        assert_eq!(entry.to_string(), "v");
        entry.add_listener(Arc::new(NoopListener));
        assert_eq!(entry.to_string(), "v [1 listeners]");
    }
}
