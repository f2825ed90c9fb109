// SPDX-License-Identifier: MIT OR Apache-2.0

//! Default property service implementation.
//!
//! `PropertyStore` layers a persisted override file over bulk-loaded defaults,
//! keeps per-key listener lists, and runs every change through a two-phase
//! protocol: all listeners validate the proposed values, and only then are the
//! values committed, the listeners told to apply them, and the override file
//! rewritten.

use crate::adapters::{default_override_path, PropertiesFile, TracingDiagnostics};
use crate::domain::{
    BadPropertyValue, Entry, PropertyError, PropertyKey, PropertyService, PropertyValue, Result,
    SizeQuantity, WatchedEntry,
};
use crate::ports::{DiagnosticSink, ListenerHandle, PropertyFormat};
use once_cell::sync::OnceCell;
use std::collections::hash_map::{self, HashMap};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::thread::{self, ThreadId};

/// Values longer than this are shortened by [`PropertyStore::list`].
const LIST_VALUE_WIDTH: usize = 60;

/// Whether an update writes the override file before returning.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Persist {
    /// Rewrite the override file as part of the update.
    #[default]
    Immediately,
    /// Only change memory; a later update or [`PropertyStore::flush`] saves it.
    Deferred,
}

/// Everything guarded by the state lock.
#[derive(Default)]
struct State {
    entries: HashMap<PropertyKey, Entry>,
    overrides: BTreeSet<PropertyKey>,
}

impl State {
    fn value(&self, key: &str) -> Option<&PropertyValue> {
        self.entries.get(key).and_then(Entry::value)
    }

    fn listeners(&self, key: &str) -> Vec<ListenerHandle> {
        self.entries
            .get(key)
            .map(|entry| entry.listeners().to_vec())
            .unwrap_or_default()
    }

    fn assign(&mut self, key: PropertyKey, value: PropertyValue) {
        match self.entries.entry(key) {
            hash_map::Entry::Occupied(mut slot) => slot.get_mut().assign(value),
            hash_map::Entry::Vacant(slot) => {
                slot.insert(Entry::Plain(value));
            }
        }
    }

    fn commit(&mut self, key: PropertyKey, value: PropertyValue) {
        self.overrides.insert(key.clone());
        self.assign(key, value);
    }

    fn override_snapshot(&self) -> BTreeMap<String, String> {
        self.overrides
            .iter()
            .filter_map(|key| {
                self.value(key.as_str())
                    .map(|value| (key.as_str().to_string(), value.as_string()))
            })
            .collect()
    }
}

/// Held for the duration of one mutating operation.
///
/// Records the owning thread so that a listener calling back into the store
/// gets an error instead of deadlocking on the update lock.
struct UpdateGuard<'a> {
    owner: &'a Mutex<Option<ThreadId>>,
    _lock: MutexGuard<'a, ()>,
}

impl Drop for UpdateGuard<'_> {
    fn drop(&mut self) {
        *self.owner.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

/// Layered, listener-aware property store.
///
/// A store is created once by the process bootstrap and shared as
/// `Arc<PropertyStore>` with every component that needs configuration.
///
/// # Layers
///
/// [`load_defaults`](Self::load_defaults) fills in baseline values.
/// [`load_overrides`](Self::load_overrides) adds the per-instance override
/// file on top; those keys, and every key later changed through
/// [`set`](PropertyService::set) or [`set_group`](PropertyService::set_group),
/// form the override set. Only the override set is written back to disk, and
/// re-loading defaults never replaces an overridden value.
///
/// # Locking
///
/// Mutating operations are serialized by one update lock that is held while
/// listener callbacks run and while the override file is written. Reads only
/// take a short read lock, so listeners may call [`get`](PropertyService::get)
/// and the typed getters from their callbacks. Calling a mutating method from
/// a callback fails with [`PropertyError::ReentrantUpdate`].
///
/// # Examples
///
/// ```rust,no_run
/// use hexprops::prelude::*;
///
/// # fn main() -> Result<()> {
/// let store = PropertyStore::new();
/// if let Err(e) = store.load_defaults("/opt/imq/default.properties") {
///     tracing::warn!("no defaults: {}", e);
/// }
/// if let Err(e) = store.load_override_file("/var/imq/instance.properties") {
///     if !e.is_not_found() {
///         return Err(e);
///     }
/// }
///
/// store.set("imq.autocreate.queue", "false")?;
/// assert!(!store.get_bool("imq.autocreate.queue", true));
/// # Ok(())
/// # }
/// ```
pub struct PropertyStore {
    state: RwLock<State>,
    update_lock: Mutex<()>,
    update_owner: Mutex<Option<ThreadId>>,
    target: OnceCell<PathBuf>,
    file: PropertiesFile,
    diagnostics: Arc<dyn DiagnosticSink>,
}

impl PropertyStore {
    /// Creates an empty store that logs diagnostics through `tracing`.
    pub fn new() -> Self {
        Self {
            state: RwLock::new(State::default()),
            update_lock: Mutex::new(()),
            update_owner: Mutex::new(None),
            target: OnceCell::new(),
            file: PropertiesFile::new(),
            diagnostics: Arc::new(TracingDiagnostics::new()),
        }
    }

    /// Creates a new store builder.
    pub fn builder() -> PropertyStoreBuilder {
        PropertyStoreBuilder::new()
    }

    fn read_state(&self) -> RwLockReadGuard<'_, State> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, State> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Takes the update lock, failing if the current thread already holds it.
    fn begin_update(&self, key: &str) -> Result<UpdateGuard<'_>> {
        let me = thread::current().id();
        if *self.update_owner.lock().unwrap_or_else(PoisonError::into_inner) == Some(me) {
            return Err(PropertyError::ReentrantUpdate {
                key: key.to_string(),
            });
        }

        let lock = self.update_lock.lock().unwrap_or_else(PoisonError::into_inner);
        *self.update_owner.lock().unwrap_or_else(PoisonError::into_inner) = Some(me);
        Ok(UpdateGuard {
            owner: &self.update_owner,
            _lock: lock,
        })
    }

    fn check_location(path: &Path, action: &str) -> Result<()> {
        if path.as_os_str().is_empty() {
            return Err(PropertyError::Config {
                message: format!("Can not {} properties with an empty location", action),
            });
        }
        Ok(())
    }

    fn check_key(key: &str) -> Result<()> {
        if key.is_empty() {
            return Err(PropertyError::Config {
                message: "Property key must not be empty".to_string(),
            });
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // setup and bulk loading
    // ------------------------------------------------------------------

    /// Records where the override set is saved.
    ///
    /// A store can be bound to one location for its whole life.
    ///
    /// # Errors
    ///
    /// Returns [`PropertyError::Config`] if `path` is empty, has an extension
    /// the store's format does not handle, or a location is already bound.
    pub fn bind_override_target(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        Self::check_location(path, "store")?;
        if let Some(ext) = path.extension().and_then(|ext| ext.to_str()) {
            let supported = self.file.supported_extensions();
            if !supported.iter().any(|s| s.eq_ignore_ascii_case(ext)) {
                return Err(PropertyError::Config {
                    message: format!(
                        "Can not store properties to a '.{}' file, expected one of {:?}",
                        ext, supported
                    ),
                });
            }
        }

        self.target
            .set(path.to_path_buf())
            .map_err(|_| PropertyError::Config {
                message: "Can not access more than one stored property location".to_string(),
            })?;

        tracing::debug!("Bound override target {}", path.display());
        Ok(())
    }

    /// Returns the bound override location, if any.
    pub fn override_target(&self) -> Option<&Path> {
        self.target.get().map(PathBuf::as_path)
    }

    /// Bulk-loads baseline values without consulting listeners.
    ///
    /// Keys in the override set keep their override value. Returns the number
    /// of entries read from the file.
    ///
    /// # Errors
    ///
    /// [`PropertyError::Config`] if `path` is empty. [`PropertyError::Io`] or
    /// [`PropertyError::Parse`] if the file cannot be loaded; nothing is
    /// changed in that case. A missing file is reported as an error that
    /// satisfies [`PropertyError::is_not_found`].
    pub fn load_defaults(&self, path: impl AsRef<Path>) -> Result<usize> {
        let path = path.as_ref();
        Self::check_location(path, "load")?;
        let values = self.file.read(path)?;
        let _guard = self.begin_update(&path.display().to_string())?;

        let mut state = self.write_state();
        let mut shadowed = 0;
        for (key, value) in values.iter() {
            let key = PropertyKey::from(key.as_str());
            if state.overrides.contains(&key) {
                shadowed += 1;
                continue;
            }
            state.assign(key, PropertyValue::from(value));
        }

        tracing::debug!(
            "Loaded {} default properties from {} ({} shadowed by overrides)",
            values.len(),
            path.display(),
            shadowed
        );
        Ok(values.len())
    }

    /// Bulk-loads override values without consulting listeners.
    ///
    /// Every loaded key joins the override set. Returns the number of entries
    /// read from the file.
    pub fn load_overrides(&self, path: impl AsRef<Path>) -> Result<usize> {
        let path = path.as_ref();
        Self::check_location(path, "load")?;
        let values = self.file.read(path)?;
        let _guard = self.begin_update(&path.display().to_string())?;

        let mut state = self.write_state();
        for (key, value) in values.iter() {
            state.commit(PropertyKey::from(key.as_str()), PropertyValue::from(value));
        }

        tracing::debug!(
            "Loaded {} override properties from {}",
            values.len(),
            path.display()
        );
        Ok(values.len())
    }

    /// Binds `path` as the override target and loads it.
    ///
    /// The binding stays in place when the load fails, so a fresh instance
    /// whose file does not exist yet will create it on the first update.
    pub fn load_override_file(&self, path: impl AsRef<Path>) -> Result<usize> {
        self.bind_override_target(path.as_ref())?;
        self.load_overrides(path)
    }

    // ------------------------------------------------------------------
    // updates
    // ------------------------------------------------------------------

    /// Changes one property, choosing whether to save the override file.
    ///
    /// Every listener of `key` validates `value` in registration order. If
    /// all accept, each listener's `update` is called, then the value is
    /// stored and added to the override set.
    ///
    /// # Errors
    ///
    /// - [`PropertyError::ValidationRejected`]: a listener refused; nothing changed
    /// - [`PropertyError::Persistence`]: the value is committed in memory but
    ///   the override file could not be written
    /// - [`PropertyError::ReentrantUpdate`]: called from a listener callback
    pub fn set_with(
        &self,
        key: impl Into<PropertyKey>,
        value: impl Into<PropertyValue>,
        persist: Persist,
    ) -> Result<()> {
        let key = key.into();
        let value = value.into();
        Self::check_key(key.as_str())?;
        let _guard = self.begin_update(key.as_str())?;

        let listeners = self.read_state().listeners(key.as_str());
        for listener in &listeners {
            listener
                .validate(&key, Some(value.as_str()))
                .map_err(|rejection| {
                    tracing::debug!("Update of '{}' rejected: {}", key, rejection);
                    PropertyError::ValidationRejected {
                        key: key.as_str().to_string(),
                        reason: rejection.reason().to_string(),
                    }
                })?;
        }
        for listener in &listeners {
            listener.update(&key, Some(value.as_str()));
        }

        tracing::debug!("Set property {}={}", key, value);
        self.write_state().commit(key, value);

        if persist == Persist::Immediately {
            self.save_overrides()?;
        }
        Ok(())
    }

    /// Changes several properties as one update, choosing whether to save.
    ///
    /// Phase one asks every listener of every key to validate its new value,
    /// in the order the pairs are given, without changing anything. If any
    /// listener refuses, the update stops there: nothing is committed and the
    /// listeners that already accepted are *not* told the update was dropped.
    /// Phase two stores every value, adds the keys to the override set, and
    /// then calls each listener's `update` in pair order. The override file is
    /// written once for the whole group.
    pub fn set_group_with<I, K, V>(&self, values: I, persist: Persist) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<PropertyKey>,
        V: Into<PropertyValue>,
    {
        let pairs: Vec<(PropertyKey, PropertyValue)> = values
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        let Some((first, _)) = pairs.first() else {
            return Ok(());
        };
        for (key, _) in &pairs {
            Self::check_key(key.as_str())?;
        }
        let _guard = self.begin_update(first.as_str())?;

        let plan: Vec<(PropertyKey, PropertyValue, Vec<ListenerHandle>)> = {
            let state = self.read_state();
            pairs
                .into_iter()
                .map(|(key, value)| {
                    let listeners = state.listeners(key.as_str());
                    (key, value, listeners)
                })
                .collect()
        };

        for (key, value, listeners) in &plan {
            for listener in listeners {
                listener
                    .validate(key, Some(value.as_str()))
                    .map_err(|rejection| {
                        tracing::debug!("Group update rejected at '{}': {}", key, rejection);
                        PropertyError::ValidationRejected {
                            key: key.as_str().to_string(),
                            reason: rejection.reason().to_string(),
                        }
                    })?;
            }
        }

        {
            let mut state = self.write_state();
            for (key, value, _) in &plan {
                state.commit(key.clone(), value.clone());
            }
        }

        for (key, value, listeners) in &plan {
            for listener in listeners {
                listener.update(key, Some(value.as_str()));
            }
        }

        tracing::debug!("Set {} properties as a group", plan.len());
        if persist == Persist::Immediately {
            self.save_overrides()?;
        }
        Ok(())
    }

    /// Stores a boolean as `"true"` or `"false"` through [`set_with`](Self::set_with).
    pub fn set_bool(&self, key: impl Into<PropertyKey>, value: bool) -> Result<()> {
        self.set_with(key, value.to_string(), Persist::Immediately)
    }

    /// Removes a property, choosing whether to save the override file.
    ///
    /// Listeners are neither consulted nor notified. A watched key keeps its
    /// listeners and becomes unset; a plain key disappears entirely.
    pub fn remove_key_with(&self, key: &str, persist: Persist) -> Result<()> {
        let _guard = self.begin_update(key)?;

        {
            let mut state = self.write_state();
            let plain = match state.entries.get_mut(key) {
                Some(Entry::Watched(watched)) => {
                    watched.set_value(None);
                    false
                }
                Some(Entry::Plain(_)) => true,
                None => false,
            };
            if plain {
                state.entries.remove(key);
            }
            state.overrides.remove(key);
        }

        tracing::debug!("Removed property {}", key);
        if persist == Persist::Immediately {
            self.save_overrides()?;
        }
        Ok(())
    }

    /// Writes the current override set to the bound location.
    pub fn flush(&self) -> Result<()> {
        let _guard = self.begin_update("<flush>")?;
        self.save_overrides()
    }

    /// Writes the override set. Callers must hold the update lock.
    fn save_overrides(&self) -> Result<()> {
        let Some(path) = self.target.get() else {
            tracing::debug!("No override target bound, not saving properties");
            return Ok(());
        };

        let snapshot = self.read_state().override_snapshot();
        self.file.write(path, &snapshot).map_err(|source| {
            tracing::warn!(
                "Failed to save {} override properties to {}: {}",
                snapshot.len(),
                path.display(),
                source
            );
            PropertyError::Persistence {
                path: path.clone(),
                source,
            }
        })
    }

    // ------------------------------------------------------------------
    // listeners
    // ------------------------------------------------------------------

    /// Removes every listener of `key`. The key stays watched.
    pub fn clear_listeners(&self, key: &str) -> Result<()> {
        let _guard = self.begin_update(key)?;
        if let Some(watched) = self.write_state().entries.get_mut(key).and_then(Entry::as_watched_mut) {
            watched.clear_listeners();
        }
        Ok(())
    }

    /// Returns how many registrations `key` has.
    pub fn listener_count(&self, key: &str) -> usize {
        self.read_state()
            .entries
            .get(key)
            .map_or(0, |entry| entry.listeners().len())
    }

    /// Returns `true` if `key` has ever had a listener registered.
    pub fn is_watched(&self, key: &str) -> bool {
        self.read_state()
            .entries
            .get(key)
            .is_some_and(Entry::is_watched)
    }

    // ------------------------------------------------------------------
    // typed getters
    // ------------------------------------------------------------------

    /// Reads `key` and converts it, reporting a diagnostic and returning
    /// `default` if the stored value is malformed.
    fn typed<T>(&self, key: &str, default: T, convert: impl FnOnce(&PropertyValue) -> Result<T>) -> T {
        let Some(value) = self.get(key) else {
            return default;
        };

        match convert(&value) {
            Ok(converted) => converted,
            Err(err) => {
                let reason = match err {
                    PropertyError::TypeConversion { source, .. } => source.to_string(),
                    other => other.to_string(),
                };
                self.diagnostics
                    .report(BadPropertyValue::new(key, value.as_str(), reason));
                default
            }
        }
    }

    /// Returns `key` as an `i32`, or `default` if unset or malformed.
    pub fn get_int(&self, key: &str, default: i32) -> i32 {
        self.typed(key, default, |v| v.as_i32(key))
    }

    /// Returns `key` as an `i64`, or `default` if unset or malformed.
    pub fn get_long(&self, key: &str, default: i64) -> i64 {
        self.typed(key, default, |v| v.as_i64(key))
    }

    /// Returns a percentage property as a fraction (`"75"` is `0.75`).
    ///
    /// `default` is returned unchanged if the key is unset or malformed.
    pub fn get_percentage(&self, key: &str, default: f32) -> f32 {
        self.typed(key, default, |v| v.as_percentage(key))
    }

    /// Returns `key` as a boolean, or `default` if unset or malformed.
    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        self.typed(key, default, |v| v.as_bool(key))
    }

    /// Returns `key` as a size such as `512k`, or `default` if unset or malformed.
    pub fn get_size(&self, key: &str, default: SizeQuantity) -> SizeQuantity {
        self.typed(key, default, |v| v.as_size(key))
    }

    /// Returns the non-empty, trimmed entries of a comma separated property.
    ///
    /// Returns `None` if the key is unset.
    pub fn get_list(&self, key: &str) -> Option<Vec<String>> {
        self.get(key).map(|v| v.to_list())
    }

    /// Returns every trimmed entry of a comma separated property, empty ones
    /// included.
    ///
    /// Returns `None` if the key is unset.
    pub fn get_array(&self, key: &str) -> Option<Vec<String>> {
        self.get(key).map(|v| v.to_array())
    }

    // ------------------------------------------------------------------
    // introspection
    // ------------------------------------------------------------------

    /// Returns `true` if `key` is in the override set.
    pub fn is_overridden(&self, key: &str) -> bool {
        self.read_state().overrides.contains(key)
    }

    /// Returns the override set in key order.
    pub fn override_keys(&self) -> Vec<PropertyKey> {
        self.read_state().overrides.iter().cloned().collect()
    }

    /// Returns the number of keys in the store, including unset watched keys.
    pub fn len(&self) -> usize {
        self.read_state().entries.len()
    }

    /// Returns `true` if the store holds no keys.
    pub fn is_empty(&self) -> bool {
        self.read_state().entries.is_empty()
    }

    /// Copies every key into a plain map, with unset values as `""`.
    pub fn to_map(&self) -> BTreeMap<String, String> {
        self.read_state()
            .entries
            .iter()
            .map(|(key, entry)| {
                let value = entry.value().map(PropertyValue::as_string).unwrap_or_default();
                (key.as_str().to_string(), value)
            })
            .collect()
    }

    /// Writes a human-readable listing of every key, long values shortened.
    pub fn list(&self, out: &mut impl io::Write) -> io::Result<()> {
        let lines: BTreeMap<String, String> = self
            .read_state()
            .entries
            .iter()
            .map(|(key, entry)| (key.as_str().to_string(), entry.to_string()))
            .collect();

        writeln!(out, "-- listing properties --")?;
        for (key, value) in lines {
            if value.chars().count() > LIST_VALUE_WIDTH {
                let short: String = value.chars().take(LIST_VALUE_WIDTH - 3).collect();
                writeln!(out, "{}={}...", key, short)?;
            } else {
                writeln!(out, "{}={}", key, value)?;
            }
        }
        Ok(())
    }
}

impl Default for PropertyStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PropertyStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.read_state();
        f.debug_struct("PropertyStore")
            .field("entries", &state.entries.len())
            .field("overrides", &state.overrides.len())
            .field("target", &self.target.get())
            .finish()
    }
}

impl PropertyService for PropertyStore {
    fn get(&self, key: &str) -> Option<PropertyValue> {
        self.read_state().value(key).cloned()
    }

    fn property_names(&self, prefix: &str) -> Vec<PropertyKey> {
        let mut names: Vec<PropertyKey> = self
            .read_state()
            .entries
            .keys()
            .filter(|key| key.has_prefix(prefix))
            .cloned()
            .collect();
        names.sort();
        names
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.set_with(key, value, Persist::Immediately)
    }

    fn set_group(&self, values: &[(&str, &str)]) -> Result<()> {
        self.set_group_with(values.iter().copied(), Persist::Immediately)
    }

    fn remove_key(&self, key: &str) -> Result<()> {
        self.remove_key_with(key, Persist::Immediately)
    }

    fn add_listener(&self, key: &str, listener: ListenerHandle) -> Result<()> {
        Self::check_key(key)?;
        let _guard = self.begin_update(key)?;
        self.write_state()
            .entries
            .entry(PropertyKey::from(key))
            .or_insert_with(|| Entry::Watched(WatchedEntry::new(None)))
            .add_listener(listener);
        Ok(())
    }

    fn remove_listener(&self, key: &str, listener: &ListenerHandle) -> Result<bool> {
        let _guard = self.begin_update(key)?;
        Ok(self
            .write_state()
            .entries
            .get_mut(key)
            .and_then(Entry::as_watched_mut)
            .is_some_and(|watched| watched.remove_listener(listener)))
    }
}

/// Builder for constructing a `PropertyStore`.
///
/// # Examples
///
/// ```rust
/// use hexprops::service::PropertyStoreBuilder;
///
/// # fn main() -> hexprops::domain::Result<()> {
/// let store = PropertyStoreBuilder::new()
///     .with_override_target("/tmp/instance.properties")
///     .build()?;
/// assert!(store.override_target().is_some());
/// # Ok(())
/// # }
/// ```
pub struct PropertyStoreBuilder {
    diagnostics: Option<Arc<dyn DiagnosticSink>>,
    format: Option<Arc<dyn PropertyFormat>>,
    target: Option<PathBuf>,
}

impl PropertyStoreBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self {
            diagnostics: None,
            format: None,
            target: None,
        }
    }

    /// Sends typed-getter diagnostics to `sink` instead of `tracing`.
    pub fn with_diagnostics(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.diagnostics = Some(sink);
        self
    }

    /// Reads and writes property files with a custom format.
    pub fn with_format(mut self, format: Arc<dyn PropertyFormat>) -> Self {
        self.format = Some(format);
        self
    }

    /// Binds the override target when the store is built.
    pub fn with_override_target(mut self, path: impl Into<PathBuf>) -> Self {
        self.target = Some(path.into());
        self
    }

    /// Binds the OS-appropriate override location for `app_name`.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use hexprops::service::PropertyStoreBuilder;
    ///
    /// # fn main() -> hexprops::domain::Result<()> {
    /// let store = PropertyStoreBuilder::new()
    ///     .with_default_override_location("imqbroker", "org.example")?
    ///     .build()?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn with_default_override_location(self, app_name: &str, qualifier: &str) -> Result<Self> {
        let path = default_override_path(app_name, qualifier)?;
        Ok(self.with_override_target(path))
    }

    /// Builds the store.
    ///
    /// # Errors
    ///
    /// [`PropertyError::Config`] if the configured override target is empty or
    /// its extension is not handled by the configured format.
    pub fn build(self) -> Result<PropertyStore> {
        let mut store = PropertyStore::new();
        if let Some(sink) = self.diagnostics {
            store.diagnostics = sink;
        }
        if let Some(format) = self.format {
            store.file = PropertiesFile::with_format(format);
        }
        if let Some(target) = self.target {
            store.bind_override_target(target)?;
        }
        Ok(store)
    }
}

impl Default for PropertyStoreBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{PropertyListener, Rejection};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingListener {
        validations: AtomicUsize,
        updates: AtomicUsize,
    }

    impl PropertyListener for CountingListener {
        fn validate(&self, _key: &PropertyKey, _value: Option<&str>) -> std::result::Result<(), Rejection> {
            self.validations.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn update(&self, _key: &PropertyKey, _value: Option<&str>) {
            self.updates.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct RejectingListener;

    impl PropertyListener for RejectingListener {
        fn validate(&self, _key: &PropertyKey, _value: Option<&str>) -> std::result::Result<(), Rejection> {
            Err(Rejection::new("not allowed"))
        }

        fn update(&self, _key: &PropertyKey, _value: Option<&str>) {
            panic!("update must not run after a rejection");
        }
    }

    #[test]
    fn test_store_new_is_empty() {
        let store = PropertyStore::new();
        assert!(store.is_empty());
        assert!(store.override_target().is_none());
    }

    #[test]
    fn test_set_without_target_commits_in_memory() {
        let store = PropertyStore::new();
        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap().as_str(), "v");
        assert!(store.is_overridden("k"));
    }

    #[test]
    fn test_set_empty_key_is_config_error() {
        let store = PropertyStore::new();
        assert!(matches!(store.set("", "v"), Err(PropertyError::Config { .. })));
    }

    #[test]
    fn test_bind_override_target_twice() {
        let store = PropertyStore::new();
        store.bind_override_target("/tmp/a.properties").unwrap();
        let err = store.bind_override_target("/tmp/b.properties").unwrap_err();
        assert!(matches!(err, PropertyError::Config { .. }));
        assert_eq!(store.override_target(), Some(Path::new("/tmp/a.properties")));
    }

    #[test]
    fn test_bind_override_target_empty() {
        let store = PropertyStore::new();
        assert!(matches!(
            store.bind_override_target(""),
            Err(PropertyError::Config { .. })
        ));
        assert!(store.override_target().is_none());
    }

    #[test]
    fn test_load_defaults_empty_path() {
        let store = PropertyStore::new();
        let err = store.load_defaults("").unwrap_err();
        assert!(matches!(err, PropertyError::Config { .. }));
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_load_overrides_empty_path() {
        let store = PropertyStore::new();
        let err = store.load_overrides("").unwrap_err();
        assert!(matches!(err, PropertyError::Config { .. }));
        assert!(!err.is_not_found());
        assert!(matches!(
            store.load_override_file(""),
            Err(PropertyError::Config { .. })
        ));
        assert!(store.override_target().is_none());
    }

    #[test]
    fn test_rejected_set_leaves_value() {
        let store = PropertyStore::new();
        store.set("k", "old").unwrap();
        store.add_listener("k", Arc::new(RejectingListener)).unwrap();

        let err = store.set("k", "new").unwrap_err();
        assert!(matches!(
            err,
            PropertyError::ValidationRejected { ref key, ref reason } if key == "k" && reason == "not allowed"
        ));
        assert_eq!(store.get("k").unwrap().as_str(), "old");
    }

    #[test]
    fn test_add_listener_twice_updates_twice() {
        let store = PropertyStore::new();
        let listener = Arc::new(CountingListener::default());
        let handle: ListenerHandle = listener.clone();
        store.add_listener("k", Arc::clone(&handle)).unwrap();
        store.add_listener("k", handle).unwrap();

        store.set("k", "v").unwrap();
        assert_eq!(listener.validations.load(Ordering::SeqCst), 2);
        assert_eq!(listener.updates.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_add_listener_on_absent_key() {
        let store = PropertyStore::new();
        store
            .add_listener("k", Arc::new(CountingListener::default()))
            .unwrap();
        assert!(store.is_watched("k"));
        assert!(store.get("k").is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_remove_listener() {
        let store = PropertyStore::new();
        let handle: ListenerHandle = Arc::new(CountingListener::default());
        store.add_listener("k", Arc::clone(&handle)).unwrap();

        assert!(store.remove_listener("k", &handle).unwrap());
        assert!(!store.remove_listener("k", &handle).unwrap());
        assert!(!store.remove_listener("unwatched", &handle).unwrap());
        assert!(store.is_watched("k"));
    }

    #[test]
    fn test_clear_listeners_keeps_key_watched() {
        let store = PropertyStore::new();
        store.set("k", "v").unwrap();
        store
            .add_listener("k", Arc::new(CountingListener::default()))
            .unwrap();
        store.clear_listeners("k").unwrap();

        assert!(store.is_watched("k"));
        assert_eq!(store.listener_count("k"), 0);
        assert_eq!(store.get("k").unwrap().as_str(), "v");
    }

    #[test]
    fn test_remove_key_plain_and_watched() {
        let store = PropertyStore::new();
        store.set("plain", "1").unwrap();
        store.set("watched", "2").unwrap();
        store
            .add_listener("watched", Arc::new(CountingListener::default()))
            .unwrap();

        store.remove_key("plain").unwrap();
        store.remove_key("watched").unwrap();

        assert!(store.get("plain").is_none());
        assert!(store.get("watched").is_none());
        assert!(!store.is_overridden("plain"));
        assert!(!store.is_overridden("watched"));
        assert!(store.is_watched("watched"));
        assert_eq!(store.listener_count("watched"), 1);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_set_group_empty_is_noop() {
        let store = PropertyStore::new();
        store.set_group(&[]).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_set_bool() {
        let store = PropertyStore::new();
        store.set_bool("flag", true).unwrap();
        assert_eq!(store.get("flag").unwrap().as_str(), "true");
        assert!(store.get_bool("flag", false));
    }

    #[test]
    fn test_property_names_sorted_by_prefix() {
        let store = PropertyStore::new();
        store
            .set_group(&[("imq.b", "2"), ("jms.c", "3"), ("imq.a", "1")])
            .unwrap();
        assert_eq!(
            store.property_names("imq."),
            vec![PropertyKey::from("imq.a"), PropertyKey::from("imq.b")]
        );
        assert_eq!(store.property_names("").len(), 3);
    }

    #[test]
    fn test_to_map_uses_empty_for_unset() {
        let store = PropertyStore::new();
        store.set("a", "1").unwrap();
        store
            .add_listener("b", Arc::new(CountingListener::default()))
            .unwrap();

        let map = store.to_map();
        assert_eq!(map.get("a"), Some(&"1".to_string()));
        assert_eq!(map.get("b"), Some(&"".to_string()));
    }

    #[test]
    fn test_list_truncates_long_values() {
        let store = PropertyStore::new();
        store.set("long", &"x".repeat(80)).unwrap();
        store.set("short", "y").unwrap();

        let mut out = Vec::new();
        store.list(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();

        assert_eq!(lines.next(), Some("-- listing properties --"));
        assert_eq!(
            lines.next().map(String::from),
            Some(format!("long={}...", "x".repeat(57)))
        );
        assert_eq!(lines.next(), Some("short=y"));
    }

    #[test]
    fn test_typed_getters_absent_use_default() {
        let store = PropertyStore::new();
        assert_eq!(store.get_int("missing", 7), 7);
        assert_eq!(store.get_long("missing", 8), 8);
        assert_eq!(store.get_percentage("missing", 0.5), 0.5);
        assert!(store.get_bool("missing", true));
        assert_eq!(
            store.get_size("missing", SizeQuantity::from_kilobytes(1)),
            SizeQuantity::from_kilobytes(1)
        );
        assert!(store.get_list("missing").is_none());
        assert!(store.get_array("missing").is_none());
    }

    #[test]
    fn test_store_debug() {
        let store = PropertyStore::new();
        store.set("k", "v").unwrap();
        let debug = format!("{:?}", store);
        assert!(debug.contains("entries: 1"));
    }

    #[test]
    fn test_builder_default() {
        let store = PropertyStoreBuilder::default().build().unwrap();
        assert!(store.override_target().is_none());
    }

    #[test]
    fn test_bind_override_target_checks_extension() {
        let store = PropertyStore::new();
        assert!(matches!(
            store.bind_override_target("/tmp/instance.yaml"),
            Err(PropertyError::Config { .. })
        ));
        assert!(store.override_target().is_none());

        store.bind_override_target("/tmp/INSTANCE.PROPERTIES").unwrap();
        assert!(store.override_target().is_some());
    }

    #[test]
    fn test_bind_override_target_without_extension() {
        let store = PropertyStore::new();
        store.bind_override_target("/tmp/instance").unwrap();
    }

    #[test]
    fn test_builder_uses_format_extensions() {
        struct LinesFormat;

        impl PropertyFormat for LinesFormat {
            fn parse(
                &self,
                _content: &str,
            ) -> std::result::Result<BTreeMap<String, String>, crate::ports::FormatError> {
                Ok(BTreeMap::new())
            }

            fn render(&self, header: &str, _values: &BTreeMap<String, String>) -> String {
                format!("#{}\n", header)
            }

            fn supported_extensions(&self) -> &[&str] {
                &["lines"]
            }
        }

        let store = PropertyStore::builder()
            .with_format(Arc::new(LinesFormat))
            .with_override_target("/tmp/instance.lines")
            .build()
            .unwrap();
        assert_eq!(store.override_target(), Some(Path::new("/tmp/instance.lines")));

        let result = PropertyStore::builder()
            .with_format(Arc::new(LinesFormat))
            .with_override_target("/tmp/instance.properties")
            .build();
        assert!(matches!(result, Err(PropertyError::Config { .. })));
    }

    #[test]
    fn test_builder_with_empty_target() {
        let result = PropertyStore::builder().with_override_target("").build();
        assert!(matches!(result, Err(PropertyError::Config { .. })));
    }

    #[test]
    fn test_persist_default_is_immediately() {
        assert_eq!(Persist::default(), Persist::Immediately);
    }
}
