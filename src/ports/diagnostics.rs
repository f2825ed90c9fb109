// SPDX-License-Identifier: MIT OR Apache-2.0

//! Diagnostic sink trait definition.
//!
//! Typed getters never fail; when a stored value cannot be converted they fall
//! back to the caller's default and hand a [`BadPropertyValue`] record to a
//! `DiagnosticSink`. The default sink logs through `tracing`.

use crate::domain::BadPropertyValue;

/// Receives recoverable diagnostics from the property store.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; getters are called from any thread.
///
/// # Examples
///
/// ```rust
/// use hexprops::domain::BadPropertyValue;
/// use hexprops::ports::DiagnosticSink;
/// use std::sync::Mutex;
///
/// #[derive(Default)]
/// struct Collect(Mutex<Vec<BadPropertyValue>>);
///
/// impl DiagnosticSink for Collect {
///     fn report(&self, record: BadPropertyValue) {
///         self.0.lock().unwrap().push(record);
///     }
/// }
/// ```
pub trait DiagnosticSink: Send + Sync {
    /// Records a bad property value. Must not panic or block for long.
    fn report(&self, record: BadPropertyValue);
}
