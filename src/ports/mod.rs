// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ports layer containing trait definitions.
//!
//! This module contains the traits the property store talks through: change
//! listeners, the diagnostic sink, and the on-disk file format. Adapters in
//! the adapters layer provide the default implementations.

pub mod diagnostics;
pub mod format;
pub mod listener;

// Re-export commonly used types
pub use diagnostics::DiagnosticSink;
pub use format::{FormatError, PropertyFormat};
pub use listener::{ListenerHandle, PropertyListener, Rejection};
