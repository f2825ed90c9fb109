// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain layer containing core types and logic.
//!
//! This module holds the property key and value types, typed conversions,
//! the per-key entry model, diagnostics and errors. It is independent of any
//! file format or logging backend.

pub mod diagnostic;
pub mod entry;
pub mod errors;
pub mod property_key;
pub mod property_value;
pub mod service;
pub mod size;

// Re-export commonly used types
pub use diagnostic::{BadPropertyValue, Severity};
pub use entry::{Entry, WatchedEntry};
pub use errors::{PropertyError, Result};
pub use property_key::PropertyKey;
pub use property_value::{PropertyValue, LIST_DELIMITER};
pub use service::PropertyService;
pub use size::{SizeParseError, SizeQuantity};
