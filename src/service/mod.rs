// SPDX-License-Identifier: MIT OR Apache-2.0

//! Service layer containing the property store.
//!
//! This module contains the concrete implementation of the `PropertyService`
//! trait: a layered store with validated, listener-aware updates and an
//! override file that is rewritten on every change.

pub mod property_store;

// Re-export commonly used types
pub use property_store::{Persist, PropertyStore, PropertyStoreBuilder};
