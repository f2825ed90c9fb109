// SPDX-License-Identifier: MIT OR Apache-2.0

//! A hexagonal architecture property store for long-running servers.
//!
//! This crate keeps a process's configuration as string key/value pairs,
//! layered as bulk-loaded defaults with a per-instance override file on top.
//! Components read properties through typed getters and may register
//! listeners that validate and then apply changes to the keys they care about.
//!
//! # Architecture
//!
//! The crate follows hexagonal architecture principles:
//!
//! - **Domain Layer**: Core types and logic (`PropertyKey`, `PropertyValue`, entries, errors)
//! - **Ports**: Trait definitions that define interfaces (`PropertyListener`, `DiagnosticSink`, `PropertyFormat`)
//! - **Adapters**: The `.properties` file format and the `tracing` diagnostic sink
//! - **Service**: `PropertyStore`, which orchestrates loading, updates and persistence
//!
//! # Features
//!
//! - **Layering**: Defaults never replace values that were overridden
//! - **Validated Updates**: Every listener must accept a change before it is applied
//! - **Persistence**: The override set is rewritten to disk after each update
//! - **Type Safety**: Integer, boolean, percentage, size and list getters with defaults
//! - **Diagnostics**: Malformed values are reported, never raised to the caller
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use hexprops::prelude::*;
//! use std::sync::Arc;
//!
//! struct PortListener;
//!
//! impl PropertyListener for PortListener {
//!     fn validate(&self, _key: &PropertyKey, value: Option<&str>) -> std::result::Result<(), Rejection> {
//!         match value.map(str::parse::<u16>) {
//!             Some(Ok(_)) | None => Ok(()),
//!             Some(Err(_)) => Err(Rejection::new("port must be a number between 0 and 65535")),
//!         }
//!     }
//!
//!     fn update(&self, _key: &PropertyKey, value: Option<&str>) {
//!         tracing::info!("listening port is now {:?}", value);
//!     }
//! }
//!
//! # fn main() -> Result<()> {
//! let store = PropertyStore::new();
//! store.load_defaults("/opt/imq/lib/default.properties")?;
//! if let Err(e) = store.load_override_file("/var/imq/instance.properties") {
//!     if !e.is_not_found() {
//!         return Err(e);
//!     }
//! }
//!
//! store.add_listener("imq.portmapper.port", Arc::new(PortListener))?;
//! store.set("imq.portmapper.port", "7677")?;
//! assert_eq!(store.get_int("imq.portmapper.port", 7676), 7677);
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

/// Commonly used types and traits.
///
/// This module re-exports the most commonly used types and traits for convenient access.
pub mod prelude {
    pub use crate::adapters::{PropertiesFile, PropertiesFormat, TracingDiagnostics};
    pub use crate::domain::{
        PropertyError, PropertyKey, PropertyService, PropertyValue, Result, SizeQuantity,
    };
    pub use crate::ports::{DiagnosticSink, ListenerHandle, PropertyListener, Rejection};
    pub use crate::service::{Persist, PropertyStore, PropertyStoreBuilder};
}
