// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapters layer containing the default port implementations.
//!
//! `properties_file` reads and writes Java-style `.properties` files and
//! `tracing_sink` forwards diagnostics to the `tracing` ecosystem.

pub mod properties_file;
pub mod tracing_sink;

// Re-export commonly used types
pub use properties_file::{
    default_override_path, PropertiesFile, PropertiesFormat, DEFAULT_OVERRIDE_FILE,
    GENERATED_HEADER,
};
pub use tracing_sink::TracingDiagnostics;
