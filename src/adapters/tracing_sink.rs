// SPDX-License-Identifier: MIT OR Apache-2.0

//! Diagnostic sink that forwards records to `tracing`.

use crate::domain::{BadPropertyValue, Severity};
use crate::ports::DiagnosticSink;

/// Logs every diagnostic as a structured `tracing` event.
///
/// Records are emitted at `INFO` with the fields `code`, `key`, `raw_value`
/// and `reason`. This is the store's default sink.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDiagnostics;

impl TracingDiagnostics {
    /// Creates a new tracing sink.
    pub fn new() -> Self {
        TracingDiagnostics
    }
}

impl DiagnosticSink for TracingDiagnostics {
    fn report(&self, record: BadPropertyValue) {
        match record.severity {
            Severity::Info => tracing::info!(
                code = record.code(),
                key = %record.key,
                raw_value = %record.raw_value,
                reason = %record.reason,
                "bad property value, using default"
            ),
        }
    }
}
