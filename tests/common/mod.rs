// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock listeners, sinks and file helpers shared by the integration tests.

use hexprops::domain::{BadPropertyValue, PropertyKey};
use hexprops::ports::{DiagnosticSink, PropertyListener, Rejection};
use std::io::Write;
use std::sync::Mutex;

/// One callback received by a [`RecordingListener`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(dead_code)]
pub enum Call {
    Validate(String, Option<String>),
    Update(String, Option<String>),
}

/// A listener that accepts everything and records every callback.
#[derive(Debug, Default)]
pub struct RecordingListener {
    calls: Mutex<Vec<Call>>,
}

#[allow(dead_code)]
impl RecordingListener {
    /// Creates a new recording listener.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every callback received so far, in order.
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Returns the values passed to `update`, in order.
    pub fn updates(&self) -> Vec<Option<String>> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Update(_, value) => Some(value),
                Call::Validate(..) => None,
            })
            .collect()
    }

    /// Returns how many times `validate` was called.
    pub fn validations(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, Call::Validate(..)))
            .count()
    }
}

impl PropertyListener for RecordingListener {
    fn validate(&self, key: &PropertyKey, value: Option<&str>) -> Result<(), Rejection> {
        self.calls.lock().unwrap().push(Call::Validate(
            key.as_str().to_string(),
            value.map(str::to_string),
        ));
        Ok(())
    }

    fn update(&self, key: &PropertyKey, value: Option<&str>) {
        self.calls.lock().unwrap().push(Call::Update(
            key.as_str().to_string(),
            value.map(str::to_string),
        ));
    }
}

/// A listener that refuses one specific value and accepts the rest.
#[derive(Debug)]
pub struct RejectingListener {
    forbidden: String,
    updates: Mutex<usize>,
}

#[allow(dead_code)]
impl RejectingListener {
    /// Creates a listener that rejects `forbidden`.
    pub fn new(forbidden: impl Into<String>) -> Self {
        Self {
            forbidden: forbidden.into(),
            updates: Mutex::new(0),
        }
    }

    /// Returns how many updates were applied.
    pub fn updates(&self) -> usize {
        *self.updates.lock().unwrap()
    }
}

impl PropertyListener for RejectingListener {
    fn validate(&self, _key: &PropertyKey, value: Option<&str>) -> Result<(), Rejection> {
        if value == Some(self.forbidden.as_str()) {
            return Err(Rejection::new(format!("'{}' is forbidden", self.forbidden)));
        }
        Ok(())
    }

    fn update(&self, _key: &PropertyKey, _value: Option<&str>) {
        *self.updates.lock().unwrap() += 1;
    }
}

/// A diagnostic sink that keeps every record.
#[derive(Debug, Default)]
pub struct CollectingSink {
    records: Mutex<Vec<BadPropertyValue>>,
}

#[allow(dead_code)]
impl CollectingSink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every record reported so far.
    pub fn records(&self) -> Vec<BadPropertyValue> {
        self.records.lock().unwrap().clone()
    }
}

impl DiagnosticSink for CollectingSink {
    fn report(&self, record: BadPropertyValue) {
        self.records.lock().unwrap().push(record);
    }
}

/// Creates a temporary property file with the given content.
///
/// Returns a NamedTempFile that will be automatically deleted when dropped.
#[allow(dead_code)]
pub fn create_temp_properties(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".properties")
        .tempfile()
        .unwrap();
    write!(file, "{}", content).unwrap();
    file.flush().unwrap();
    file
}
