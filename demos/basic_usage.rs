// SPDX-License-Identifier: MIT OR Apache-2.0

//! Basic usage example for the property store.
//!
//! This example demonstrates:
//! - Loading defaults and a per-instance override file
//! - Typed getters with default values
//! - Registering a listener that validates changes
//! - Updating properties and saving the override file
//!
//! To run this example:
//! ```bash
//! cargo run --example basic_usage
//! ```

use hexprops::prelude::*;
use std::sync::Arc;

/// Accepts only positive thread counts.
struct ThreadPoolListener;

impl PropertyListener for ThreadPoolListener {
    fn validate(&self, key: &PropertyKey, value: Option<&str>) -> std::result::Result<(), Rejection> {
        match value.map(str::parse::<u32>) {
            Some(Ok(0)) | Some(Err(_)) => Err(Rejection::new(format!(
                "{} must be a positive number",
                key
            ))),
            _ => Ok(()),
        }
    }

    fn update(&self, key: &PropertyKey, value: Option<&str>) {
        println!("  pool resized: {} -> {}", key, value.unwrap_or("<unset>"));
    }
}

fn main() -> Result<()> {
    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt::init();

    println!("=== Property Store: Basic Usage ===\n");

    let dir = std::env::temp_dir().join("hexprops-basic-usage");
    let defaults = dir.join("default.properties");
    let overrides = dir.join("instance.properties");

    // Example defaults; a real broker ships these with the install image.
    std::fs::create_dir_all(&dir).map_err(|source| PropertyError::Io {
        path: dir.clone(),
        source,
    })?;
    std::fs::write(
        &defaults,
        "imq.portmapper.port=7676\n\
         imq.thread.pool.max=64\n\
         imq.autocreate.queue=true\n\
         imq.memory.threshold=80\n\
         imq.message.max_size=70m\n\
         imq.cluster.brokerlist=host1:7676, host2:7676\n",
    )
    .map_err(|source| PropertyError::Io {
        path: defaults.clone(),
        source,
    })?;

    let store = PropertyStore::new();
    let loaded = store.load_defaults(&defaults)?;
    println!("Loaded {} defaults", loaded);

    // A fresh instance has no override file yet.
    match store.load_override_file(&overrides) {
        Ok(count) => println!("Loaded {} overrides from {}", count, overrides.display()),
        Err(e) if e.is_not_found() => println!("No overrides yet at {}", overrides.display()),
        Err(e) => return Err(e),
    }

    println!("\n--- Typed getters ---");
    println!("port:      {}", store.get_int("imq.portmapper.port", 7676));
    println!("autocreate: {}", store.get_bool("imq.autocreate.queue", false));
    println!("threshold: {}", store.get_percentage("imq.memory.threshold", 0.8));
    println!(
        "max size:  {}",
        store.get_size("imq.message.max_size", SizeQuantity::from_megabytes(1))
    );
    println!("brokers:   {:?}", store.get_list("imq.cluster.brokerlist"));

    println!("\n--- Validated updates ---");
    store.add_listener("imq.thread.pool.max", Arc::new(ThreadPoolListener))?;

    store.set("imq.thread.pool.max", "128")?;
    match store.set("imq.thread.pool.max", "0") {
        Ok(()) => println!("  unexpected: zero accepted"),
        Err(e) => println!("  rejected: {}", e),
    }
    println!("pool max is {}", store.get_int("imq.thread.pool.max", 0));

    store.set_group(&[("imq.autocreate.queue", "false"), ("imq.log.level", "DEBUG")])?;

    println!("\n--- Current properties ---");
    store
        .list(&mut std::io::stdout())
        .map_err(|source| PropertyError::Io {
            path: overrides.clone(),
            source,
        })?;

    println!("\nOverrides saved to {}", overrides.display());
    Ok(())
}
