//! Test store setup
#![allow(dead_code)]

use insta_toggles::store::{DbToggleStore, MemoryToggleStore, ToggleStore};
use std::sync::Arc;

/// Fresh SQLite database in memory with the schema and contexts in place.
///
/// A single pooled connection keeps every query on the same in-memory database.
pub async fn setup_test_store() -> DbToggleStore {
    let db = insta_toggles::db::connect("sqlite::memory:", 1)
        .await
        .expect("Failed to open in-memory SQLite");
    insta_toggles::db::init_schema(&db)
        .await
        .expect("Failed to create schema");

    DbToggleStore::new(db)
}

/// Every store backend, each freshly initialised, labelled for assertion messages
pub async fn all_backends() -> Vec<(&'static str, Arc<dyn ToggleStore>)> {
    vec![
        ("sqlite", Arc::new(setup_test_store().await)),
        ("memory", Arc::new(MemoryToggleStore::new())),
    ]
}
