//! Result stores for secreview
//!
//! Checks persist their own results through a [`ResultStore`]. This crate
//! provides an in-memory store and a SQLite-backed one.
//!
//! # Example
//!
//! ```no_run
//! use secreview_core::{CheckKey, ResultStore};
//! use secreview_store::SqliteResultStore;
//!
//! let store = SqliteResultStore::open(std::path::Path::new("results.db")).unwrap();
//! let key = CheckKey::new("Security Review", "Error reporting");
//! if let Some(last) = store.latest(&key).unwrap() {
//!     println!("{} at {}", last.result.status, last.stored_at);
//! }
//! ```

mod database;
mod memory;

pub use database::SqliteResultStore;
pub use memory::MemoryResultStore;

use secreview_core::{Result, ResultStore, StoreConfig};
use std::sync::Arc;

/// Build the store described by the configuration
pub fn open_store(config: &StoreConfig) -> Result<Arc<dyn ResultStore>> {
    match &config.database_path {
        Some(path) => {
            tracing::debug!("Using result database {}", path.display());
            Ok(Arc::new(SqliteResultStore::open(path)?))
        }
        None => Ok(Arc::new(MemoryResultStore::new())),
    }
}
