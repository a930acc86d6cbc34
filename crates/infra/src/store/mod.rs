//! Storage boundary for the catalog and the price history.
//!
//! This module defines the infrastructure-facing abstraction over the shared
//! store without making storage assumptions: an SQLite implementation for
//! production use and an in-memory implementation for tests/dev. The store
//! handle is constructed by the caller and passed in explicitly — there is no
//! process-wide engine or session singleton.

pub mod in_memory;
pub mod sqlite;
pub mod r#trait;

pub use in_memory::InMemoryStore;
pub use sqlite::{SqliteStore, StoreConfig};
pub use r#trait::{CatalogStore, HistoryStore, StoreError};
