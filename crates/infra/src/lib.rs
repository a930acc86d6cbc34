//! Infrastructure layer: storage backends and the ingest pipeline.

pub mod ingest;
pub mod store;


pub use ingest::{IngestError, IngestPipeline};
pub use store::{CatalogStore, HistoryStore, InMemoryStore, SqliteStore, StoreConfig, StoreError};
