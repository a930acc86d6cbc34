//! The ingest pipeline: one scraped observation in, one history record out.
//!
//! Per-call state machine (nothing is persisted between calls):
//!
//! ```text
//! Observation
//!   ↓
//! 1. Validate (url non-empty, price finite and positive) — no side effects
//!   ↓
//! 2. Resolve-or-create the catalog product (idempotent per url)
//!   ↓
//! 3. Append one immutable price observation
//!   ↓
//! Success: the persisted PriceObservation
//! ```
//!
//! Atomicity is deliberately relaxed across steps 2–3: if the append fails
//! after a product was just created, the product is kept. A product with zero
//! history rows is harmless and fills in on the next successful ingest of the
//! same URL. Each individual write is atomic; cross-entity rollback is not
//! attempted.
//!
//! The pipeline composes the two store traits and contains no IO of its own;
//! it returns typed errors and never logs or prints.

use thiserror::Error;

use pricetrail_catalog::NewProduct;
use pricetrail_core::DomainError;
use pricetrail_history::{Price, PriceObservation};
use pricetrail_scrape::Observation;

use crate::store::{CatalogStore, HistoryStore, StoreError};

/// Ingest failure taxonomy.
///
/// - `InvalidInput`: malformed observation; retrying without fixing the data
///   will fail again.
/// - `Storage`: transient infrastructure failure; retrying the whole ingest
///   call is safe (product resolution is idempotent per url).
/// - `Referential`: internal invariant violation; indicates a bug and should
///   be surfaced by the caller, not swallowed.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("invalid observation: {0}")]
    InvalidInput(String),

    #[error("storage failure: {0}")]
    Storage(String),

    #[error("referential integrity violation: {0}")]
    Referential(String),
}

impl IngestError {
    /// Whether retrying the same ingest call can succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Storage(_))
    }
}

impl From<StoreError> for IngestError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Storage(msg) => Self::Storage(msg),
            StoreError::Referential(msg) => Self::Referential(msg),
        }
    }
}

impl From<DomainError> for IngestError {
    fn from(value: DomainError) -> Self {
        Self::InvalidInput(value.to_string())
    }
}

/// Orchestrates one ingest call against a shared store.
///
/// Generic over the store so tests run against `InMemoryStore` and
/// production against `SqliteStore` (or any future backend) without touching
/// the pipeline. The store handle is passed in by the caller; the pipeline
/// owns no connection lifecycle of its own.
pub struct IngestPipeline<S> {
    store: S,
}

impl<S> IngestPipeline<S>
where
    S: CatalogStore + HistoryStore,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Record one observation: resolve-or-create the product, append to its
    /// history, return the persisted record.
    pub async fn ingest(&self, observation: Observation) -> Result<PriceObservation, IngestError> {
        // Step 1: both validations happen before any store call, so an
        // invalid observation leaves zero stored records.
        let draft = NewProduct::new(observation.url, observation.name, observation.store)?;
        let price = Price::new(observation.price)?;

        // Step 2: idempotent per url; a StoreError here aborts the call with
        // nothing appended.
        let (product, _created) = self.store.resolve_or_create(draft).await?;

        // Step 3: a failure here keeps the product (relaxed atomicity, see
        // module docs).
        let stored = self.store.append(product.id_typed(), price, None).await?;
        Ok(stored)
    }
}
