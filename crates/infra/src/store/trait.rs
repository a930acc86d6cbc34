use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use pricetrail_catalog::{NewProduct, Product};
use pricetrail_core::ProductId;
use pricetrail_history::{Price, PriceObservation};

/// Storage operation error.
///
/// These are **infrastructure errors** (connectivity, timeouts, constraint
/// machinery) as opposed to domain errors (validation). The split matters to
/// callers: `Storage` is transient and the whole ingest call is safe to
/// retry; `Referential` indicates a broken internal invariant and should be
/// surfaced, not swallowed.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The underlying store is unreachable, timed out, or failed mid-write.
    #[error("storage failure: {0}")]
    Storage(String),

    /// A foreign-key constraint was violated (observation without a product).
    #[error("referential integrity violation: {0}")]
    Referential(String),
}

/// The durable catalog of tracked products, keyed by canonical URL.
///
/// ## Identity semantics
///
/// `url` is the sole identity key; the product id is a storage-level handle.
/// `resolve_or_create` is the only write on the ingest path and must be
/// idempotent per URL: any sequence or interleaving of calls for the same
/// URL yields exactly one stored product.
///
/// ## Implementation requirements
///
/// - Uniqueness of `url` must be guarded by a storage-level constraint, not
///   just the lookup: two concurrent calls for the same new URL race between
///   check and create. On a duplicate-key violation at write time the
///   implementation re-reads once and returns the winning row instead of
///   surfacing the violation.
/// - Descriptive fields (`name`, `store`) of an existing product are never
///   overwritten (first-write-wins).
/// - Operations apply a bounded timeout and return `StoreError::Storage` on
///   expiry rather than hang.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Look up the product for `draft.url()`, creating it on first sight.
    ///
    /// Returns the product and whether this call created it.
    async fn resolve_or_create(&self, draft: NewProduct) -> Result<(Product, bool), StoreError>;

    /// Look up a product by exact canonical URL.
    async fn find_by_url(&self, url: &str) -> Result<Option<Product>, StoreError>;

    /// All known products.
    async fn list_products(&self) -> Result<Vec<Product>, StoreError>;

    /// Administrative removal of a product **and its entire history**
    /// (cascading ownership). Never called by the ingest path. Returns
    /// whether a product was removed.
    async fn remove_product(&self, id: ProductId) -> Result<bool, StoreError>;
}

/// Append-only history of price observations.
///
/// Records are immutable once appended; nothing in normal operation updates
/// or deletes them. Existence of the referenced product is the caller's
/// responsibility — the store relies on the referential constraint and maps
/// its violation to `StoreError::Referential`.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Persist one observation. `observed_at` defaults to the append time
    /// when not supplied by the caller.
    async fn append(
        &self,
        product_id: ProductId,
        price: Price,
        observed_at: Option<DateTime<Utc>>,
    ) -> Result<PriceObservation, StoreError>;

    /// All observations for one product, ordered by `observed_at` ascending.
    ///
    /// This is the explicit query that replaces object-graph traversal:
    /// products hold no back-references to their history.
    async fn observations_for(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<PriceObservation>, StoreError>;
}

#[async_trait]
impl<S> CatalogStore for Arc<S>
where
    S: CatalogStore + ?Sized,
{
    async fn resolve_or_create(&self, draft: NewProduct) -> Result<(Product, bool), StoreError> {
        (**self).resolve_or_create(draft).await
    }

    async fn find_by_url(&self, url: &str) -> Result<Option<Product>, StoreError> {
        (**self).find_by_url(url).await
    }

    async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        (**self).list_products().await
    }

    async fn remove_product(&self, id: ProductId) -> Result<bool, StoreError> {
        (**self).remove_product(id).await
    }
}

#[async_trait]
impl<S> HistoryStore for Arc<S>
where
    S: HistoryStore + ?Sized,
{
    async fn append(
        &self,
        product_id: ProductId,
        price: Price,
        observed_at: Option<DateTime<Utc>>,
    ) -> Result<PriceObservation, StoreError> {
        (**self).append(product_id, price, observed_at).await
    }

    async fn observations_for(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<PriceObservation>, StoreError> {
        (**self).observations_for(product_id).await
    }
}
