use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use pricetrail_catalog::{NewProduct, Product};
use pricetrail_core::{ObservationId, ProductId};
use pricetrail_history::{Price, PriceObservation};

use super::r#trait::{CatalogStore, HistoryStore, StoreError};

#[derive(Debug, Default)]
struct Inner {
    products: HashMap<ProductId, Product>,
    by_url: HashMap<String, ProductId>,
    history: HashMap<ProductId, Vec<PriceObservation>>,
}

/// In-memory catalog + history store.
///
/// Intended for tests/dev. The `by_url` map under the write lock is the
/// uniqueness guard: lookup and create happen under one exclusive lock, so
/// concurrent `resolve_or_create` calls for the same new URL cannot both
/// insert.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    inner: RwLock<Inner>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Inner>, StoreError> {
        self.inner
            .read()
            .map_err(|_| StoreError::Storage("lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Inner>, StoreError> {
        self.inner
            .write()
            .map_err(|_| StoreError::Storage("lock poisoned".to_string()))
    }
}

#[async_trait]
impl CatalogStore for InMemoryStore {
    async fn resolve_or_create(&self, draft: NewProduct) -> Result<(Product, bool), StoreError> {
        let mut inner = self.write()?;

        if let Some(id) = inner.by_url.get(draft.url()) {
            let existing = inner
                .products
                .get(id)
                .cloned()
                .ok_or_else(|| StoreError::Storage("url index out of sync".to_string()))?;
            // First-write-wins: existing name/store stay as recorded.
            return Ok((existing, false));
        }

        let id = ProductId::new();
        let product = Product::new(id, draft, Utc::now());
        inner.by_url.insert(product.url().to_string(), id);
        inner.products.insert(id, product.clone());
        Ok((product, true))
    }

    async fn find_by_url(&self, url: &str) -> Result<Option<Product>, StoreError> {
        let inner = self.read()?;
        let product = inner
            .by_url
            .get(url)
            .and_then(|id| inner.products.get(id))
            .cloned();
        Ok(product)
    }

    async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        let inner = self.read()?;
        let mut products: Vec<Product> = inner.products.values().cloned().collect();
        products.sort_by_key(|p| (p.created_at(), *p.id_typed().as_uuid()));
        Ok(products)
    }

    async fn remove_product(&self, id: ProductId) -> Result<bool, StoreError> {
        let mut inner = self.write()?;
        let Some(product) = inner.products.remove(&id) else {
            return Ok(false);
        };
        inner.by_url.remove(product.url());
        // Cascading ownership: the history goes with the product.
        inner.history.remove(&id);
        Ok(true)
    }
}

#[async_trait]
impl HistoryStore for InMemoryStore {
    async fn append(
        &self,
        product_id: ProductId,
        price: Price,
        observed_at: Option<DateTime<Utc>>,
    ) -> Result<PriceObservation, StoreError> {
        let mut inner = self.write()?;

        if !inner.products.contains_key(&product_id) {
            return Err(StoreError::Referential(format!(
                "no product with id {product_id}"
            )));
        }

        let observation = PriceObservation::new(
            ObservationId::new(),
            product_id,
            price,
            observed_at.unwrap_or_else(Utc::now),
        );
        inner
            .history
            .entry(product_id)
            .or_default()
            .push(observation.clone());
        Ok(observation)
    }

    async fn observations_for(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<PriceObservation>, StoreError> {
        let inner = self.read()?;
        let mut observations = inner.history.get(&product_id).cloned().unwrap_or_default();
        observations.sort_by_key(|o| (o.observed_at(), *o.id_typed().as_uuid()));
        Ok(observations)
    }
}
