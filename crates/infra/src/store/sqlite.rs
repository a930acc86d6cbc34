//! SQLite-backed store implementation.
//!
//! Persists the catalog and price history in a single SQLite database file
//! (or an in-memory database for tests). Identity and referential rules are
//! enforced at the database level: a UNIQUE constraint on `products.url` and
//! a foreign key with `ON DELETE CASCADE` from `price_history` to `products`.
//!
//! ## Error Mapping
//!
//! SQLx errors are mapped to `StoreError` as follows:
//!
//! | SQLx Error | SQLite condition | StoreError | Scenario |
//! |------------|-----------------|------------|----------|
//! | Database (unique violation) | `SQLITE_CONSTRAINT_UNIQUE` on `url` | resolved internally | Lost check-then-create race; re-read and return the winning row |
//! | Database (foreign key violation) | `SQLITE_CONSTRAINT_FOREIGNKEY` | `Referential` | Observation references a missing product |
//! | PoolTimedOut | N/A | `Storage` | Bounded acquire timeout expired |
//! | Other | Any | `Storage` | Connection failures, disk errors, corrupt rows |
//!
//! ## Thread Safety
//!
//! `SqliteStore` is `Send + Sync`; all operations go through the SQLx
//! connection pool. Each of the two ingest writes (product insert,
//! observation insert) is a single statement and therefore atomic in
//! isolation; there is deliberately no cross-entity transaction (relaxed
//! atomicity — a product without history is a harmless, self-healing state).

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::FromRow;
use tracing::instrument;

use pricetrail_catalog::{NewProduct, Product};
use pricetrail_core::{ObservationId, ProductId};
use pricetrail_history::{Price, PriceObservation};

use super::r#trait::{CatalogStore, HistoryStore, StoreError};

/// Explicit store configuration, constructed by the caller.
///
/// No process-wide engine state: the caller builds a config, connects, and
/// owns the resulting handle for its lifetime.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    path: Option<PathBuf>,
    max_connections: u32,
    acquire_timeout: Duration,
}

impl StoreConfig {
    /// Database in a file at `path`; parent directories are created on
    /// connect if missing.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            max_connections: 5,
            acquire_timeout: Duration::from_secs(5),
        }
    }

    /// Private in-memory database (tests/dev). Lives as long as the store.
    pub fn ephemeral() -> Self {
        Self {
            path: None,
            max_connections: 1,
            acquire_timeout: Duration::from_secs(5),
        }
    }

    pub fn with_max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = max_connections;
        self
    }

    /// Bound on waiting for a pooled connection; expiry surfaces as
    /// `StoreError::Storage` instead of hanging.
    pub fn with_acquire_timeout(mut self, acquire_timeout: Duration) -> Self {
        self.acquire_timeout = acquire_timeout;
        self
    }
}

/// SQLite-backed catalog + history store.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (or create) the database and initialize the schema.
    pub async fn connect(config: &StoreConfig) -> Result<Self, StoreError> {
        let options = match &config.path {
            Some(path) => {
                if let Some(parent) = path.parent() {
                    if !parent.as_os_str().is_empty() {
                        std::fs::create_dir_all(parent).map_err(|e| {
                            StoreError::Storage(format!(
                                "failed to create database directory {}: {e}",
                                parent.display()
                            ))
                        })?;
                    }
                }
                SqliteConnectOptions::new()
                    .filename(path)
                    .create_if_missing(true)
                    .foreign_keys(true)
                    .busy_timeout(config.acquire_timeout)
            }
            None => SqliteConnectOptions::new()
                .in_memory(true)
                .foreign_keys(true)
                .busy_timeout(config.acquire_timeout),
        };

        let pool = pool_options(config)
            .connect_with(options)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;

        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    /// Close the underlying pool, waiting for in-flight operations to finish.
    ///
    /// Part of the explicit handle lifecycle: the caller opens the store and
    /// closes it; nothing process-wide holds a connection.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Create the tables if they do not exist yet.
    async fn init_schema(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS products (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                url TEXT NOT NULL UNIQUE,
                store TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("init_schema", e))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS price_history (
                id TEXT PRIMARY KEY,
                product_id TEXT NOT NULL REFERENCES products(id) ON DELETE CASCADE,
                price REAL NOT NULL,
                observed_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("init_schema", e))?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_price_history_product_observed
                ON price_history (product_id, observed_at)
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("init_schema", e))?;

        Ok(())
    }
}

#[async_trait]
impl CatalogStore for SqliteStore {
    #[instrument(skip(self, draft), fields(url = draft.url()), err)]
    async fn resolve_or_create(&self, draft: NewProduct) -> Result<(Product, bool), StoreError> {
        if let Some(existing) = self.find_by_url(draft.url()).await? {
            // First-write-wins: descriptive fields of the existing row are
            // left untouched even if the scraped name changed.
            return Ok((existing, false));
        }

        let id = ProductId::new();
        let created_at = Utc::now();
        let insert = sqlx::query(
            r#"
            INSERT INTO products (id, name, url, store, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(id.to_string())
        .bind(draft.name())
        .bind(draft.url())
        .bind(draft.store())
        .bind(created_at)
        .execute(&self.pool)
        .await;

        match insert {
            Ok(_) => {
                tracing::info!(product_id = %id, name = draft.name(), "new product detected");
                Ok((Product::new(id, draft, created_at), true))
            }
            Err(e) if is_unique_violation(&e) => {
                // Lost the check-then-create race; the UNIQUE constraint on
                // url is the real guard. Re-read once and return the winner.
                let winner = self.find_by_url(draft.url()).await?.ok_or_else(|| {
                    StoreError::Storage(format!(
                        "product for url {} vanished after unique violation",
                        draft.url()
                    ))
                })?;
                Ok((winner, false))
            }
            Err(e) => Err(map_sqlx_error("insert_product", e)),
        }
    }

    #[instrument(skip(self), err)]
    async fn find_by_url(&self, url: &str) -> Result<Option<Product>, StoreError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r#"
            SELECT id, name, url, store, created_at
            FROM products
            WHERE url = ?1
            "#,
        )
        .bind(url)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_by_url", e))?;

        row.map(Product::try_from).transpose()
    }

    #[instrument(skip(self), err)]
    async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r#"
            SELECT id, name, url, store, created_at
            FROM products
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_products", e))?;

        rows.into_iter().map(Product::try_from).collect()
    }

    #[instrument(skip(self), fields(product_id = %id), err)]
    async fn remove_product(&self, id: ProductId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("remove_product", e))?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl HistoryStore for SqliteStore {
    #[instrument(skip(self), fields(product_id = %product_id, price = %price), err)]
    async fn append(
        &self,
        product_id: ProductId,
        price: Price,
        observed_at: Option<DateTime<Utc>>,
    ) -> Result<PriceObservation, StoreError> {
        let id = ObservationId::new();
        let observed_at = observed_at.unwrap_or_else(Utc::now);

        sqlx::query(
            r#"
            INSERT INTO price_history (id, product_id, price, observed_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(id.to_string())
        .bind(product_id.to_string())
        .bind(price.value())
        .bind(observed_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("append_observation", e))?;

        Ok(PriceObservation::new(id, product_id, price, observed_at))
    }

    #[instrument(skip(self), fields(product_id = %product_id), err)]
    async fn observations_for(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<PriceObservation>, StoreError> {
        let rows = sqlx::query_as::<_, ObservationRow>(
            r#"
            SELECT id, product_id, price, observed_at
            FROM price_history
            WHERE product_id = ?1
            ORDER BY observed_at ASC, id ASC
            "#,
        )
        .bind(product_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("observations_for", e))?;

        rows.into_iter().map(PriceObservation::try_from).collect()
    }
}

#[derive(Debug, FromRow)]
struct ProductRow {
    id: String,
    name: String,
    url: String,
    store: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = StoreError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let id: ProductId = row
            .id
            .parse()
            .map_err(|e| StoreError::Storage(format!("corrupt product row: {e}")))?;
        Ok(Product::from_stored(
            id,
            row.name,
            row.url,
            row.store,
            row.created_at,
        ))
    }
}

#[derive(Debug, FromRow)]
struct ObservationRow {
    id: String,
    product_id: String,
    price: f64,
    observed_at: DateTime<Utc>,
}

impl TryFrom<ObservationRow> for PriceObservation {
    type Error = StoreError;

    fn try_from(row: ObservationRow) -> Result<Self, Self::Error> {
        let id: ObservationId = row
            .id
            .parse()
            .map_err(|e| StoreError::Storage(format!("corrupt observation row: {e}")))?;
        let product_id: ProductId = row
            .product_id
            .parse()
            .map_err(|e| StoreError::Storage(format!("corrupt observation row: {e}")))?;
        let price = Price::new(row.price)
            .map_err(|e| StoreError::Storage(format!("corrupt observation row: {e}")))?;
        Ok(PriceObservation::new(id, product_id, price, row.observed_at))
    }
}

/// Pool sizing for the two storage modes.
///
/// An in-memory database exists per connection: the pool is pinned to one
/// connection that is never reaped (no idle timeout, no max lifetime),
/// otherwise the reaper would drop the sole connection and the database —
/// schema included — with it.
fn pool_options(config: &StoreConfig) -> SqlitePoolOptions {
    let base = SqlitePoolOptions::new().acquire_timeout(config.acquire_timeout);
    match config.path {
        Some(_) => base.max_connections(config.max_connections),
        None => base
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>),
    }
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.is_unique_violation())
}

fn map_sqlx_error(operation: &str, e: sqlx::Error) -> StoreError {
    match &e {
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
            StoreError::Referential(format!("{operation}: {db}"))
        }
        sqlx::Error::PoolTimedOut => {
            StoreError::Storage(format!("{operation}: timed out waiting for a connection"))
        }
        _ => StoreError::Storage(format!("{operation}: {e}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ephemeral_pool_pins_its_single_connection() {
        let options = pool_options(&StoreConfig::ephemeral());
        assert_eq!(options.get_max_connections(), 1);
        assert_eq!(options.get_min_connections(), 1);
        assert_eq!(options.get_idle_timeout(), None);
        assert_eq!(options.get_max_lifetime(), None);
    }

    #[test]
    fn file_pool_honors_configured_limits() {
        let config = StoreConfig::file("data/prices.db")
            .with_max_connections(8)
            .with_acquire_timeout(Duration::from_secs(2));
        let options = pool_options(&config);
        assert_eq!(options.get_max_connections(), 8);
        assert_eq!(options.get_acquire_timeout(), Duration::from_secs(2));
    }
}
