//! `pricetrail-catalog` — the durable catalog of tracked products.
//!
//! A [`Product`] is keyed by its canonical page URL: the URL is the sole
//! identity, the id is a storage-level handle. Descriptive fields (`name`,
//! `store`) are first-write-wins; only identity and price history are
//! authoritative over time.

pub mod product;

pub use product::{NewProduct, Product, UNKNOWN_NAME};
