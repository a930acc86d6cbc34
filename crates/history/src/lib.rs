//! `pricetrail-history` — append-only price history records.
//!
//! A [`PriceObservation`] is a snapshot of a product's displayed price at one
//! moment. History is append-only: observations are created once, never
//! updated or deleted by normal operation, and each belongs to exactly one
//! catalog product (by `product_id`, no back-references).

pub mod observation;

pub use observation::{Price, PriceObservation};
