use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pricetrail_core::{DomainError, DomainResult, Entity, ObservationId, ProductId, ValueObject};

/// A validated price: finite and strictly positive.
///
/// Currency is implicit (single currency per deployment). Construction is the
/// validation boundary — a `Price` in hand is always a usable number, so the
/// store layer never re-checks it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(f64);

impl Price {
    pub fn new(value: f64) -> DomainResult<Self> {
        if !value.is_finite() {
            return Err(DomainError::validation(format!(
                "price must be a finite number, got {value}"
            )));
        }
        if value <= 0.0 {
            return Err(DomainError::validation(format!(
                "price must be positive, got {value}"
            )));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl ValueObject for Price {}

impl core::fmt::Display for Price {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

/// One immutable snapshot of a product's price.
///
/// Owned by exactly one catalog product via `product_id`; deleting the product
/// deletes its observations (cascading ownership, enforced at the store).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceObservation {
    id: ObservationId,
    product_id: ProductId,
    price: Price,
    observed_at: DateTime<Utc>,
}

impl PriceObservation {
    /// Materialize an observation record, normally called by a store
    /// implementation during append or row mapping.
    pub fn new(
        id: ObservationId,
        product_id: ProductId,
        price: Price,
        observed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            product_id,
            price,
            observed_at,
        }
    }

    pub fn id_typed(&self) -> ObservationId {
        self.id
    }

    /// The owning catalog product.
    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    pub fn price(&self) -> Price {
        self.price
    }

    pub fn observed_at(&self) -> DateTime<Utc> {
        self.observed_at
    }
}

impl Entity for PriceObservation {
    type Id = ObservationId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_accepts_positive_finite_values() {
        assert_eq!(Price::new(19.90).unwrap().value(), 19.90);
        assert_eq!(Price::new(0.01).unwrap().value(), 0.01);
    }

    #[test]
    fn price_rejects_zero_and_negative() {
        for bad in [0.0, -0.0, -1.0, -19.90] {
            let err = Price::new(bad).unwrap_err();
            match err {
                DomainError::Validation(_) => {}
                other => panic!("expected Validation error for {bad}, got {other:?}"),
            }
        }
    }

    #[test]
    fn price_rejects_nan_and_infinities() {
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert!(Price::new(bad).is_err(), "expected rejection of {bad}");
        }
    }

    #[test]
    fn display_renders_two_decimals() {
        assert_eq!(Price::new(19.9).unwrap().to_string(), "19.90");
    }

    #[test]
    fn observation_carries_its_owning_product() {
        let product_id = ProductId::new();
        let obs = PriceObservation::new(
            ObservationId::new(),
            product_id,
            Price::new(17.50).unwrap(),
            Utc::now(),
        );
        assert_eq!(obs.product_id(), product_id);
        assert_eq!(obs.price().value(), 17.50);
    }

    #[cfg(test)]
    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: construction succeeds exactly for finite positive values.
            #[test]
            fn price_validation_boundary(value in proptest::num::f64::ANY) {
                let result = Price::new(value);
                if value.is_finite() && value > 0.0 {
                    prop_assert_eq!(result.unwrap().value(), value);
                } else {
                    prop_assert!(result.is_err());
                }
            }
        }
    }
}
