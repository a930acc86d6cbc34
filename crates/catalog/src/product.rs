use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pricetrail_core::{DomainError, DomainResult, Entity, ProductId};

/// Sentinel display name recorded when a page carried no usable title.
pub const UNKNOWN_NAME: &str = "unknown";

/// A tracked product in the catalog.
///
/// Plain record, no back-references: the price history of a product is reached
/// through an explicit store query by `product_id`, never by object traversal.
///
/// Invariants:
/// - `url` is unique across all products and immutable after creation.
/// - `id` and `created_at` are assigned once, at creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    id: ProductId,
    name: String,
    url: String,
    store: String,
    created_at: DateTime<Utc>,
}

impl Product {
    /// Materialize a product record, normally called by a store implementation
    /// at creation or when mapping a stored row.
    pub fn new(
        id: ProductId,
        draft: NewProduct,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name: draft.name,
            url: draft.url,
            store: draft.store,
            created_at,
        }
    }

    /// Rebuild a product from already-persisted fields (store row mapping).
    pub fn from_stored(
        id: ProductId,
        name: String,
        url: String,
        store: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            url,
            store,
            created_at,
        }
    }

    pub fn id_typed(&self) -> ProductId {
        self.id
    }

    /// Last-known display name (first-write-wins; see crate docs).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Canonical identity key.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Originating marketplace label (free-form, e.g. "MarketplaceX").
    pub fn store(&self) -> &str {
        &self.store
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Validated draft of a product, ready for `resolve_or_create`.
///
/// Construction normalizes the fields: the URL must be non-empty (it is the
/// identity key), a missing name is recorded as [`UNKNOWN_NAME`] rather than
/// failing, and all fields are trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    name: String,
    url: String,
    store: String,
}

impl NewProduct {
    pub fn new(
        url: impl Into<String>,
        name: impl Into<String>,
        store: impl Into<String>,
    ) -> DomainResult<Self> {
        let url = url.into().trim().to_string();
        if url.is_empty() {
            return Err(DomainError::validation("product url must not be empty"));
        }

        let name = name.into().trim().to_string();
        let name = if name.is_empty() {
            UNKNOWN_NAME.to_string()
        } else {
            name
        };

        Ok(Self {
            name,
            url,
            store: store.into().trim().to_string(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn store(&self) -> &str {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_rejects_empty_url() {
        let err = NewProduct::new("", "Widget", "MarketplaceX").unwrap_err();
        match err {
            DomainError::Validation(_) => {}
            other => panic!("expected Validation error, got {other:?}"),
        }
    }

    #[test]
    fn draft_rejects_whitespace_only_url() {
        let err = NewProduct::new("   ", "Widget", "MarketplaceX").unwrap_err();
        match err {
            DomainError::Validation(_) => {}
            other => panic!("expected Validation error, got {other:?}"),
        }
    }

    #[test]
    fn missing_name_becomes_sentinel() {
        let draft = NewProduct::new("http://x/1", "", "MarketplaceX").unwrap();
        assert_eq!(draft.name(), UNKNOWN_NAME);

        let draft = NewProduct::new("http://x/1", "   ", "MarketplaceX").unwrap();
        assert_eq!(draft.name(), UNKNOWN_NAME);
    }

    #[test]
    fn fields_are_trimmed() {
        let draft = NewProduct::new(" http://x/1 ", " Widget ", " S ").unwrap();
        assert_eq!(draft.url(), "http://x/1");
        assert_eq!(draft.name(), "Widget");
        assert_eq!(draft.store(), "S");
    }

    #[test]
    fn product_exposes_draft_fields_unchanged() {
        let draft = NewProduct::new("http://x/1", "Widget", "S").unwrap();
        let id = ProductId::new();
        let created_at = Utc::now();
        let product = Product::new(id, draft, created_at);

        assert_eq!(*product.id(), id);
        assert_eq!(product.name(), "Widget");
        assert_eq!(product.url(), "http://x/1");
        assert_eq!(product.store(), "S");
        assert_eq!(product.created_at(), created_at);
    }

    #[cfg(test)]
    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: any draft that validates has a non-empty url and a
            /// non-empty name (the sentinel fills the gap).
            #[test]
            fn valid_drafts_never_have_empty_identity_or_name(
                url in "\\PC*",
                name in "\\PC*",
                store in "\\PC*"
            ) {
                if let Ok(draft) = NewProduct::new(url, name, store) {
                    prop_assert!(!draft.url().is_empty());
                    prop_assert!(!draft.name().is_empty());
                    prop_assert_eq!(draft.url(), draft.url().trim());
                }
            }

            /// Property: validation is deterministic.
            #[test]
            fn validation_is_deterministic(
                url in "\\PC*",
                name in "\\PC*",
                store in "\\PC*"
            ) {
                let first = NewProduct::new(url.clone(), name.clone(), store.clone());
                let second = NewProduct::new(url, name, store);
                prop_assert_eq!(first, second);
            }
        }
    }
}
