use serde::{Deserialize, Serialize};

/// One scraped observation of a product page, as handed to the ingest
/// pipeline.
///
/// This is the only inbound shape the core accepts (spelled out field by
/// field; unknown fields are rejected on deserialization). The `price` is raw
/// here — validation happens at the ingest boundary, not at the collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Observation {
    /// Displayed product name (may be empty; the catalog records a sentinel).
    pub name: String,
    /// Displayed price as scraped, not yet validated.
    pub price: f64,
    /// Canonical product page URL — the catalog identity key.
    pub url: String,
    /// Originating marketplace label.
    pub store: String,
}
