//! `pricetrail-scrape` — the boundary to the page-scraping collaborators.
//!
//! The persistence core consumes one [`Observation`] per ingest call; this
//! crate owns that record plus the two collaborator seams that produce it:
//!
//! - [`PageFetcher`] — opaque navigation (`fetch(url) -> markup`). No
//!   implementation ships here; a headless-browser driver lives outside this
//!   workspace.
//! - [`extract_observation`] — locate name and price in already-fetched
//!   markup for the single supported marketplace page layout.

pub mod extract;
pub mod fetch;
pub mod observation;

pub use extract::{extract_observation, ExtractError};
pub use fetch::{FetchError, PageFetcher};
pub use observation::Observation;
