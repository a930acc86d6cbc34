//! Opaque page-fetching seam.

use async_trait::async_trait;
use thiserror::Error;

/// Fetch failure at the navigation collaborator.
///
/// Out of the core's scope beyond the fact that an observation may simply
/// never arrive for a given attempt.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Navigation or rendering failed for the given URL.
    #[error("fetch failed for {url}: {reason}")]
    Failed { url: String, reason: String },

    /// The page did not finish rendering within the collaborator's deadline.
    #[error("fetch timed out for {url}")]
    TimedOut { url: String },
}

/// Produces raw page markup for a product URL.
///
/// Implementations live outside this workspace (headless browser, HTTP
/// client behind a rendering proxy, a fixture loader in tests). The core
/// never calls this directly; a caller composes `fetch` → `extract` →
/// `ingest`.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct FixtureFetcher {
        pages: HashMap<String, String>,
    }

    #[async_trait]
    impl PageFetcher for FixtureFetcher {
        async fn fetch(&self, url: &str) -> Result<String, FetchError> {
            self.pages.get(url).cloned().ok_or_else(|| FetchError::Failed {
                url: url.to_string(),
                reason: "no fixture for url".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn fetch_composes_with_extraction() {
        let fetcher = FixtureFetcher {
            pages: HashMap::from([(
                "http://x/1".to_string(),
                r#"<h1>Widget</h1><meta itemprop="price" content="19.90">"#.to_string(),
            )]),
        };

        let markup = fetcher.fetch("http://x/1").await.unwrap();
        let obs = crate::extract::extract_observation("http://x/1", "S", &markup).unwrap();
        assert_eq!(obs.name, "Widget");
        assert_eq!(obs.price, 19.90);
    }

    #[tokio::test]
    async fn unknown_url_fails_the_fetch() {
        let fetcher = FixtureFetcher {
            pages: HashMap::new(),
        };
        let err = fetcher.fetch("http://x/404").await.unwrap_err();
        match err {
            FetchError::Failed { url, .. } => assert_eq!(url, "http://x/404"),
            other => panic!("expected Failed, got {other:?}"),
        }
    }
}
