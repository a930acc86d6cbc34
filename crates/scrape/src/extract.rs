//! Field extraction: locate name and price inside fetched markup.
//!
//! One marketplace page layout is supported: the product title is the first
//! `<h1>`, the price the `<meta itemprop="price" content="…">` tag (the
//! stable source on the marketplace's product pages). Multi-store extraction
//! rules are out of scope.

use scraper::{Html, Selector};
use thiserror::Error;

use crate::observation::Observation;

/// Extraction failure: the markup did not yield a usable observation.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// No price tag present in the markup.
    #[error("price not found in page markup")]
    PriceNotFound,

    /// A price tag was present but its content is not a number.
    #[error("price is not a number: {0:?}")]
    PriceNotNumeric(String),

    /// A selector failed to compile (programming error in the rules).
    #[error("invalid selector: {0}")]
    Selector(String),
}

fn selector(rule: &str) -> Result<Selector, ExtractError> {
    Selector::parse(rule).map_err(|e| ExtractError::Selector(e.to_string()))
}

/// Extract a normalized [`Observation`] from product page markup.
///
/// The title falls back to an empty string when no `<h1>` exists — the
/// catalog records its sentinel for that case. A missing or non-numeric
/// price fails: without a price there is nothing to observe.
pub fn extract_observation(
    url: &str,
    store: &str,
    markup: &str,
) -> Result<Observation, ExtractError> {
    let document = Html::parse_document(markup);

    let title_rule = selector("h1")?;
    let name = document
        .select(&title_rule)
        .next()
        .map(|h1| h1.text().collect::<String>().trim().to_string())
        .unwrap_or_default();

    let price_rule = selector(r#"meta[itemprop="price"]"#)?;
    let raw_price = document
        .select(&price_rule)
        .next()
        .and_then(|meta| meta.value().attr("content"))
        .ok_or(ExtractError::PriceNotFound)?;

    let price: f64 = raw_price
        .trim()
        .parse()
        .map_err(|_| ExtractError::PriceNotNumeric(raw_price.to_string()))?;

    Ok(Observation {
        name,
        price,
        url: url.to_string(),
        store: store.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
            <h1> Kit Controle Analógico </h1>
            <meta itemprop="price" content="59.90">
        </body></html>
    "#;

    #[test]
    fn extracts_title_and_price() {
        let obs = extract_observation("http://x/1", "MarketplaceX", PAGE).unwrap();
        assert_eq!(obs.name, "Kit Controle Analógico");
        assert_eq!(obs.price, 59.90);
        assert_eq!(obs.url, "http://x/1");
        assert_eq!(obs.store, "MarketplaceX");
    }

    #[test]
    fn missing_title_yields_empty_name() {
        let page = r#"<html><body><meta itemprop="price" content="10.0"></body></html>"#;
        let obs = extract_observation("http://x/1", "S", page).unwrap();
        assert_eq!(obs.name, "");
        assert_eq!(obs.price, 10.0);
    }

    #[test]
    fn missing_price_fails() {
        let page = "<html><body><h1>Widget</h1></body></html>";
        let err = extract_observation("http://x/1", "S", page).unwrap_err();
        match err {
            ExtractError::PriceNotFound => {}
            other => panic!("expected PriceNotFound, got {other:?}"),
        }
    }

    #[test]
    fn non_numeric_price_fails() {
        let page = r#"<html><body><meta itemprop="price" content="R$ 19,90"></body></html>"#;
        let err = extract_observation("http://x/1", "S", page).unwrap_err();
        match err {
            ExtractError::PriceNotNumeric(raw) => assert_eq!(raw, "R$ 19,90"),
            other => panic!("expected PriceNotNumeric, got {other:?}"),
        }
    }
}
