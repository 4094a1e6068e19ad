//! Catalog price API client.
//!
//! Fetches the current price and display name for one product id in one
//! currency. Pure request/response; retry policy belongs to callers (and
//! the poll loop deliberately does not retry fetches at all — the next
//! cycle is the retry).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

use crate::services::currencies::Currency;

pub const REQUEST_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Error)]
pub enum PriceSourceError {
    /// Transient-External: network/timeout/HTTP-level failure
    #[error("price request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// Body arrived but did not parse into the expected shape
    #[error("malformed catalog response: {0}")]
    BadResponse(String),
    /// Catalog answered with an empty product list — not retried
    #[error("product not present in catalog response")]
    NotFound,
}

impl PriceSourceError {
    pub fn is_transient(&self) -> bool {
        matches!(self, PriceSourceError::Request(_))
    }
}

/// Result of a successful price lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceQuote {
    pub name: String,
    /// Integer unit price in `currency` (catalog sends it scaled by 100;
    /// the conversion truncates, it does not round)
    pub price: i64,
    pub currency: Currency,
}

impl PriceQuote {
    pub fn currency_symbol(&self) -> &'static str {
        self.currency.symbol()
    }
}

/// Seam for the external catalog; mocked in tests
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn fetch_price(
        &self,
        product_id: i64,
        currency: Currency,
    ) -> Result<PriceQuote, PriceSourceError>;
}

// Catalog API response structures
#[derive(Debug, Deserialize)]
struct CatalogDetailResponse {
    data: Option<CatalogData>,
}

#[derive(Debug, Deserialize)]
struct CatalogData {
    #[serde(default)]
    products: Vec<CatalogProduct>,
}

#[derive(Debug, Deserialize)]
struct CatalogProduct {
    name: String,
    #[serde(rename = "salePriceU", default)]
    sale_price_u: i64,
}

#[derive(Clone)]
pub struct CatalogApiClient {
    client: Client,
    base_url: String,
}

impl CatalogApiClient {
    pub fn new(base_url: String) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self { client, base_url })
    }
}

#[async_trait]
impl PriceSource for CatalogApiClient {
    async fn fetch_price(
        &self,
        product_id: i64,
        currency: Currency,
    ) -> Result<PriceQuote, PriceSourceError> {
        let url = format!("{}/cards/detail", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[("curr", currency.code()), ("nm", &product_id.to_string())])
            .send()
            .await?
            .error_for_status()?;

        let body: CatalogDetailResponse = response
            .json()
            .await
            .map_err(|e| PriceSourceError::BadResponse(e.to_string()))?;

        let product = body
            .data
            .ok_or(PriceSourceError::NotFound)?
            .products
            .into_iter()
            .next()
            .ok_or(PriceSourceError::NotFound)?;

        Ok(PriceQuote {
            name: product.name,
            price: scale_down(product.sale_price_u),
            currency,
        })
    }
}

/// Catalog prices come scaled by 100; truncate to whole units
fn scale_down(scaled: i64) -> i64 {
    scaled / 100
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scaling_truncates_instead_of_rounding() {
        assert_eq!(scale_down(1099_99), 1099);
        assert_eq!(scale_down(1099_01), 1099);
        assert_eq!(scale_down(99), 0);
        assert_eq!(scale_down(0), 0);
    }

    #[test]
    fn detail_response_parses_catalog_shape() {
        let raw = r#"{"data":{"products":[{"name":"Чайник","salePriceU":259900}]}}"#;
        let parsed: CatalogDetailResponse = serde_json::from_str(raw).unwrap();
        let product = &parsed.data.unwrap().products[0];
        assert_eq!(product.name, "Чайник");
        assert_eq!(scale_down(product.sale_price_u), 2599);
    }

    #[test]
    fn empty_product_list_parses_as_empty() {
        let raw = r#"{"data":{"products":[]}}"#;
        let parsed: CatalogDetailResponse = serde_json::from_str(raw).unwrap();
        assert!(parsed.data.unwrap().products.is_empty());
    }

    #[test]
    fn transient_classification() {
        assert!(!PriceSourceError::NotFound.is_transient());
        assert!(!PriceSourceError::BadResponse("truncated".into()).is_transient());
    }
}
