//! Short-lived price memoization over the catalog client.
//!
//! Keyed by (product id, currency) with a 300s TTL so a poll cycle and the
//! on-demand lookup paths share fetches instead of hammering the catalog.
//! Fetch failures are never cached.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;

use crate::services::currencies::Currency;
use crate::services::price_source::{PriceQuote, PriceSource, PriceSourceError};

const PRICE_TTL_SECS: u64 = 300;

#[derive(Clone)]
pub struct PriceCache {
    source: Arc<dyn PriceSource>,
    cache: Cache<(i64, Currency), PriceQuote>,
}

impl PriceCache {
    pub fn new(source: Arc<dyn PriceSource>) -> Self {
        let cache = Cache::builder()
            .max_capacity(10_000)
            .time_to_live(Duration::from_secs(PRICE_TTL_SECS))
            .build();

        Self { source, cache }
    }

    /// Cached lookup; falls through to the catalog on miss or expiry.
    pub async fn get_or_fetch(
        &self,
        product_id: i64,
        currency: Currency,
    ) -> Result<PriceQuote, PriceSourceError> {
        let key = (product_id, currency);

        if let Some(quote) = self.cache.get(&key).await {
            tracing::debug!("Price cache hit for product {} ({})", product_id, currency.code());
            return Ok(quote);
        }

        let quote = self.source.fetch_price(product_id, currency).await?;
        self.cache.insert(key, quote.clone()).await;
        Ok(quote)
    }

    /// Drops every cached entry for a product, across all currencies.
    /// Used when the product leaves the watch set.
    pub async fn invalidate_product(&self, product_id: i64) {
        for currency in Currency::ALL {
            self.cache.invalidate(&(product_id, currency)).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct CountingSource {
        calls: AtomicU32,
        fail: bool,
    }

    #[async_trait]
    impl PriceSource for CountingSource {
        async fn fetch_price(
            &self,
            product_id: i64,
            currency: Currency,
        ) -> Result<PriceQuote, PriceSourceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(PriceSourceError::NotFound);
            }
            Ok(PriceQuote {
                name: format!("product-{}", product_id),
                price: 2599,
                currency,
            })
        }
    }

    #[tokio::test]
    async fn second_lookup_within_ttl_skips_the_source() {
        let source = Arc::new(CountingSource {
            calls: AtomicU32::new(0),
            fail: false,
        });
        let cache = PriceCache::new(source.clone());

        let first = cache.get_or_fetch(42, Currency::Rub).await.unwrap();
        let second = cache.get_or_fetch(42, Currency::Rub).await.unwrap();

        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn distinct_currencies_are_distinct_entries() {
        let source = Arc::new(CountingSource {
            calls: AtomicU32::new(0),
            fail: false,
        });
        let cache = PriceCache::new(source.clone());

        cache.get_or_fetch(42, Currency::Rub).await.unwrap();
        cache.get_or_fetch(42, Currency::Kzt).await.unwrap();

        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn failures_are_not_cached() {
        let source = Arc::new(CountingSource {
            calls: AtomicU32::new(0),
            fail: true,
        });
        let cache = PriceCache::new(source.clone());

        assert!(cache.get_or_fetch(42, Currency::Rub).await.is_err());
        assert!(cache.get_or_fetch(42, Currency::Rub).await.is_err());

        // Both lookups reached the source
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn invalidate_product_forces_refetch() {
        let source = Arc::new(CountingSource {
            calls: AtomicU32::new(0),
            fail: false,
        });
        let cache = PriceCache::new(source.clone());

        cache.get_or_fetch(42, Currency::Rub).await.unwrap();
        cache.invalidate_product(42).await;
        cache.get_or_fetch(42, Currency::Rub).await.unwrap();

        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }
}
