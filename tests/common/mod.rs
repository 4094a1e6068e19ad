//! Shared setup for the integration tests: an in-memory SQLite database
//! with the real migrations applied, plus mock collaborators for the
//! catalog and the notification transport.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, Set};
use sea_orm_migration::MigratorTrait;

use pricewatch_backend::entities::{price_records, products, subscribers, watches};
use pricewatch_backend::services::currencies::Currency;
use pricewatch_backend::services::notifier::{NotificationTransport, TransportError};
use pricewatch_backend::services::price_source::{PriceQuote, PriceSource, PriceSourceError};

/// In-memory SQLite; a single pooled connection, otherwise every pool
/// checkout would see its own empty database.
pub async fn setup_test_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1);
    let db = Database::connect(options)
        .await
        .expect("Failed to open in-memory database");
    migration::Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");
    db
}

#[allow(dead_code)]
pub async fn seed_subscriber(db: &DatabaseConnection, id: i64, threshold: i32, direction: &str) {
    subscribers::ActiveModel {
        id: Set(id),
        name: Set(format!("subscriber-{}", id)),
        currency: Set(Some("rub".to_string())),
        direction: Set(Some(direction.to_string())),
        threshold_percent: Set(Some(threshold)),
    }
    .insert(db)
    .await
    .expect("Failed to seed subscriber");
}

#[allow(dead_code)]
pub async fn seed_product(db: &DatabaseConnection, id: i64, initial_price: i64) {
    products::ActiveModel {
        id: Set(id),
        name: Set(format!("product-{}", id)),
    }
    .insert(db)
    .await
    .expect("Failed to seed product");

    price_records::ActiveModel {
        product_id: Set(id),
        initial_price: Set(initial_price),
        current_price: Set(initial_price),
        last_checked_at: Set(chrono::Utc::now().naive_utc()),
    }
    .insert(db)
    .await
    .expect("Failed to seed price record");
}

#[allow(dead_code)]
pub async fn seed_watch(db: &DatabaseConnection, subscriber_id: i64, product_id: i64) {
    watches::ActiveModel {
        product_id: Set(product_id),
        subscriber_id: Set(subscriber_id),
    }
    .insert(db)
    .await
    .expect("Failed to seed watch");
}

/// Catalog stand-in with per-product prices and injectable failures
#[allow(dead_code)]
pub struct MockPriceSource {
    prices: Mutex<HashMap<i64, i64>>,
    failing: Mutex<HashSet<i64>>,
    pub calls: AtomicU32,
}

#[allow(dead_code)]
impl MockPriceSource {
    pub fn new() -> Self {
        Self {
            prices: Mutex::new(HashMap::new()),
            failing: Mutex::new(HashSet::new()),
            calls: AtomicU32::new(0),
        }
    }

    pub fn set_price(&self, product_id: i64, price: i64) {
        self.prices.lock().unwrap().insert(product_id, price);
    }

    pub fn fail_for(&self, product_id: i64) {
        self.failing.lock().unwrap().insert(product_id);
    }

    pub fn call_count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PriceSource for MockPriceSource {
    async fn fetch_price(
        &self,
        product_id: i64,
        currency: Currency,
    ) -> Result<PriceQuote, PriceSourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.failing.lock().unwrap().contains(&product_id) {
            return Err(PriceSourceError::BadResponse("mock failure".to_string()));
        }

        let price = self
            .prices
            .lock()
            .unwrap()
            .get(&product_id)
            .copied()
            .ok_or(PriceSourceError::NotFound)?;

        Ok(PriceQuote {
            name: format!("product-{}", product_id),
            price,
            currency,
        })
    }
}

/// Transport stand-in that records deliveries and can be told to fail
#[allow(dead_code)]
pub struct RecordingTransport {
    pub sent: Mutex<Vec<(i64, String)>>,
    fail_all: Mutex<bool>,
}

#[allow(dead_code)]
impl RecordingTransport {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail_all: Mutex::new(false),
        }
    }

    pub fn fail_all(&self) {
        *self.fail_all.lock().unwrap() = true;
    }

    pub fn sent_messages(&self) -> Vec<(i64, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationTransport for RecordingTransport {
    async fn send_message(&self, subscriber_id: i64, text: &str) -> Result<(), TransportError> {
        if *self.fail_all.lock().unwrap() {
            return Err(TransportError::Rejected("mock outage".to_string()));
        }
        self.sent
            .lock()
            .unwrap()
            .push((subscriber_id, text.to_string()));
        Ok(())
    }

    async fn edit_message(
        &self,
        _subscriber_id: i64,
        _message_id: i64,
        _text: &str,
    ) -> Result<(), TransportError> {
        Ok(())
    }
}
