mod common;

use std::time::Duration;

use sea_orm::{EntityTrait, PaginatorTrait};

use pricewatch_backend::entities::prelude::*;
use pricewatch_backend::services::currencies::Currency;
use pricewatch_backend::services::price_source::PriceQuote;
use pricewatch_backend::services::retry::RetryPolicy;
use pricewatch_backend::services::store::Store;

use crate::common::setup_test_db;

fn quote(name: &str, price: i64) -> PriceQuote {
    PriceQuote {
        name: name.to_string(),
        price,
        currency: Currency::Rub,
    }
}

async fn store(db: &sea_orm::DatabaseConnection) -> Store {
    Store::new(db.clone(), RetryPolicy::new(3, Duration::ZERO))
}

#[tokio::test]
async fn add_watch_creates_product_watch_and_record() {
    let db = setup_test_db().await;
    let store = store(&db).await;

    assert!(store.ensure_subscriber(1, "rita").await.unwrap());
    assert!(!store.ensure_subscriber(1, "rita").await.unwrap());

    store.add_watch(1, 500, &quote("Чайник", 2599)).await.unwrap();

    let product = Products::find_by_id(500).one(&db).await.unwrap().unwrap();
    assert_eq!(product.name, "Чайник");

    let record = PriceRecords::find_by_id(500).one(&db).await.unwrap().unwrap();
    assert_eq!(record.initial_price, 2599);
    assert_eq!(record.current_price, 2599);

    assert!(store.watch_exists(1, 500).await.unwrap());
    assert_eq!(store.watch_count(1).await.unwrap(), 1);
}

#[tokio::test]
async fn second_watcher_keeps_the_existing_baseline() {
    let db = setup_test_db().await;
    let store = store(&db).await;

    store.ensure_subscriber(1, "rita").await.unwrap();
    store.ensure_subscriber(2, "kira").await.unwrap();

    store.add_watch(1, 500, &quote("Чайник", 2599)).await.unwrap();
    // The price moved before the second subscriber showed up
    store.add_watch(2, 500, &quote("Чайник", 2400)).await.unwrap();

    let record = PriceRecords::find_by_id(500).one(&db).await.unwrap().unwrap();
    // Baseline is frozen from the first sighting, observation moves
    assert_eq!(record.initial_price, 2599);
    assert_eq!(record.current_price, 2400);

    // Name frozen too
    let product = Products::find_by_id(500).one(&db).await.unwrap().unwrap();
    assert_eq!(product.name, "Чайник");
}

#[tokio::test]
async fn removing_the_last_watch_collects_the_product() {
    let db = setup_test_db().await;
    let store = store(&db).await;

    store.ensure_subscriber(1, "rita").await.unwrap();
    store.ensure_subscriber(2, "kira").await.unwrap();
    store.add_watch(1, 500, &quote("Чайник", 2599)).await.unwrap();
    store.add_watch(2, 500, &quote("Чайник", 2599)).await.unwrap();

    // First removal leaves the product for the other watcher
    assert!(store.remove_watch(1, 500).await.unwrap());
    assert!(Products::find_by_id(500).one(&db).await.unwrap().is_some());

    // Last removal takes the product and its price record with it
    assert!(store.remove_watch(2, 500).await.unwrap());
    assert!(Products::find_by_id(500).one(&db).await.unwrap().is_none());
    assert!(PriceRecords::find_by_id(500).one(&db).await.unwrap().is_none());

    // Removing a watch that is not there reports false
    assert!(!store.remove_watch(1, 500).await.unwrap());
}

#[tokio::test]
async fn deleting_a_subscriber_sweeps_their_exclusive_products() {
    let db = setup_test_db().await;
    let store = store(&db).await;

    store.ensure_subscriber(1, "rita").await.unwrap();
    store.ensure_subscriber(2, "kira").await.unwrap();
    store.add_watch(1, 500, &quote("Чайник", 2599)).await.unwrap();
    store.add_watch(1, 501, &quote("Лампа", 900)).await.unwrap();
    store.add_watch(2, 500, &quote("Чайник", 2599)).await.unwrap();

    store.delete_subscriber(1).await.unwrap();

    assert!(Subscribers::find_by_id(1).one(&db).await.unwrap().is_none());
    // Shared product survives, exclusive one is swept with its record
    assert!(Products::find_by_id(500).one(&db).await.unwrap().is_some());
    assert!(Products::find_by_id(501).one(&db).await.unwrap().is_none());
    assert!(PriceRecords::find_by_id(501).one(&db).await.unwrap().is_none());

    // No orphaned price records anywhere
    assert_eq!(PriceRecords::find().count(&db).await.unwrap(), 1);
    // And no leftover watches for the deleted subscriber
    assert_eq!(store.watch_count(1).await.unwrap(), 0);
}

#[tokio::test]
async fn watch_pair_join_covers_every_watcher() {
    let db = setup_test_db().await;
    let store = store(&db).await;

    store.ensure_subscriber(1, "rita").await.unwrap();
    store.ensure_subscriber(2, "kira").await.unwrap();
    store.add_watch(1, 500, &quote("Чайник", 2599)).await.unwrap();
    store.add_watch(2, 500, &quote("Чайник", 2599)).await.unwrap();
    store.add_watch(2, 501, &quote("Лампа", 900)).await.unwrap();

    let mut pairs = store.load_watch_pairs().await.unwrap();
    pairs.sort_by_key(|p| (p.subscriber_id, p.product_id));

    assert_eq!(pairs.len(), 3);
    assert_eq!(
        pairs
            .iter()
            .map(|p| (p.subscriber_id, p.product_id))
            .collect::<Vec<_>>(),
        vec![(1, 500), (2, 500), (2, 501)]
    );
    assert_eq!(pairs[2].product_name, "Лампа");
    assert_eq!(pairs[2].initial_price, 900);
}
