// src/lib.rs

use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::services::price_cache::PriceCache;
use crate::services::settings::SettingsResolver;
use crate::services::store::Store;
use crate::services::write_queue::WriteQueue;

#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub prices: PriceCache,
    pub settings: SettingsResolver,
    pub writes: WriteQueue,
}

pub mod entities {
    pub mod prelude;
    pub mod price_records;
    pub mod products;
    pub mod subscribers;
    pub mod watches;
}

pub mod services {
    pub mod change_detector;
    pub mod currencies;
    pub mod notifier;
    pub mod price_cache;
    pub mod price_source;
    pub mod retry;
    pub mod settings;
    pub mod store;
    pub mod write_queue;
}

pub mod handlers;
pub mod jobs;
pub mod models;

/// API surface; shared between main and the integration tests.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/subscribers", post(handlers::subscriber::register))
        .route(
            "/subscribers/{id}",
            delete(handlers::subscriber::delete_subscriber),
        )
        .route(
            "/subscribers/{id}/products",
            get(handlers::watch::list_products),
        )
        .route("/subscribers/{id}/watches", post(handlers::watch::add_watch))
        .route(
            "/subscribers/{id}/watches/{product_id}",
            delete(handlers::watch::remove_watch),
        )
        .route(
            "/subscribers/{id}/settings",
            get(handlers::settings::get_settings),
        )
        .route(
            "/subscribers/{id}/settings/threshold",
            put(handlers::settings::set_threshold),
        )
        .route(
            "/subscribers/{id}/settings/direction",
            put(handlers::settings::set_direction),
        )
        .route(
            "/subscribers/{id}/settings/currency",
            put(handlers::settings::set_currency),
        )
        .route("/products/{id}/price", get(handlers::price::check_price))
        .with_state(state)
}

async fn health() -> &'static str {
    "Pricewatch backend is running"
}
