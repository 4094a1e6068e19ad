use std::env;
use std::sync::Arc;
use std::time::Duration;

use sea_orm::Database;
use sea_orm_migration::MigratorTrait;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pricewatch_backend::jobs::price_check_sync::{
    start_price_check_job, PriceCheckDeps, CHECK_INTERVAL_SECS, ERROR_COOLDOWN_SECS,
};
use pricewatch_backend::services::notifier::{NotificationDispatcher, PushGatewayClient};
use pricewatch_backend::services::price_cache::PriceCache;
use pricewatch_backend::services::price_source::CatalogApiClient;
use pricewatch_backend::services::retry::RetryPolicy;
use pricewatch_backend::services::settings::SettingsResolver;
use pricewatch_backend::services::store::Store;
use pricewatch_backend::services::write_queue::{WriteQueue, WRITE_PACING};
use pricewatch_backend::{build_router, AppState};

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,pricewatch_backend=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    // Connect to database
    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    tracing::info!("Connecting to database...");
    let db = Database::connect(&database_url)
        .await
        .expect("Failed to connect to database");

    // Run migrations
    tracing::info!("Running migrations...");
    migration::Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    // External collaborators
    let catalog_url = env_or("CATALOG_API_URL", "https://card.catalog.example/api/v1");
    let gateway_url = env_or("PUSH_GATEWAY_URL", "http://localhost:8081");
    let catalog =
        Arc::new(CatalogApiClient::new(catalog_url).expect("Failed to build catalog client"));
    let gateway =
        Arc::new(PushGatewayClient::new(gateway_url).expect("Failed to build push gateway client"));

    // Core services
    let retry = RetryPolicy::standard();
    let store = Store::new(db.clone(), retry);
    let prices = PriceCache::new(catalog);
    let settings = SettingsResolver::new(db.clone(), retry);
    let dispatcher = NotificationDispatcher::new(gateway, retry);
    let (writes, _writer) = WriteQueue::spawn(db.clone(), WRITE_PACING);

    // Background price polling
    let interval_secs = env_or("PRICE_CHECK_INTERVAL_SECS", &CHECK_INTERVAL_SECS.to_string())
        .parse::<u64>()
        .expect("PRICE_CHECK_INTERVAL_SECS must be a number");
    start_price_check_job(
        PriceCheckDeps {
            store: store.clone(),
            prices: prices.clone(),
            settings: settings.clone(),
            writes: writes.clone(),
            dispatcher,
        },
        Duration::from_secs(interval_secs),
        Duration::from_secs(ERROR_COOLDOWN_SECS),
    );

    let state = AppState {
        store,
        prices,
        settings,
        writes,
    };

    // Build router
    let app = build_router(state).layer(TraceLayer::new_for_http());

    // Start server
    let bind_addr = env_or("BIND_ADDR", "0.0.0.0:3000");
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .expect("Failed to bind listener");

    tracing::info!("Server listening on {}", bind_addr);

    axum::serve(listener, app).await.expect("Server error");
}
