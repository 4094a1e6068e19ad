use axum::{extract::Path, extract::State, http::StatusCode, Json};

use crate::models::subscriber::ErrorResponse;
use crate::models::watch::{
    AddWatchRequest, AddWatchResponse, WatchedProductView, WatchedProductsResponse,
};
use crate::services::price_source::PriceSourceError;
use crate::AppState;

fn db_error(e: sea_orm::DbErr) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: format!("Database error: {}", e),
        }),
    )
}

fn fetch_error(e: PriceSourceError) -> (StatusCode, Json<ErrorResponse>) {
    match e {
        PriceSourceError::NotFound => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "Товар не найден в каталоге".to_string(),
            }),
        ),
        other => (
            StatusCode::BAD_GATEWAY,
            Json(ErrorResponse {
                error: format!("Не удалось получить информацию о товаре: {}", other),
            }),
        ),
    }
}

/// The subscriber's watch list with stored price state
pub async fn list_products(
    State(state): State<AppState>,
    Path(subscriber_id): Path<i64>,
) -> Result<Json<WatchedProductsResponse>, (StatusCode, Json<ErrorResponse>)> {
    let settings = state
        .settings
        .resolve(subscriber_id)
        .await
        .map_err(db_error)?;

    let products = state
        .store
        .watched_products(subscriber_id)
        .await
        .map_err(db_error)?
        .into_iter()
        .map(|p| WatchedProductView {
            product_id: p.product_id,
            name: p.product_name,
            initial_price: p.initial_price,
            current_price: p.current_price,
            last_checked_at: p.last_checked_at,
        })
        .collect();

    Ok(Json(WatchedProductsResponse {
        currency: settings.currency.code().to_string(),
        currency_symbol: settings.currency.symbol().to_string(),
        products,
    }))
}

/// Starts watching a product: fetches its current price (in the
/// subscriber's display currency, so the stored baseline is in the same
/// unit the poll cycle compares against) and registers the watch.
pub async fn add_watch(
    State(state): State<AppState>,
    Path(subscriber_id): Path<i64>,
    Json(payload): Json<AddWatchRequest>,
) -> Result<(StatusCode, Json<AddWatchResponse>), (StatusCode, Json<ErrorResponse>)> {
    // First contact through this path creates the subscriber row too
    state
        .store
        .ensure_subscriber(subscriber_id, "Пользователь")
        .await
        .map_err(db_error)?;

    let already = state
        .store
        .watch_exists(subscriber_id, payload.product_id)
        .await
        .map_err(db_error)?;
    if already {
        return Err((
            StatusCode::CONFLICT,
            Json(ErrorResponse {
                error: "Этот товар уже в вашем списке".to_string(),
            }),
        ));
    }

    let settings = state
        .settings
        .resolve(subscriber_id)
        .await
        .map_err(db_error)?;

    let quote = state
        .prices
        .get_or_fetch(payload.product_id, settings.currency)
        .await
        .map_err(fetch_error)?;

    state
        .store
        .add_watch(subscriber_id, payload.product_id, &quote)
        .await
        .map_err(db_error)?;

    tracing::info!(
        "Subscriber {} now watches product {} at {}{}",
        subscriber_id,
        payload.product_id,
        quote.price,
        quote.currency_symbol()
    );

    Ok((
        StatusCode::CREATED,
        Json(AddWatchResponse {
            product_id: payload.product_id,
            name: quote.name.clone(),
            price: quote.price,
            currency: quote.currency.code().to_string(),
            currency_symbol: quote.currency_symbol().to_string(),
        }),
    ))
}

/// Stops watching a product; the product and its price record go away
/// with the last watch.
pub async fn remove_watch(
    State(state): State<AppState>,
    Path((subscriber_id, product_id)): Path<(i64, i64)>,
) -> Result<StatusCode, (StatusCode, Json<ErrorResponse>)> {
    let removed = state
        .store
        .remove_watch(subscriber_id, product_id)
        .await
        .map_err(db_error)?;

    if !removed {
        return Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "Этого товара нет в вашем списке".to_string(),
            }),
        ));
    }

    state.prices.invalidate_product(product_id).await;
    Ok(StatusCode::NO_CONTENT)
}
