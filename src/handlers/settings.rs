use axum::{extract::Path, extract::State, http::StatusCode, Json};

use crate::models::settings::{
    CurrencyUpdateRequest, DirectionUpdateRequest, SettingsView, ThresholdUpdateRequest,
};
use crate::models::subscriber::ErrorResponse;
use crate::services::currencies::Currency;
use crate::services::settings::{NotifyDirection, THRESHOLD_MAX, THRESHOLD_MIN};
use crate::services::write_queue::WriteOp;
use crate::AppState;

fn db_error(e: sea_orm::DbErr) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: format!("Database error: {}", e),
        }),
    )
}

fn policy_reject(message: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
}

fn unknown_subscriber() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: "Подписчик не зарегистрирован".to_string(),
        }),
    )
}

/// Settings writes require an existing subscribers row: the queued
/// `update_many` matches nothing otherwise, and the cache must never end
/// up holding a value the database does not.
async fn require_subscriber(
    state: &AppState,
    subscriber_id: i64,
) -> Result<(), (StatusCode, Json<ErrorResponse>)> {
    let exists = state
        .store
        .subscriber_exists(subscriber_id)
        .await
        .map_err(db_error)?;
    if exists {
        Ok(())
    } else {
        Err(unknown_subscriber())
    }
}

pub async fn get_settings(
    State(state): State<AppState>,
    Path(subscriber_id): Path<i64>,
) -> Result<Json<SettingsView>, (StatusCode, Json<ErrorResponse>)> {
    let settings = state
        .settings
        .resolve(subscriber_id)
        .await
        .map_err(db_error)?;
    Ok(Json(settings.into()))
}

pub async fn set_threshold(
    State(state): State<AppState>,
    Path(subscriber_id): Path<i64>,
    Json(payload): Json<ThresholdUpdateRequest>,
) -> Result<Json<SettingsView>, (StatusCode, Json<ErrorResponse>)> {
    if !(THRESHOLD_MIN..=THRESHOLD_MAX).contains(&payload.percent) {
        return Err(policy_reject("Порог должен быть от 1 до 50%"));
    }
    require_subscriber(&state, subscriber_id).await?;

    let mut settings = state
        .settings
        .resolve(subscriber_id)
        .await
        .map_err(db_error)?;
    settings.threshold_percent = payload.percent;

    // Queued write plus write-through cache update in the same step, so
    // the next cycle already sees the new threshold
    state.writes.enqueue(WriteOp::SetThreshold {
        subscriber_id,
        percent: payload.percent,
    });
    state.settings.store(subscriber_id, settings).await;

    Ok(Json(settings.into()))
}

pub async fn set_direction(
    State(state): State<AppState>,
    Path(subscriber_id): Path<i64>,
    Json(payload): Json<DirectionUpdateRequest>,
) -> Result<Json<SettingsView>, (StatusCode, Json<ErrorResponse>)> {
    let Some(direction) = NotifyDirection::from_str(&payload.direction) else {
        return Err(policy_reject(
            "Тип уведомлений должен быть any, increase или decrease",
        ));
    };
    require_subscriber(&state, subscriber_id).await?;

    let mut settings = state
        .settings
        .resolve(subscriber_id)
        .await
        .map_err(db_error)?;
    settings.direction = direction;

    state.writes.enqueue(WriteOp::SetDirection {
        subscriber_id,
        direction,
    });
    state.settings.store(subscriber_id, settings).await;

    Ok(Json(settings.into()))
}

/// Switching display currency also restarts every price record: the
/// stored prices are denominated in the old currency, so each watched
/// product is re-fetched in the new one and its baseline reset.
pub async fn set_currency(
    State(state): State<AppState>,
    Path(subscriber_id): Path<i64>,
    Json(payload): Json<CurrencyUpdateRequest>,
) -> Result<Json<SettingsView>, (StatusCode, Json<ErrorResponse>)> {
    let Some(currency) = Currency::from_code(&payload.currency) else {
        return Err(policy_reject("Неизвестная валюта"));
    };
    require_subscriber(&state, subscriber_id).await?;

    let mut settings = state
        .settings
        .resolve(subscriber_id)
        .await
        .map_err(db_error)?;
    settings.currency = currency;

    state.writes.enqueue(WriteOp::SetCurrency {
        subscriber_id,
        currency,
    });
    state.settings.store(subscriber_id, settings).await;

    let products = state
        .store
        .watched_products(subscriber_id)
        .await
        .map_err(db_error)?;

    for product in products {
        match state.prices.get_or_fetch(product.product_id, currency).await {
            Ok(quote) => state.writes.enqueue(WriteOp::ResetPriceRecord {
                product_id: product.product_id,
                price: quote.price,
            }),
            Err(e) => {
                // The next poll cycle picks the product up in the new
                // currency anyway
                tracing::warn!(
                    "Could not refresh product {} in {}: {}",
                    product.product_id,
                    currency.code(),
                    e
                );
            }
        }
    }

    Ok(Json(settings.into()))
}
