use axum::extract::{Path, Query, State};
use axum::{http::StatusCode, Json};
use serde::Deserialize;

use crate::models::subscriber::ErrorResponse;
use crate::models::watch::PriceCheckResponse;
use crate::services::currencies::Currency;
use crate::services::price_source::PriceSourceError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct PriceQuery {
    pub currency: Option<String>,
}

/// On-demand price check, served from the price cache when fresh.
pub async fn check_price(
    State(state): State<AppState>,
    Path(product_id): Path<i64>,
    Query(query): Query<PriceQuery>,
) -> Result<Json<PriceCheckResponse>, (StatusCode, Json<ErrorResponse>)> {
    let currency = match query.currency.as_deref() {
        Some(code) => Currency::from_code(code).ok_or_else(|| {
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ErrorResponse {
                    error: "Неизвестная валюта".to_string(),
                }),
            )
        })?,
        None => Currency::default(),
    };

    match state.prices.get_or_fetch(product_id, currency).await {
        Ok(quote) => Ok(Json(PriceCheckResponse {
            product_id,
            name: quote.name.clone(),
            price: quote.price,
            currency: currency.code().to_string(),
            currency_symbol: quote.currency_symbol().to_string(),
        })),
        Err(PriceSourceError::NotFound) => Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "Товар не найден в каталоге".to_string(),
            }),
        )),
        Err(e) => Err((
            StatusCode::BAD_GATEWAY,
            Json(ErrorResponse {
                error: format!("Не удалось получить текущую цену: {}", e),
            }),
        )),
    }
}
