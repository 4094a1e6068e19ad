use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddWatchRequest {
    pub product_id: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddWatchResponse {
    pub product_id: i64,
    pub name: String,
    pub price: i64,
    pub currency: String,
    pub currency_symbol: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchedProductView {
    pub product_id: i64,
    pub name: String,
    pub initial_price: i64,
    pub current_price: i64,
    pub last_checked_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchedProductsResponse {
    pub currency: String,
    pub currency_symbol: String,
    pub products: Vec<WatchedProductView>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceCheckResponse {
    pub product_id: i64,
    pub name: String,
    pub price: i64,
    pub currency: String,
    pub currency_symbol: String,
}
