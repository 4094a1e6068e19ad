use serde::{Deserialize, Serialize};

use crate::services::settings::{NotifyDirection, SubscriberSettings};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThresholdUpdateRequest {
    pub percent: i32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectionUpdateRequest {
    pub direction: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyUpdateRequest {
    pub currency: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsView {
    pub threshold_percent: i32,
    pub direction: NotifyDirection,
    pub currency: String,
    pub currency_symbol: String,
    pub currency_name: String,
}

impl From<SubscriberSettings> for SettingsView {
    fn from(settings: SubscriberSettings) -> Self {
        Self {
            threshold_percent: settings.threshold_percent,
            direction: settings.direction,
            currency: settings.currency.code().to_string(),
            currency_symbol: settings.currency.symbol().to_string(),
            currency_name: settings.currency.display_name().to_string(),
        }
    }
}
