//! Per-subscriber notification settings with a read-through cache.
//!
//! The cache has no TTL on purpose: entries are invalidated (or rewritten)
//! by the settings write paths, never by time. Losing the cache only costs
//! a re-read of the subscribers row.

use moka::future::Cache;
use sea_orm::{DatabaseConnection, DbErr, EntityTrait};
use serde::{Deserialize, Serialize};

use crate::entities::prelude::*;
use crate::services::currencies::Currency;
use crate::services::retry::RetryPolicy;
use crate::services::store::is_transient_db_err;

pub const THRESHOLD_MIN: i32 = 1;
pub const THRESHOLD_MAX: i32 = 50;
pub const DEFAULT_THRESHOLD: i32 = 10;

/// Which price movements the subscriber wants to hear about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NotifyDirection {
    Any,
    Increase,
    #[default]
    Decrease,
}

impl NotifyDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotifyDirection::Any => "any",
            NotifyDirection::Increase => "increase",
            NotifyDirection::Decrease => "decrease",
        }
    }

    pub fn from_str(value: &str) -> Option<NotifyDirection> {
        match value {
            "any" => Some(NotifyDirection::Any),
            "increase" => Some(NotifyDirection::Increase),
            "decrease" => Some(NotifyDirection::Decrease),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriberSettings {
    pub threshold_percent: i32,
    pub direction: NotifyDirection,
    pub currency: Currency,
}

impl Default for SubscriberSettings {
    fn default() -> Self {
        Self {
            threshold_percent: DEFAULT_THRESHOLD,
            direction: NotifyDirection::default(),
            currency: Currency::default(),
        }
    }
}

#[derive(Clone)]
pub struct SettingsResolver {
    db: DatabaseConnection,
    cache: Cache<i64, SubscriberSettings>,
    retry: RetryPolicy,
}

impl SettingsResolver {
    pub fn new(db: DatabaseConnection, retry: RetryPolicy) -> Self {
        let cache = Cache::builder().max_capacity(100_000).build();
        Self { db, cache, retry }
    }

    /// Cache hit -> return; otherwise read the subscribers row, apply
    /// defaults for a missing row or NULL columns, populate the cache.
    /// No side effects beyond cache population.
    pub async fn resolve(&self, subscriber_id: i64) -> Result<SubscriberSettings, DbErr> {
        if let Some(settings) = self.cache.get(&subscriber_id).await {
            return Ok(settings);
        }

        let row = self
            .retry
            .run(
                || Subscribers::find_by_id(subscriber_id).one(&self.db),
                is_transient_db_err,
            )
            .await?;

        let settings = match row {
            Some(subscriber) => SubscriberSettings {
                threshold_percent: subscriber
                    .threshold_percent
                    .unwrap_or(DEFAULT_THRESHOLD),
                direction: subscriber
                    .direction
                    .as_deref()
                    .and_then(NotifyDirection::from_str)
                    .unwrap_or_default(),
                currency: subscriber
                    .currency
                    .as_deref()
                    .and_then(Currency::from_code)
                    .unwrap_or_default(),
            },
            None => SubscriberSettings::default(),
        };

        self.cache.insert(subscriber_id, settings).await;
        Ok(settings)
    }

    /// Write-through update; every settings mutation must call this (or
    /// `invalidate`) in the same logical step as the queued DB write.
    pub async fn store(&self, subscriber_id: i64, settings: SubscriberSettings) {
        self.cache.insert(subscriber_id, settings).await;
    }

    pub async fn invalidate(&self, subscriber_id: i64) {
        self.cache.invalidate(&subscriber_id).await;
    }
}
