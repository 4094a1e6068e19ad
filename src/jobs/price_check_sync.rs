//! Background price check job.
//!
//! Two steady states: sleeping until the next cycle, or walking the watch
//! pairs. A cycle fetches the current price for every (product, subscriber)
//! pair, records the observation through the write queue, runs change
//! detection against the stored baseline and pushes notifications for the
//! pairs that cross their threshold. One pair's failure never touches the
//! rest; a cycle-level failure is logged and retried after a short
//! cooldown instead of the full interval. The loop never exits.

use std::time::Duration;

use chrono::Utc;
use tokio::time::sleep;

use crate::services::change_detector::{change_percent, should_notify};
use crate::services::notifier::NotificationDispatcher;
use crate::services::price_cache::PriceCache;
use crate::services::settings::SettingsResolver;
use crate::services::store::Store;
use crate::services::write_queue::{WriteOp, WriteQueue};

pub const CHECK_INTERVAL_SECS: u64 = 1800;
pub const ERROR_COOLDOWN_SECS: u64 = 60;

#[derive(Clone)]
pub struct PriceCheckDeps {
    pub store: Store,
    pub prices: PriceCache,
    pub settings: SettingsResolver,
    pub writes: WriteQueue,
    pub dispatcher: NotificationDispatcher,
}

#[derive(Debug, Default)]
pub struct CycleStats {
    pub pairs: usize,
    pub checked: usize,
    pub notified: usize,
    pub skipped: usize,
}

/// Spawns the poll loop. First cycle runs immediately on startup.
pub fn start_price_check_job(deps: PriceCheckDeps, interval: Duration, cooldown: Duration) {
    tokio::spawn(async move {
        loop {
            match run_price_check_cycle(&deps).await {
                Ok(stats) => {
                    tracing::info!(
                        "Price check cycle done: {} pairs, {} checked, {} notified, {} skipped",
                        stats.pairs,
                        stats.checked,
                        stats.notified,
                        stats.skipped
                    );
                    sleep(interval).await;
                }
                Err(e) => {
                    tracing::error!("Price check cycle failed: {}", e);
                    sleep(cooldown).await;
                }
            }
        }
    });
}

/// One full pass over the watch pairs.
pub async fn run_price_check_cycle(
    deps: &PriceCheckDeps,
) -> Result<CycleStats, Box<dyn std::error::Error + Send + Sync>> {
    let pairs = deps.store.load_watch_pairs().await?;

    let mut stats = CycleStats {
        pairs: pairs.len(),
        ..Default::default()
    };

    tracing::info!("Starting price check for {} watch pairs", stats.pairs);

    for pair in &pairs {
        let settings = match deps.settings.resolve(pair.subscriber_id).await {
            Ok(settings) => settings,
            Err(e) => {
                tracing::error!(
                    "Skipping product {} for subscriber {}: settings lookup failed ({})",
                    pair.product_id,
                    pair.subscriber_id,
                    e
                );
                stats.skipped += 1;
                continue;
            }
        };

        let quote = match deps
            .prices
            .get_or_fetch(pair.product_id, settings.currency)
            .await
        {
            Ok(quote) => quote,
            Err(e) => {
                tracing::error!(
                    "Skipping product {} for subscriber {}: price fetch failed ({})",
                    pair.product_id,
                    pair.subscriber_id,
                    e
                );
                stats.skipped += 1;
                continue;
            }
        };

        // The observation is persisted whether or not a notification fires
        deps.writes.enqueue(WriteOp::PriceObserved {
            product_id: pair.product_id,
            price: quote.price,
            checked_at: Utc::now().naive_utc(),
        });
        stats.checked += 1;

        if should_notify(pair.initial_price, quote.price, &settings) {
            // Future changes are measured from the price we just reported
            deps.writes.enqueue(WriteOp::Rebaseline {
                product_id: pair.product_id,
                price: quote.price,
            });

            let text = format_price_alert(
                &pair.product_name,
                pair.product_id,
                pair.initial_price,
                quote.price,
                quote.currency_symbol(),
            );

            match deps.dispatcher.deliver(pair.subscriber_id, &text).await {
                Ok(()) => stats.notified += 1,
                Err(e) => {
                    // The price record update above stands regardless
                    tracing::error!(
                        "Failed to notify subscriber {} about product {}: {}",
                        pair.subscriber_id,
                        pair.product_id,
                        e
                    );
                }
            }
        }
    }

    Ok(stats)
}

fn format_price_alert(
    name: &str,
    product_id: i64,
    old_price: i64,
    new_price: i64,
    symbol: &str,
) -> String {
    let direction = if new_price > old_price {
        "↗️ выросла"
    } else {
        "↘️ упала"
    };
    format!(
        "🔔 Цена {} на {:.2}%!\n📦 {}\n💰 Было: {}{}\n💰 Стало: {}{}\nАртикул {}\n🔄 Автоматическая проверка",
        direction,
        change_percent(old_price, new_price),
        name,
        old_price,
        symbol,
        new_price,
        symbol,
        product_id
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alert_text_reports_direction_and_percent() {
        let text = format_price_alert("Чайник", 123456, 10_000, 9_000, "₽");
        assert!(text.contains("упала"));
        assert!(text.contains("10.00%"));
        assert!(text.contains("Было: 10000₽"));
        assert!(text.contains("Стало: 9000₽"));
        assert!(text.contains("123456"));

        let text = format_price_alert("Чайник", 123456, 10_000, 12_000, "₽");
        assert!(text.contains("выросла"));
        assert!(text.contains("20.00%"));
    }
}
