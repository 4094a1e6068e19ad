//! Change detection policy.
//!
//! Pure functions: given the baseline price, the freshly fetched price and
//! the subscriber's settings, decide whether a notification fires. All the
//! I/O lives in the poll job; this module is fully unit-testable.

use crate::services::settings::{NotifyDirection, SubscriberSettings};

/// Absolute percentage change of `new_price` relative to `old_price`.
/// Callers must not pass `old_price == 0`.
pub fn change_percent(old_price: i64, new_price: i64) -> f64 {
    ((new_price - old_price) as f64 / old_price as f64 * 100.0).abs()
}

/// True when the move from `old_price` to `new_price` crosses the
/// subscriber's threshold in a direction they care about.
///
/// A zero baseline never notifies: percentage change against zero is
/// meaningless and the record will pick up a real baseline on the next
/// successful fetch.
pub fn should_notify(old_price: i64, new_price: i64, settings: &SubscriberSettings) -> bool {
    if old_price == 0 {
        return false;
    }

    if change_percent(old_price, new_price) < settings.threshold_percent as f64 {
        return false;
    }

    match settings.direction {
        NotifyDirection::Any => true,
        NotifyDirection::Increase => new_price > old_price,
        NotifyDirection::Decrease => new_price < old_price,
    }
}
