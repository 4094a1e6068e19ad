//! Asynchronous write path.
//!
//! Every mutation that nobody waits on goes through a single consumer
//! task, so queued writes are strictly serialized and the poll cycle never
//! blocks on the database. Durability is fire-and-forget: a failed
//! operation is logged and the consumer keeps draining. A short pacing
//! delay between operations bounds the write rate.

use std::time::Duration;

use chrono::NaiveDateTime;
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::sleep;

use crate::entities::{prelude::*, price_records, subscribers};
use crate::services::currencies::Currency;
use crate::services::settings::NotifyDirection;

pub const WRITE_PACING: Duration = Duration::from_millis(100);

/// Pending mutation. Each variant is one statement's worth of work.
#[derive(Debug, Clone)]
pub enum WriteOp {
    /// Poll cycle observed a price: move `current_price` and the check
    /// timestamp, leave the baseline alone
    PriceObserved {
        product_id: i64,
        price: i64,
        checked_at: NaiveDateTime,
    },
    /// A notification fired: measure future changes from this price
    Rebaseline { product_id: i64, price: i64 },
    /// Display currency changed: old prices are in the wrong unit, start
    /// the record over at the freshly fetched price
    ResetPriceRecord { product_id: i64, price: i64 },
    SetThreshold { subscriber_id: i64, percent: i32 },
    SetDirection {
        subscriber_id: i64,
        direction: NotifyDirection,
    },
    SetCurrency {
        subscriber_id: i64,
        currency: Currency,
    },
}

#[derive(Clone)]
pub struct WriteQueue {
    tx: mpsc::UnboundedSender<WriteOp>,
}

impl WriteQueue {
    /// Starts the consumer task. The task drains in submission order and
    /// exits once every queue handle is dropped and the channel is empty.
    pub fn spawn(db: DatabaseConnection, pacing: Duration) -> (Self, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::unbounded_channel::<WriteOp>();

        let handle = tokio::spawn(async move {
            while let Some(op) = rx.recv().await {
                if let Err(e) = apply(&db, &op).await {
                    tracing::error!("Queued write failed, dropping it: {:?} ({})", op, e);
                }
                sleep(pacing).await;
            }
            tracing::info!("Write queue drained, consumer stopped");
        });

        (Self { tx }, handle)
    }

    /// Fire-and-forget submit. Callers never observe the write outcome.
    pub fn enqueue(&self, op: WriteOp) {
        if self.tx.send(op).is_err() {
            tracing::error!("Write queue consumer is gone, write dropped");
        }
    }
}

async fn apply(db: &DatabaseConnection, op: &WriteOp) -> Result<(), DbErr> {
    match op {
        WriteOp::PriceObserved {
            product_id,
            price,
            checked_at,
        } => {
            PriceRecords::update_many()
                .col_expr(price_records::Column::CurrentPrice, Expr::value(*price))
                .col_expr(
                    price_records::Column::LastCheckedAt,
                    Expr::value(*checked_at),
                )
                .filter(price_records::Column::ProductId.eq(*product_id))
                .exec(db)
                .await?;
        }
        WriteOp::Rebaseline { product_id, price } => {
            PriceRecords::update_many()
                .col_expr(price_records::Column::InitialPrice, Expr::value(*price))
                .filter(price_records::Column::ProductId.eq(*product_id))
                .exec(db)
                .await?;
        }
        WriteOp::ResetPriceRecord { product_id, price } => {
            PriceRecords::update_many()
                .col_expr(price_records::Column::InitialPrice, Expr::value(*price))
                .col_expr(price_records::Column::CurrentPrice, Expr::value(*price))
                .filter(price_records::Column::ProductId.eq(*product_id))
                .exec(db)
                .await?;
        }
        WriteOp::SetThreshold {
            subscriber_id,
            percent,
        } => {
            Subscribers::update_many()
                .col_expr(
                    subscribers::Column::ThresholdPercent,
                    Expr::value(Some(*percent)),
                )
                .filter(subscribers::Column::Id.eq(*subscriber_id))
                .exec(db)
                .await?;
        }
        WriteOp::SetDirection {
            subscriber_id,
            direction,
        } => {
            Subscribers::update_many()
                .col_expr(
                    subscribers::Column::Direction,
                    Expr::value(Some(direction.as_str().to_string())),
                )
                .filter(subscribers::Column::Id.eq(*subscriber_id))
                .exec(db)
                .await?;
        }
        WriteOp::SetCurrency {
            subscriber_id,
            currency,
        } => {
            Subscribers::update_many()
                .col_expr(
                    subscribers::Column::Currency,
                    Expr::value(Some(currency.code().to_string())),
                )
                .filter(subscribers::Column::Id.eq(*subscriber_id))
                .exec(db)
                .await?;
        }
    }
    Ok(())
}
