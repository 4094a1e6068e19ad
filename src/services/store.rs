//! Synchronous store access.
//!
//! The read path and the consistency-critical writes (registration, watch
//! insert/delete, account deletion) talk to the database directly instead
//! of going through the write queue, because their callers need the
//! outcome. Every operation runs under the shared retry policy; exhausting
//! it surfaces the `DbErr` to the caller as a hard failure.

use chrono::Utc;
use sea_orm::sea_query::Query;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, FromQueryResult,
    JoinType, ModelTrait, PaginatorTrait, QueryFilter, QuerySelect, RelationTrait, Set,
};

use crate::entities::{prelude::*, price_records, products, subscribers, watches};
use crate::services::price_source::PriceQuote;
use crate::services::retry::RetryPolicy;
use crate::services::settings::{NotifyDirection, DEFAULT_THRESHOLD};
use crate::services::currencies::Currency;

/// Connectivity-level failures are worth retrying; statement-level
/// failures (bad data, constraint violations) are not.
pub fn is_transient_db_err(err: &DbErr) -> bool {
    matches!(err, DbErr::Conn(_) | DbErr::ConnectionAcquire(_))
}

/// One (product, subscriber) pair of the poll cycle join
#[derive(Debug, Clone, FromQueryResult)]
pub struct WatchPair {
    pub product_id: i64,
    pub product_name: String,
    pub subscriber_id: i64,
    pub initial_price: i64,
}

/// Row of a subscriber's product listing
#[derive(Debug, Clone, FromQueryResult)]
pub struct WatchedProduct {
    pub product_id: i64,
    pub product_name: String,
    pub initial_price: i64,
    pub current_price: i64,
    pub last_checked_at: chrono::NaiveDateTime,
}

#[derive(Clone)]
pub struct Store {
    db: DatabaseConnection,
    retry: RetryPolicy,
}

impl Store {
    pub fn new(db: DatabaseConnection, retry: RetryPolicy) -> Self {
        Self { db, retry }
    }

    /// First-contact registration. Returns true when the row was created.
    pub async fn ensure_subscriber(&self, id: i64, name: &str) -> Result<bool, DbErr> {
        let existing = self
            .retry
            .run(
                || Subscribers::find_by_id(id).one(&self.db),
                is_transient_db_err,
            )
            .await?;

        if existing.is_some() {
            return Ok(false);
        }

        let subscriber = subscribers::ActiveModel {
            id: Set(id),
            name: Set(name.to_string()),
            currency: Set(Some(Currency::default().code().to_string())),
            direction: Set(Some(NotifyDirection::default().as_str().to_string())),
            threshold_percent: Set(Some(DEFAULT_THRESHOLD)),
        };
        self.retry
            .run(
                || subscriber.clone().insert(&self.db),
                is_transient_db_err,
            )
            .await?;
        Ok(true)
    }

    pub async fn subscriber_exists(&self, id: i64) -> Result<bool, DbErr> {
        let row = self
            .retry
            .run(
                || Subscribers::find_by_id(id).one(&self.db),
                is_transient_db_err,
            )
            .await?;
        Ok(row.is_some())
    }

    pub async fn watch_exists(&self, subscriber_id: i64, product_id: i64) -> Result<bool, DbErr> {
        let row = self
            .retry
            .run(
                || Watches::find_by_id((product_id, subscriber_id)).one(&self.db),
                is_transient_db_err,
            )
            .await?;
        Ok(row.is_some())
    }

    pub async fn watch_count(&self, subscriber_id: i64) -> Result<u64, DbErr> {
        self.retry
            .run(
                || {
                    Watches::find()
                        .filter(watches::Column::SubscriberId.eq(subscriber_id))
                        .count(&self.db)
                },
                is_transient_db_err,
            )
            .await
    }

    /// Registers a watch: inserts the product on first sight (name frozen
    /// from this quote), links the subscriber, and upserts the price
    /// record. An existing record keeps its baseline; only the observed
    /// price and check time move.
    pub async fn add_watch(
        &self,
        subscriber_id: i64,
        product_id: i64,
        quote: &PriceQuote,
    ) -> Result<(), DbErr> {
        let product = self
            .retry
            .run(
                || Products::find_by_id(product_id).one(&self.db),
                is_transient_db_err,
            )
            .await?;

        if product.is_none() {
            let product = products::ActiveModel {
                id: Set(product_id),
                name: Set(quote.name.clone()),
            };
            self.retry
                .run(|| product.clone().insert(&self.db), is_transient_db_err)
                .await?;
        }

        let watch = watches::ActiveModel {
            product_id: Set(product_id),
            subscriber_id: Set(subscriber_id),
        };
        self.retry
            .run(|| watch.clone().insert(&self.db), is_transient_db_err)
            .await?;

        let now = Utc::now().naive_utc();
        let record = self
            .retry
            .run(
                || PriceRecords::find_by_id(product_id).one(&self.db),
                is_transient_db_err,
            )
            .await?;

        match record {
            Some(existing) => {
                let mut active: price_records::ActiveModel = existing.into();
                active.current_price = Set(quote.price);
                active.last_checked_at = Set(now);
                self.retry
                    .run(|| active.clone().update(&self.db), is_transient_db_err)
                    .await?;
            }
            None => {
                let record = price_records::ActiveModel {
                    product_id: Set(product_id),
                    initial_price: Set(quote.price),
                    current_price: Set(quote.price),
                    last_checked_at: Set(now),
                };
                self.retry
                    .run(|| record.clone().insert(&self.db), is_transient_db_err)
                    .await?;
            }
        }

        Ok(())
    }

    /// Unlinks the subscriber from the product and garbage-collects the
    /// product (and, via cascade, its price record) when nobody else
    /// watches it. Returns true when a watch row was actually removed.
    pub async fn remove_watch(&self, subscriber_id: i64, product_id: i64) -> Result<bool, DbErr> {
        let watch = self
            .retry
            .run(
                || Watches::find_by_id((product_id, subscriber_id)).one(&self.db),
                is_transient_db_err,
            )
            .await?;

        let Some(watch) = watch else {
            return Ok(false);
        };

        self.retry
            .run(|| watch.clone().delete(&self.db), is_transient_db_err)
            .await?;

        let remaining = self
            .retry
            .run(
                || {
                    Watches::find()
                        .filter(watches::Column::ProductId.eq(product_id))
                        .count(&self.db)
                },
                is_transient_db_err,
            )
            .await?;

        if remaining == 0 {
            self.retry
                .run(
                    || Products::delete_by_id(product_id).exec(&self.db),
                    is_transient_db_err,
                )
                .await?;
            tracing::info!("Product {} has no watchers left, removed", product_id);
        }

        Ok(true)
    }

    /// Account deletion (subscriber revoked access). Watches cascade with
    /// the subscriber row; products left without a single watcher are
    /// swept afterwards so no orphaned price records remain.
    pub async fn delete_subscriber(&self, subscriber_id: i64) -> Result<(), DbErr> {
        self.retry
            .run(
                || Subscribers::delete_by_id(subscriber_id).exec(&self.db),
                is_transient_db_err,
            )
            .await?;

        let watched = Query::select()
            .column(watches::Column::ProductId)
            .from(Watches)
            .to_owned();

        let swept = self
            .retry
            .run(
                || {
                    Products::delete_many()
                        .filter(products::Column::Id.not_in_subquery(watched.clone()))
                        .exec(&self.db)
                },
                is_transient_db_err,
            )
            .await?;

        if swept.rows_affected > 0 {
            tracing::info!(
                "Swept {} unwatched products after deleting subscriber {}",
                swept.rows_affected,
                subscriber_id
            );
        }

        Ok(())
    }

    /// A subscriber's products with their stored price state
    pub async fn watched_products(
        &self,
        subscriber_id: i64,
    ) -> Result<Vec<WatchedProduct>, DbErr> {
        self.retry
            .run(
                || {
                    Watches::find()
                        .filter(watches::Column::SubscriberId.eq(subscriber_id))
                        .select_only()
                        .column_as(products::Column::Id, "product_id")
                        .column_as(products::Column::Name, "product_name")
                        .column_as(price_records::Column::InitialPrice, "initial_price")
                        .column_as(price_records::Column::CurrentPrice, "current_price")
                        .column_as(price_records::Column::LastCheckedAt, "last_checked_at")
                        .join(JoinType::InnerJoin, watches::Relation::Products.def())
                        .join(JoinType::InnerJoin, products::Relation::PriceRecords.def())
                        .into_model::<WatchedProduct>()
                        .all(&self.db)
                },
                is_transient_db_err,
            )
            .await
    }

    /// The poll cycle join: every watched product paired with every
    /// subscriber watching it, plus the stored baseline.
    pub async fn load_watch_pairs(&self) -> Result<Vec<WatchPair>, DbErr> {
        self.retry
            .run(
                || {
                    Watches::find()
                        .select_only()
                        .column_as(watches::Column::SubscriberId, "subscriber_id")
                        .column_as(products::Column::Id, "product_id")
                        .column_as(products::Column::Name, "product_name")
                        .column_as(price_records::Column::InitialPrice, "initial_price")
                        .join(JoinType::InnerJoin, watches::Relation::Products.def())
                        .join(JoinType::InnerJoin, products::Relation::PriceRecords.def())
                        .into_model::<WatchPair>()
                        .all(&self.db)
                },
                is_transient_db_err,
            )
            .await
    }
}
