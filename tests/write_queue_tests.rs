mod common;

use std::time::Duration;

use sea_orm::{ConnectionTrait, EntityTrait};

use pricewatch_backend::entities::prelude::*;
use pricewatch_backend::services::write_queue::{WriteOp, WriteQueue};

use crate::common::{seed_product, seed_subscriber, setup_test_db};

#[tokio::test]
async fn operations_apply_in_submission_order() {
    let db = setup_test_db().await;
    seed_product(&db, 1, 1).await;

    let (queue, writer) = WriteQueue::spawn(db.clone(), Duration::ZERO);

    // Order matters: the reset wipes both prices, the rebaseline then
    // moves only the baseline, the observation only the current price.
    queue.enqueue(WriteOp::ResetPriceRecord {
        product_id: 1,
        price: 100,
    });
    queue.enqueue(WriteOp::Rebaseline {
        product_id: 1,
        price: 50,
    });
    queue.enqueue(WriteOp::PriceObserved {
        product_id: 1,
        price: 70,
        checked_at: chrono::Utc::now().naive_utc(),
    });

    drop(queue);
    writer.await.unwrap();

    let record = PriceRecords::find_by_id(1).one(&db).await.unwrap().unwrap();
    assert_eq!(record.initial_price, 50);
    assert_eq!(record.current_price, 70);
}

#[tokio::test]
async fn concurrent_enqueue_keeps_per_sender_order() {
    let db = setup_test_db().await;
    seed_subscriber(&db, 10, 10, "decrease").await;
    seed_subscriber(&db, 20, 10, "decrease").await;

    let (queue, writer) = WriteQueue::spawn(db.clone(), Duration::ZERO);

    let q1 = queue.clone();
    let t1 = tokio::spawn(async move {
        for percent in 1..=50 {
            q1.enqueue(WriteOp::SetThreshold {
                subscriber_id: 10,
                percent,
            });
        }
    });
    let q2 = queue.clone();
    let t2 = tokio::spawn(async move {
        for percent in 1..=50 {
            q2.enqueue(WriteOp::SetThreshold {
                subscriber_id: 20,
                percent,
            });
        }
    });

    t1.await.unwrap();
    t2.await.unwrap();
    drop(queue);
    writer.await.unwrap();

    // The last submitted value per sender wins
    for id in [10, 20] {
        let row = Subscribers::find_by_id(id).one(&db).await.unwrap().unwrap();
        assert_eq!(row.threshold_percent, Some(50));
    }
}

#[tokio::test]
async fn consumer_survives_a_failing_operation() {
    let db = setup_test_db().await;
    seed_subscriber(&db, 1, 10, "decrease").await;

    // Make price-record writes impossible
    db.execute_unprepared("DROP TABLE price_records")
        .await
        .unwrap();

    let (queue, writer) = WriteQueue::spawn(db.clone(), Duration::ZERO);

    queue.enqueue(WriteOp::PriceObserved {
        product_id: 1,
        price: 100,
        checked_at: chrono::Utc::now().naive_utc(),
    });
    queue.enqueue(WriteOp::SetThreshold {
        subscriber_id: 1,
        percent: 42,
    });

    drop(queue);
    writer.await.unwrap();

    // The failing op was dropped, the next one still applied
    let row = Subscribers::find_by_id(1).one(&db).await.unwrap().unwrap();
    assert_eq!(row.threshold_percent, Some(42));
}
