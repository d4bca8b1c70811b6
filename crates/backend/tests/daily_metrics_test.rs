//! Daily rollup tests: the dashboard row is derived from the ledger and
//! must stay correct no matter how many times it is recomputed.

mod common;

use backend::dashboards::daily_metrics::service as metrics;
use backend::domain::return_request::workflow;
use chrono::{Duration, Utc};
use common::{
    drive_to_processing, seed_sale, setup, staff, submit_request, WARRANTY_DAYS,
};
use contracts::dashboards::daily_metrics::DailyMetricDto;
use contracts::domain::common::Actor;
use contracts::domain::return_request::{DispositionDecision, RefundOutcome};
use contracts::enums::Disposition;
use sea_orm::{ConnectionTrait, DatabaseBackend, Statement};

fn counts(m: &DailyMetricDto) -> (i64, i64, i64, i64, i64, i64, i64, i64, i64, i64) {
    (
        m.total_requests,
        m.approved_count,
        m.rejected_count,
        m.completed_count,
        m.cancelled_count,
        m.defective_count,
        m.damaged_count,
        m.no_fault_count,
        m.wrong_item_count,
        m.refunded_cents,
    )
}

/// One busy day: a completed refund, a warranty rejection, a cancellation,
/// an approval still in flight and an untouched submission.
async fn seed_busy_day(db: &sea_orm::DatabaseConnection) {
    let sale = seed_sale(db, 1, 1, 5000, 10, 5).await;
    let request = submit_request(db, &sale, 1).await;
    drive_to_processing(db, request.id, DispositionDecision::new(Disposition::Refund)).await;
    workflow::complete_refund(db, &staff(), request.id, RefundOutcome::succeeded("PAY-M"))
        .await
        .unwrap();

    let expired = seed_sale(db, 2, 1, 3000, 10, 45).await;
    let request = submit_request(db, &expired, 1).await;
    workflow::validate(db, &staff(), request.id, WARRANTY_DAYS, None)
        .await
        .unwrap();

    let sale = seed_sale(db, 3, 1, 2000, 10, 5).await;
    let request = submit_request(db, &sale, 1).await;
    workflow::cancel(db, &Actor::customer(3), request.id, None)
        .await
        .unwrap();

    let sale = seed_sale(db, 4, 1, 1000, 10, 5).await;
    let request = submit_request(db, &sale, 1).await;
    workflow::validate(db, &staff(), request.id, WARRANTY_DAYS, None)
        .await
        .unwrap();

    let sale = seed_sale(db, 5, 1, 900, 10, 5).await;
    submit_request(db, &sale, 1).await;
}

#[tokio::test]
async fn test_rollup_counts_one_busy_day() {
    let db = setup().await;
    seed_busy_day(&db).await;

    let today = Utc::now().date_naive();
    let m = metrics::recompute_day(&db, today).await.unwrap();

    assert_eq!(m.day, today.format("%Y-%m-%d").to_string());
    assert_eq!(m.total_requests, 5);
    // the refunded request and the in-flight one both passed validation
    assert_eq!(m.approved_count, 2);
    assert_eq!(m.rejected_count, 1);
    assert_eq!(m.completed_count, 1);
    assert_eq!(m.cancelled_count, 1);
    // only the refunded request went through inspection
    assert_eq!(m.defective_count, 1);
    assert_eq!(m.damaged_count, 0);
    assert_eq!(m.no_fault_count, 0);
    assert_eq!(m.wrong_item_count, 0);
    assert_eq!(m.refunded_cents, 5000);

    // three requests closed today, all within the hour
    let cycle = m.avg_cycle_hours.unwrap();
    assert!((0.0..1.0).contains(&cycle), "cycle hours: {}", cycle);

    // three verdicts and one finished inspection, all seeded moments ago
    let validation = m.avg_validation_hours.unwrap();
    assert!(
        (0.0..1.0).contains(&validation),
        "validation hours: {}",
        validation
    );
    let inspection = m.avg_inspection_hours.unwrap();
    assert!(
        (0.0..1.0).contains(&inspection),
        "inspection hours: {}",
        inspection
    );
}

/// The stage averages read the activity log, so widening the gap between
/// a stage opener and its verdict must widen the average by the same amount.
#[tokio::test]
async fn test_stage_averages_measure_elapsed_hours() {
    let db = setup().await;
    let sale = seed_sale(&db, 1, 1, 5000, 10, 5).await;
    let request = submit_request(&db, &sale, 1).await;
    drive_to_processing(&db, request.id, DispositionDecision::new(Disposition::Refund)).await;
    workflow::complete_refund(&db, &staff(), request.id, RefundOutcome::succeeded("PAY-S"))
        .await
        .unwrap();

    // push the stage openers into the past; the verdict entries stay put
    for (action, shift) in [("SUBMIT", "-4 hours"), ("MARK_RECEIVED", "-1 hours")] {
        let stmt = Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            "UPDATE rma_activity_log SET created_at = datetime(created_at, ?) \
             WHERE request_id = ? AND action = ?",
            [shift.into(), request.id.to_string().into(), action.into()],
        );
        db.execute(stmt).await.unwrap();
    }

    let m = metrics::recompute_day(&db, Utc::now().date_naive())
        .await
        .unwrap();

    let validation = m.avg_validation_hours.unwrap();
    assert!(
        (4.0..4.2).contains(&validation),
        "validation hours: {}",
        validation
    );
    let inspection = m.avg_inspection_hours.unwrap();
    assert!(
        (1.0..1.2).contains(&inspection),
        "inspection hours: {}",
        inspection
    );

    // the cycle clock lives on the request row, which did not move
    let cycle = m.avg_cycle_hours.unwrap();
    assert!((0.0..1.0).contains(&cycle), "cycle hours: {}", cycle);
}

#[tokio::test]
async fn test_recompute_is_idempotent_and_rebuildable() {
    let db = setup().await;
    seed_busy_day(&db).await;
    let today = Utc::now().date_naive();

    let first = metrics::recompute_day(&db, today).await.unwrap();
    let second = metrics::recompute_day(&db, today).await.unwrap();
    assert_eq!(counts(&first), counts(&second));
    assert_eq!(first.avg_validation_hours, second.avg_validation_hours);
    assert_eq!(first.avg_inspection_hours, second.avg_inspection_hours);

    // the rollup follows the ledger, it is not an increment
    let sale = seed_sale(&db, 6, 1, 700, 5, 5).await;
    let request = submit_request(&db, &sale, 1).await;
    workflow::cancel(&db, &Actor::customer(6), request.id, None)
        .await
        .unwrap();

    let third = metrics::recompute_day(&db, today).await.unwrap();
    assert_eq!(third.total_requests, first.total_requests + 1);
    assert_eq!(third.cancelled_count, first.cancelled_count + 1);
    assert_eq!(third.refunded_cents, first.refunded_cents);

    let stored = metrics::get_day(&db, today).await.unwrap().unwrap();
    assert_eq!(counts(&stored), counts(&third));
}

#[tokio::test]
async fn test_empty_day_rolls_up_to_zeroes() {
    let db = setup().await;
    let day = Utc::now().date_naive() - Duration::days(10);

    assert!(metrics::get_day(&db, day).await.unwrap().is_none());

    let m = metrics::recompute_day(&db, day).await.unwrap();
    assert_eq!(
        counts(&m),
        (0, 0, 0, 0, 0, 0, 0, 0, 0, 0),
        "no ledger activity, no counts"
    );
    assert_eq!(m.avg_validation_hours, None);
    assert_eq!(m.avg_inspection_hours, None);
    assert_eq!(m.avg_cycle_hours, None);
}

#[tokio::test]
async fn test_range_recompute_returns_days_in_order() {
    let db = setup().await;
    seed_busy_day(&db).await;

    let today = Utc::now().date_naive();
    let from = today - Duration::days(2);

    let rows = metrics::recompute_range(&db, from, today).await.unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].day, from.format("%Y-%m-%d").to_string());
    assert_eq!(rows[2].day, today.format("%Y-%m-%d").to_string());
    assert_eq!(rows[0].total_requests, 0);
    assert_eq!(rows[2].total_requests, 5);

    let stored = metrics::get_range(&db, from, today).await.unwrap();
    assert_eq!(stored.len(), 3);
    let days: Vec<&str> = stored.iter().map(|m| m.day.as_str()).collect();
    let mut sorted = days.clone();
    sorted.sort();
    assert_eq!(days, sorted, "oldest day first");
}
