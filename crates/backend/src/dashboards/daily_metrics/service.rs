use anyhow::Result;
use chrono::NaiveDate;
use contracts::dashboards::daily_metrics::DailyMetricDto;
use sea_orm::{DatabaseConnection, TransactionTrait};

use super::repository;

/// Rebuild the rollup for one day from the ledger and store it.
///
/// The row is deleted and re-inserted in one transaction, so recompute is
/// idempotent: running it twice produces the same counts, never doubled.
pub async fn recompute_day(db: &DatabaseConnection, day: NaiveDate) -> Result<DailyMetricDto> {
    let txn = db.begin().await?;
    let row = repository::aggregate_day(&txn, day).await?;
    repository::delete_day(&txn, day).await?;
    repository::insert(&txn, row.clone()).await?;
    txn.commit().await?;

    tracing::info!("Daily metrics recomputed for {}", day);
    Ok(row.into())
}

/// Rebuild every day in the inclusive range
pub async fn recompute_range(
    db: &DatabaseConnection,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Vec<DailyMetricDto>> {
    let mut rows = Vec::new();
    let mut day = from;
    while day <= to {
        rows.push(recompute_day(db, day).await?);
        day = day
            .succ_opt()
            .ok_or_else(|| anyhow::anyhow!("date overflow at {}", day))?;
    }
    Ok(rows)
}

/// Stored rollup for one day, if it has been computed
pub async fn get_day(db: &DatabaseConnection, day: NaiveDate) -> Result<Option<DailyMetricDto>> {
    Ok(repository::get_day(db, day).await?.map(Into::into))
}

/// Stored rollups for the inclusive range, oldest first
pub async fn get_range(
    db: &DatabaseConnection,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Vec<DailyMetricDto>> {
    Ok(repository::get_range(db, from, to)
        .await?
        .into_iter()
        .map(Into::into)
        .collect())
}
