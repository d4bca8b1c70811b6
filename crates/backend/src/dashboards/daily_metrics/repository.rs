use chrono::{NaiveDate, Utc};
use contracts::dashboards::daily_metrics::DailyMetricDto;
use sea_orm::entity::prelude::*;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseBackend, EntityTrait, FromQueryResult, QueryFilter,
    QueryOrder, Set, Statement,
};
use serde::{Deserialize, Serialize};

/// Stored daily rollup row, one per calendar day
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "daily_metric")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub day: String,
    pub total_requests: i64,
    pub approved_count: i64,
    pub rejected_count: i64,
    pub completed_count: i64,
    pub cancelled_count: i64,
    pub defective_count: i64,
    pub damaged_count: i64,
    pub no_fault_count: i64,
    pub wrong_item_count: i64,
    pub refunded_cents: i64,
    pub avg_validation_hours: Option<f64>,
    pub avg_inspection_hours: Option<f64>,
    pub avg_cycle_hours: Option<f64>,
    pub computed_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for DailyMetricDto {
    fn from(m: Model) -> Self {
        DailyMetricDto {
            day: m.day,
            total_requests: m.total_requests,
            approved_count: m.approved_count,
            rejected_count: m.rejected_count,
            completed_count: m.completed_count,
            cancelled_count: m.cancelled_count,
            defective_count: m.defective_count,
            damaged_count: m.damaged_count,
            no_fault_count: m.no_fault_count,
            wrong_item_count: m.wrong_item_count,
            refunded_cents: m.refunded_cents,
            avg_validation_hours: m.avg_validation_hours,
            avg_inspection_hours: m.avg_inspection_hours,
            avg_cycle_hours: m.avg_cycle_hours,
            computed_at: m.computed_at.to_rfc3339(),
        }
    }
}

fn day_key(day: NaiveDate) -> String {
    day.format("%Y-%m-%d").to_string()
}

/// Build the full rollup row for one day straight from the ledger.
/// Nothing is written here; the caller decides when to persist.
pub async fn aggregate_day<C: ConnectionTrait>(db: &C, day: NaiveDate) -> Result<Model, DbErr> {
    let key = day_key(day);

    let total_requests = count_submitted(db, &key).await?;
    let validation = count_validation_outcomes(db, &key).await?;
    let closures = count_closures(db, &key).await?;
    let inspections = count_inspection_results(db, &key).await?;
    let refunded_cents = sum_completed_refunds(db, &key).await?;
    let validation_hours = avg_validation_hours(db, &key).await?;
    let inspection_hours = avg_inspection_hours(db, &key).await?;

    Ok(Model {
        day: key,
        total_requests,
        approved_count: validation.approved,
        rejected_count: validation.rejected,
        completed_count: closures.completed,
        cancelled_count: closures.cancelled,
        defective_count: inspections.defective,
        damaged_count: inspections.damaged,
        no_fault_count: inspections.no_fault,
        wrong_item_count: inspections.wrong_item,
        refunded_cents,
        avg_validation_hours: validation_hours,
        avg_inspection_hours: inspection_hours,
        avg_cycle_hours: closures.avg_cycle_hours,
        computed_at: Utc::now(),
    })
}

/// Requests submitted on the day
async fn count_submitted<C: ConnectionTrait>(db: &C, day: &str) -> Result<i64, DbErr> {
    #[derive(Debug, FromQueryResult)]
    struct Row {
        submitted: i64,
    }

    let sql = "SELECT COUNT(*) AS submitted FROM rma_request WHERE date(created_at) = ?";
    let stmt = Statement::from_sql_and_values(DatabaseBackend::Sqlite, sql, [day.into()]);
    let row = Row::find_by_statement(stmt).one(db).await?;
    Ok(row.map(|r| r.submitted).unwrap_or(0))
}

#[derive(Debug, FromQueryResult)]
struct ValidationOutcomes {
    approved: i64,
    rejected: i64,
}

/// Validation verdicts recorded in the activity log on the day
async fn count_validation_outcomes<C: ConnectionTrait>(
    db: &C,
    day: &str,
) -> Result<ValidationOutcomes, DbErr> {
    let sql = r#"
        SELECT
            COALESCE(SUM(CASE WHEN action = 'APPROVE' THEN 1 ELSE 0 END), 0) AS approved,
            COALESCE(SUM(CASE WHEN action = 'REJECT' THEN 1 ELSE 0 END), 0) AS rejected
        FROM rma_activity_log
        WHERE action IN ('APPROVE', 'REJECT') AND date(created_at) = ?
    "#;
    let stmt = Statement::from_sql_and_values(DatabaseBackend::Sqlite, sql, [day.into()]);
    let row = ValidationOutcomes::find_by_statement(stmt).one(db).await?;
    Ok(row.unwrap_or(ValidationOutcomes {
        approved: 0,
        rejected: 0,
    }))
}

#[derive(Debug, FromQueryResult)]
struct Closures {
    completed: i64,
    cancelled: i64,
    avg_cycle_hours: Option<f64>,
}

/// Requests closed on the day, with the mean submission-to-close cycle
/// over every request closed that day (rejections included)
async fn count_closures<C: ConnectionTrait>(db: &C, day: &str) -> Result<Closures, DbErr> {
    let sql = r#"
        SELECT
            COALESCE(SUM(CASE WHEN status = 'COMPLETED' THEN 1 ELSE 0 END), 0) AS completed,
            COALESCE(SUM(CASE WHEN status = 'CANCELLED' THEN 1 ELSE 0 END), 0) AS cancelled,
            AVG((julianday(closed_at) - julianday(created_at)) * 24.0) AS avg_cycle_hours
        FROM rma_request
        WHERE closed_at IS NOT NULL AND date(closed_at) = ?
    "#;
    let stmt = Statement::from_sql_and_values(DatabaseBackend::Sqlite, sql, [day.into()]);
    let row = Closures::find_by_statement(stmt).one(db).await?;
    Ok(row.unwrap_or(Closures {
        completed: 0,
        cancelled: 0,
        avg_cycle_hours: None,
    }))
}

#[derive(Debug, FromQueryResult)]
struct InspectionResults {
    defective: i64,
    damaged: i64,
    no_fault: i64,
    wrong_item: i64,
}

/// Verdict breakdown of inspections finished on the day
async fn count_inspection_results<C: ConnectionTrait>(
    db: &C,
    day: &str,
) -> Result<InspectionResults, DbErr> {
    let sql = r#"
        SELECT
            COALESCE(SUM(CASE WHEN q.inspection_result = 'DEFECTIVE' THEN 1 ELSE 0 END), 0) AS defective,
            COALESCE(SUM(CASE WHEN q.inspection_result = 'DAMAGED' THEN 1 ELSE 0 END), 0) AS damaged,
            COALESCE(SUM(CASE WHEN q.inspection_result = 'NO_FAULT_FOUND' THEN 1 ELSE 0 END), 0) AS no_fault,
            COALESCE(SUM(CASE WHEN q.inspection_result = 'WRONG_ITEM' THEN 1 ELSE 0 END), 0) AS wrong_item
        FROM rma_activity_log a
        JOIN rma_request q ON q.id = a.request_id
        WHERE a.action = 'COMPLETE_INSPECTION' AND date(a.created_at) = ?
    "#;
    let stmt = Statement::from_sql_and_values(DatabaseBackend::Sqlite, sql, [day.into()]);
    let row = InspectionResults::find_by_statement(stmt).one(db).await?;
    Ok(row.unwrap_or(InspectionResults {
        defective: 0,
        damaged: 0,
        no_fault: 0,
        wrong_item: 0,
    }))
}

/// Total cents refunded on the day (refund rows completed that day)
async fn sum_completed_refunds<C: ConnectionTrait>(db: &C, day: &str) -> Result<i64, DbErr> {
    #[derive(Debug, FromQueryResult)]
    struct Row {
        refunded: i64,
    }

    let sql = r#"
        SELECT COALESCE(SUM(amount_cents), 0) AS refunded
        FROM refund
        WHERE status = 'COMPLETED' AND date(updated_at) = ?
    "#;
    let stmt = Statement::from_sql_and_values(DatabaseBackend::Sqlite, sql, [day.into()]);
    let row = Row::find_by_statement(stmt).one(db).await?;
    Ok(row.map(|r| r.refunded).unwrap_or(0))
}

#[derive(Debug, FromQueryResult)]
struct StageAverage {
    hours: Option<f64>,
}

/// Mean hours from submission to the validation verdict, over requests
/// decided on the day. A request has exactly one SUBMIT entry and at most
/// one verdict entry, so the self-join pairs rows one-to-one.
async fn avg_validation_hours<C: ConnectionTrait>(
    db: &C,
    day: &str,
) -> Result<Option<f64>, DbErr> {
    let sql = r#"
        SELECT AVG((julianday(v.created_at) - julianday(s.created_at)) * 24.0) AS hours
        FROM rma_activity_log v
        JOIN rma_activity_log s
            ON s.request_id = v.request_id AND s.action = 'SUBMIT'
        WHERE v.action IN ('APPROVE', 'REJECT') AND date(v.created_at) = ?
    "#;
    let stmt = Statement::from_sql_and_values(DatabaseBackend::Sqlite, sql, [day.into()]);
    let row = StageAverage::find_by_statement(stmt).one(db).await?;
    Ok(row.and_then(|r| r.hours))
}

/// Mean hours from warehouse receipt to the inspection verdict, over
/// requests whose inspection finished on the day
async fn avg_inspection_hours<C: ConnectionTrait>(
    db: &C,
    day: &str,
) -> Result<Option<f64>, DbErr> {
    let sql = r#"
        SELECT AVG((julianday(i.created_at) - julianday(r.created_at)) * 24.0) AS hours
        FROM rma_activity_log i
        JOIN rma_activity_log r
            ON r.request_id = i.request_id AND r.action = 'MARK_RECEIVED'
        WHERE i.action = 'COMPLETE_INSPECTION' AND date(i.created_at) = ?
    "#;
    let stmt = Statement::from_sql_and_values(DatabaseBackend::Sqlite, sql, [day.into()]);
    let row = StageAverage::find_by_statement(stmt).one(db).await?;
    Ok(row.and_then(|r| r.hours))
}

pub async fn get_day<C: ConnectionTrait>(db: &C, day: NaiveDate) -> Result<Option<Model>, DbErr> {
    Entity::find_by_id(day_key(day)).one(db).await
}

pub async fn get_range<C: ConnectionTrait>(
    db: &C,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Vec<Model>, DbErr> {
    Entity::find()
        .filter(Column::Day.gte(day_key(from)))
        .filter(Column::Day.lte(day_key(to)))
        .order_by_asc(Column::Day)
        .all(db)
        .await
}

pub async fn delete_day<C: ConnectionTrait>(db: &C, day: NaiveDate) -> Result<(), DbErr> {
    Entity::delete_many()
        .filter(Column::Day.eq(day_key(day)))
        .exec(db)
        .await?;
    Ok(())
}

pub async fn insert<C: ConnectionTrait>(db: &C, row: Model) -> Result<(), DbErr> {
    let active = ActiveModel {
        day: Set(row.day),
        total_requests: Set(row.total_requests),
        approved_count: Set(row.approved_count),
        rejected_count: Set(row.rejected_count),
        completed_count: Set(row.completed_count),
        cancelled_count: Set(row.cancelled_count),
        defective_count: Set(row.defective_count),
        damaged_count: Set(row.damaged_count),
        no_fault_count: Set(row.no_fault_count),
        wrong_item_count: Set(row.wrong_item_count),
        refunded_cents: Set(row.refunded_cents),
        avg_validation_hours: Set(row.avg_validation_hours),
        avg_inspection_hours: Set(row.avg_inspection_hours),
        avg_cycle_hours: Set(row.avg_cycle_hours),
        computed_at: Set(row.computed_at),
    };
    active.insert(db).await?;
    Ok(())
}
