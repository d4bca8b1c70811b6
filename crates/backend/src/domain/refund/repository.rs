use chrono::Utc;
use contracts::domain::common::AggregateId;
use contracts::domain::refund::{Refund, RefundId};
use contracts::domain::return_request::ReturnRequestId;
use contracts::enums::{RefundMethod, RefundStatus};
use sea_orm::entity::prelude::*;
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, FromQueryResult, QueryFilter, Set, Statement};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, serde::Serialize, serde::Deserialize)]
#[sea_orm(table_name = "refund")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub request_id: String,
    pub amount_cents: i64,
    pub method: String,
    pub status: String,
    pub gateway_ref: Option<String>,
    pub error: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Refund {
    type Error = DbErr;

    fn try_from(m: Model) -> Result<Self, DbErr> {
        let id = RefundId::from_string(&m.id).map_err(DbErr::Custom)?;
        let request_id = ReturnRequestId::from_string(&m.request_id).map_err(DbErr::Custom)?;
        let method = RefundMethod::from_code(&m.method)
            .ok_or_else(|| DbErr::Custom(format!("unknown refund method: {}", m.method)))?;
        let status = RefundStatus::from_code(&m.status)
            .ok_or_else(|| DbErr::Custom(format!("unknown refund status: {}", m.status)))?;
        Ok(Refund {
            id,
            request_id,
            amount_cents: m.amount_cents,
            method,
            status,
            gateway_ref: m.gateway_ref,
            error: m.error,
            created_at: m.created_at,
            updated_at: m.updated_at,
        })
    }
}

pub async fn insert<C: ConnectionTrait>(db: &C, refund: &Refund) -> Result<(), DbErr> {
    let active = ActiveModel {
        id: Set(refund.id.as_string()),
        request_id: Set(refund.request_id.as_string()),
        amount_cents: Set(refund.amount_cents),
        method: Set(refund.method.code().to_string()),
        status: Set(refund.status.code().to_string()),
        gateway_ref: Set(refund.gateway_ref.clone()),
        error: Set(refund.error.clone()),
        created_at: Set(refund.created_at),
        updated_at: Set(refund.updated_at),
    };
    active.insert(db).await?;
    Ok(())
}

pub async fn get_by_request<C: ConnectionTrait>(
    db: &C,
    request_id: ReturnRequestId,
) -> Result<Option<Refund>, DbErr> {
    let found = Entity::find()
        .filter(Column::RequestId.eq(request_id.as_string()))
        .one(db)
        .await?;
    found.map(TryInto::try_into).transpose()
}

/// PENDING/FAILED -> PROCESSING при входе заявки в обработку
pub async fn mark_processing<C: ConnectionTrait>(
    db: &C,
    request_id: ReturnRequestId,
) -> Result<bool, DbErr> {
    let res = Entity::update_many()
        .col_expr(Column::Status, Expr::value(RefundStatus::Processing.code()))
        .col_expr(Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(Column::RequestId.eq(request_id.as_string()))
        .filter(Column::Status.is_in([
            RefundStatus::Pending.code(),
            RefundStatus::Failed.code(),
        ]))
        .exec(db)
        .await?;
    Ok(res.rows_affected > 0)
}

/// Зафиксировать успешный исход: COMPLETED с референсом контура,
/// текст прошлой ошибки очищается
pub async fn complete<C: ConnectionTrait>(
    db: &C,
    request_id: ReturnRequestId,
    gateway_ref: Option<&str>,
) -> Result<bool, DbErr> {
    let res = Entity::update_many()
        .col_expr(Column::Status, Expr::value(RefundStatus::Completed.code()))
        .col_expr(Column::GatewayRef, Expr::value(gateway_ref.map(str::to_string)))
        .col_expr(Column::Error, Expr::value(Option::<String>::None))
        .col_expr(Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(Column::RequestId.eq(request_id.as_string()))
        .exec(db)
        .await?;
    Ok(res.rows_affected > 0)
}

/// Зафиксировать неудачную попытку: FAILED с текстом ошибки
pub async fn fail<C: ConnectionTrait>(
    db: &C,
    request_id: ReturnRequestId,
    error: &str,
) -> Result<bool, DbErr> {
    let res = Entity::update_many()
        .col_expr(Column::Status, Expr::value(RefundStatus::Failed.code()))
        .col_expr(Column::Error, Expr::value(error))
        .col_expr(Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(Column::RequestId.eq(request_id.as_string()))
        .exec(db)
        .await?;
    Ok(res.rows_affected > 0)
}

/// Сумма завершённых возмещений кредитом магазина по покупателю
pub async fn completed_store_credit_total<C: ConnectionTrait>(
    db: &C,
    user_id: i64,
) -> Result<i64, DbErr> {
    #[derive(Debug, FromQueryResult)]
    struct TotalRow {
        total: i64,
    }

    let sql = r#"
        SELECT COALESCE(SUM(r.amount_cents), 0) AS total
        FROM refund r
        JOIN rma_request q ON q.id = r.request_id
        WHERE q.user_id = ? AND r.status = 'COMPLETED' AND r.method = 'STORE_CREDIT'
    "#;
    let stmt = Statement::from_sql_and_values(sea_orm::DatabaseBackend::Sqlite, sql, [user_id.into()]);
    let row = TotalRow::find_by_statement(stmt).one(db).await?;
    Ok(row.map(|r| r.total).unwrap_or(0))
}
