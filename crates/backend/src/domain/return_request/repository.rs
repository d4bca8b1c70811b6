//! Хранилище заявок на возврат. Статус заявки меняется ТОЛЬКО через
//! cas_status(): сравнение с ожидаемым статусом и запись нового одним
//! UPDATE. update() намеренно не трогает колонку статуса.

use chrono::{NaiveDate, Utc};
use contracts::domain::common::AggregateId;
use contracts::domain::return_request::{ReturnItem, ReturnRequest, ReturnRequestId};
use contracts::enums::{Disposition, InspectionResult, ReturnReason, ReturnStatus};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseBackend, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, Statement,
};
use uuid::Uuid;

use crate::domain::error::{Result as WorkflowResult, WorkflowError};

pub mod rma_request {
    use sea_orm::entity::prelude::*;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "rma_request")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: String,
        pub code: String,
        pub sale_id: i64,
        pub user_id: i64,
        pub reason: String,
        pub description: String,
        /// JSON-массив ссылок на подтверждения
        pub evidence_urls: String,
        pub status: String,
        pub within_warranty: Option<bool>,
        pub ownership_verified: Option<bool>,
        pub validation_notes: Option<String>,
        pub carrier: Option<String>,
        pub tracking_code: Option<String>,
        pub inspection_result: Option<String>,
        pub inspection_notes: Option<String>,
        pub disposition: Option<String>,
        pub refund_amount_cents: Option<i64>,
        pub created_at: chrono::DateTime<chrono::Utc>,
        pub updated_at: chrono::DateTime<chrono::Utc>,
        pub closed_at: Option<chrono::DateTime<chrono::Utc>>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod rma_item {
    use sea_orm::entity::prelude::*;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "rma_item")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: String,
        pub request_id: String,
        pub sale_item_id: i64,
        pub product_id: i64,
        pub quantity: i32,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

impl TryFrom<rma_request::Model> for ReturnRequest {
    type Error = DbErr;

    fn try_from(m: rma_request::Model) -> Result<Self, DbErr> {
        let id = ReturnRequestId::from_string(&m.id).map_err(DbErr::Custom)?;
        let reason = ReturnReason::from_code(&m.reason)
            .ok_or_else(|| DbErr::Custom(format!("unknown return reason: {}", m.reason)))?;
        let status = ReturnStatus::from_code(&m.status)
            .ok_or_else(|| DbErr::Custom(format!("unknown status code: {}", m.status)))?;
        let evidence_urls: Vec<String> = serde_json::from_str(&m.evidence_urls)
            .map_err(|e| DbErr::Custom(format!("bad evidence_urls json: {}", e)))?;
        let inspection_result = m
            .inspection_result
            .map(|code| {
                InspectionResult::from_code(&code)
                    .ok_or_else(|| DbErr::Custom(format!("unknown inspection result: {}", code)))
            })
            .transpose()?;
        let disposition = m
            .disposition
            .map(|code| {
                Disposition::from_code(&code)
                    .ok_or_else(|| DbErr::Custom(format!("unknown disposition: {}", code)))
            })
            .transpose()?;

        Ok(ReturnRequest {
            id,
            code: m.code,
            sale_id: m.sale_id,
            user_id: m.user_id,
            reason,
            description: m.description,
            evidence_urls,
            status,
            within_warranty: m.within_warranty,
            ownership_verified: m.ownership_verified,
            validation_notes: m.validation_notes,
            carrier: m.carrier,
            tracking_code: m.tracking_code,
            inspection_result,
            inspection_notes: m.inspection_notes,
            disposition,
            refund_amount_cents: m.refund_amount_cents,
            created_at: m.created_at,
            updated_at: m.updated_at,
            closed_at: m.closed_at,
        })
    }
}

impl TryFrom<rma_item::Model> for ReturnItem {
    type Error = DbErr;

    fn try_from(m: rma_item::Model) -> Result<Self, DbErr> {
        let id = Uuid::parse_str(&m.id).map_err(|e| DbErr::Custom(format!("bad item id: {}", e)))?;
        let request_id = ReturnRequestId::from_string(&m.request_id).map_err(DbErr::Custom)?;
        Ok(ReturnItem {
            id,
            request_id,
            sale_item_id: m.sale_item_id,
            product_id: m.product_id,
            quantity: m.quantity,
        })
    }
}

/// Вставить шапку заявки вместе с позициями. Нарушение частичного
/// уникального индекса по sale_id всплывает как DbErr и означает,
/// что активная заявка уже существует.
pub async fn insert_with_items<C: ConnectionTrait>(
    db: &C,
    request: &ReturnRequest,
    items: &[ReturnItem],
) -> Result<(), DbErr> {
    let evidence_urls = serde_json::to_string(&request.evidence_urls)
        .map_err(|e| DbErr::Custom(format!("evidence_urls serialization: {}", e)))?;

    let active = rma_request::ActiveModel {
        id: Set(request.id.as_string()),
        code: Set(request.code.clone()),
        sale_id: Set(request.sale_id),
        user_id: Set(request.user_id),
        reason: Set(request.reason.code().to_string()),
        description: Set(request.description.clone()),
        evidence_urls: Set(evidence_urls),
        status: Set(request.status.code().to_string()),
        within_warranty: Set(request.within_warranty),
        ownership_verified: Set(request.ownership_verified),
        validation_notes: Set(request.validation_notes.clone()),
        carrier: Set(request.carrier.clone()),
        tracking_code: Set(request.tracking_code.clone()),
        inspection_result: Set(request.inspection_result.map(|r| r.code().to_string())),
        inspection_notes: Set(request.inspection_notes.clone()),
        disposition: Set(request.disposition.map(|d| d.code().to_string())),
        refund_amount_cents: Set(request.refund_amount_cents),
        created_at: Set(request.created_at),
        updated_at: Set(request.updated_at),
        closed_at: Set(request.closed_at),
    };
    active.insert(db).await?;

    for item in items {
        let active = rma_item::ActiveModel {
            id: Set(item.id.to_string()),
            request_id: Set(item.request_id.as_string()),
            sale_item_id: Set(item.sale_item_id),
            product_id: Set(item.product_id),
            quantity: Set(item.quantity),
        };
        active.insert(db).await?;
    }
    Ok(())
}

pub async fn get<C: ConnectionTrait>(
    db: &C,
    id: ReturnRequestId,
) -> Result<Option<ReturnRequest>, DbErr> {
    let result = rma_request::Entity::find_by_id(id.as_string()).one(db).await?;
    result.map(TryInto::try_into).transpose()
}

/// Как get(), но отсутствие заявки — доменная ошибка
pub async fn get_required<C: ConnectionTrait>(
    db: &C,
    id: ReturnRequestId,
) -> WorkflowResult<ReturnRequest> {
    get(db, id)
        .await?
        .ok_or_else(|| WorkflowError::not_found("return request", id))
}

pub async fn get_by_code<C: ConnectionTrait>(
    db: &C,
    code: &str,
) -> Result<Option<ReturnRequest>, DbErr> {
    let result = rma_request::Entity::find()
        .filter(rma_request::Column::Code.eq(code))
        .one(db)
        .await?;
    result.map(TryInto::try_into).transpose()
}

/// Заявки покупателя, новые сверху. Код заявки монотонен внутри дня,
/// поэтому годится как вторичный ключ сортировки.
pub async fn list_by_customer<C: ConnectionTrait>(
    db: &C,
    user_id: i64,
    status: Option<ReturnStatus>,
) -> Result<Vec<ReturnRequest>, DbErr> {
    let mut query = rma_request::Entity::find().filter(rma_request::Column::UserId.eq(user_id));
    if let Some(status) = status {
        query = query.filter(rma_request::Column::Status.eq(status.code()));
    }
    query
        .order_by_desc(rma_request::Column::CreatedAt)
        .order_by_desc(rma_request::Column::Code)
        .all(db)
        .await?
        .into_iter()
        .map(TryInto::try_into)
        .collect()
}

/// Есть ли по продаже незакрытая заявка
pub async fn active_exists_for_sale<C: ConnectionTrait>(
    db: &C,
    sale_id: i64,
) -> Result<bool, DbErr> {
    let terminal: Vec<&str> = ReturnStatus::all()
        .into_iter()
        .filter(ReturnStatus::is_terminal)
        .map(|s| s.code())
        .collect();
    let count = rma_request::Entity::find()
        .filter(rma_request::Column::SaleId.eq(sale_id))
        .filter(rma_request::Column::Status.is_not_in(terminal))
        .count(db)
        .await?;
    Ok(count > 0)
}

/// Атомарная смена статуса: UPDATE с проверкой ожидаемого статуса
/// в WHERE. false — строка уже ушла из ожидаемого статуса.
pub async fn cas_status<C: ConnectionTrait>(
    db: &C,
    id: ReturnRequestId,
    from: ReturnStatus,
    to: ReturnStatus,
) -> Result<bool, DbErr> {
    let result = rma_request::Entity::update_many()
        .col_expr(rma_request::Column::Status, Expr::value(to.code()))
        .col_expr(rma_request::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(rma_request::Column::Id.eq(id.as_string()))
        .filter(rma_request::Column::Status.eq(from.code()))
        .exec(db)
        .await?;
    Ok(result.rows_affected > 0)
}

/// Записать поля этапов заявки. Статус не пишется: NotSet держит
/// колонку за cas_status().
pub async fn update<C: ConnectionTrait>(db: &C, request: &ReturnRequest) -> Result<(), DbErr> {
    let evidence_urls = serde_json::to_string(&request.evidence_urls)
        .map_err(|e| DbErr::Custom(format!("evidence_urls serialization: {}", e)))?;

    let active = rma_request::ActiveModel {
        id: Set(request.id.as_string()),
        code: sea_orm::ActiveValue::NotSet,
        sale_id: sea_orm::ActiveValue::NotSet,
        user_id: sea_orm::ActiveValue::NotSet,
        reason: Set(request.reason.code().to_string()),
        description: Set(request.description.clone()),
        evidence_urls: Set(evidence_urls),
        status: sea_orm::ActiveValue::NotSet,
        within_warranty: Set(request.within_warranty),
        ownership_verified: Set(request.ownership_verified),
        validation_notes: Set(request.validation_notes.clone()),
        carrier: Set(request.carrier.clone()),
        tracking_code: Set(request.tracking_code.clone()),
        inspection_result: Set(request.inspection_result.map(|r| r.code().to_string())),
        inspection_notes: Set(request.inspection_notes.clone()),
        disposition: Set(request.disposition.map(|d| d.code().to_string())),
        refund_amount_cents: Set(request.refund_amount_cents),
        created_at: sea_orm::ActiveValue::NotSet,
        updated_at: Set(request.updated_at),
        closed_at: Set(request.closed_at),
    };
    rma_request::Entity::update(active).exec(db).await?;
    Ok(())
}

/// Позиции заявки в порядке добавления
pub async fn list_items<C: ConnectionTrait>(
    db: &C,
    request_id: ReturnRequestId,
) -> Result<Vec<ReturnItem>, DbErr> {
    rma_item::Entity::find()
        .filter(rma_item::Column::RequestId.eq(request_id.as_string()))
        .order_by_asc(rma_item::Column::SaleItemId)
        .all(db)
        .await?
        .into_iter()
        .map(TryInto::try_into)
        .collect()
}

/// Следующий номер заявки за день: RMA-<ГГГГММДД>-<NNNN>.
///
/// Счётчик живёт в rma_sequence и растёт атомарным upsert-ом с
/// RETURNING, поэтому два конкурентных submit никогда не получат
/// один номер.
pub async fn next_reference_code<C: ConnectionTrait>(
    db: &C,
    day: NaiveDate,
) -> Result<String, DbErr> {
    let stmt = Statement::from_sql_and_values(
        DatabaseBackend::Sqlite,
        r#"
        INSERT INTO rma_sequence (day, value) VALUES (?, 1)
        ON CONFLICT(day) DO UPDATE SET value = value + 1
        RETURNING value
        "#,
        [day.format("%Y-%m-%d").to_string().into()],
    );
    let row = db
        .query_one(stmt)
        .await?
        .ok_or_else(|| DbErr::Custom("rma_sequence upsert returned no row".into()))?;
    let value: i64 = row.try_get("", "value")?;
    Ok(format!("RMA-{}-{:04}", day.format("%Y%m%d"), value))
}
