//! Подача заявки и чтение. Переходы жизненного цикла живут в workflow.

use chrono::Utc;
use contracts::domain::common::Actor;
use contracts::domain::return_request::{
    ReturnItem, ReturnRequest, ReturnRequestDetail, ReturnRequestId, SubmitReturnRequest,
};
use contracts::enums::{ActorRole, ReturnStatus, WorkflowAction};
use sea_orm::{DatabaseConnection, TransactionTrait};
use serde_json::json;

use super::repository;
use crate::domain::activity;
use crate::domain::error::{is_unique_violation, Result, WorkflowError};
use crate::domain::refund;
use crate::domain::sale;

/// Принять заявку на возврат.
///
/// Проверки, номер заявки, вставка шапки с позициями и запись журнала
/// выполняются одной транзакцией. Гонку двух одновременных подач по одной
/// продаже закрывает частичный уникальный индекс: проигравшая вставка
/// падает и отображается в DuplicateSubmission.
pub async fn submit(
    db: &DatabaseConnection,
    actor: &Actor,
    dto: SubmitReturnRequest,
) -> Result<ReturnRequest> {
    dto.validate().map_err(WorkflowError::Validation)?;

    let txn = db.begin().await?;

    let sale = sale::repository::get(&txn, dto.sale_id)
        .await?
        .ok_or_else(|| WorkflowError::not_found("sale", dto.sale_id))?;

    // Покупатель подаёт только по своей продаже; заявки сотрудников
    // проходят проверку принадлежности на этапе валидации
    if actor.role == ActorRole::Customer && actor.id != sale.user_id.to_string() {
        return Err(WorkflowError::EligibilityFailed {
            reason: format!("sale {} belongs to another customer", sale.id),
        });
    }

    let sale_items = sale::repository::get_items(&txn, sale.id).await?;
    let mut lines = Vec::with_capacity(dto.items.len());
    for item in &dto.items {
        let sale_item = sale_items
            .iter()
            .find(|si| si.id == item.sale_item_id)
            .ok_or_else(|| WorkflowError::not_found("sale item", item.sale_item_id))?;
        if item.quantity > sale_item.quantity {
            return Err(WorkflowError::QuantityExceeded {
                product_id: sale_item.product_id,
                requested: item.quantity,
                available: sale_item.quantity,
            });
        }
        lines.push((sale_item.product_id, item.sale_item_id, item.quantity));
    }

    // Дружественная проверка до вставки; гонку всё равно решает индекс
    if repository::active_exists_for_sale(&txn, sale.id).await? {
        return Err(WorkflowError::DuplicateSubmission { sale_id: sale.id });
    }

    let code = repository::next_reference_code(&txn, Utc::now().date_naive()).await?;

    let mut request = ReturnRequest::new_for_submit(
        code,
        sale.id,
        sale.user_id,
        dto.reason,
        dto.description,
        dto.evidence_urls,
    );
    request.validate().map_err(WorkflowError::Validation)?;
    request.before_write();

    let items: Vec<ReturnItem> = lines
        .iter()
        .map(|&(product_id, sale_item_id, quantity)| {
            ReturnItem::new(request.id, sale_item_id, product_id, quantity)
        })
        .collect();

    if let Err(err) = repository::insert_with_items(&txn, &request, &items).await {
        return Err(if is_unique_violation(&err) {
            WorkflowError::DuplicateSubmission { sale_id: sale.id }
        } else {
            err.into()
        });
    }

    activity::repository::append(
        &txn,
        request.id,
        WorkflowAction::Submit,
        None,
        ReturnStatus::Submitted,
        actor,
        None,
        Some(json!({ "saleId": sale.id, "itemCount": items.len() })),
    )
    .await?;

    txn.commit().await?;

    tracing::info!(
        "Return request {} submitted for sale {} ({} items)",
        request.code,
        sale.id,
        items.len()
    );
    Ok(request)
}

/// Полный снимок заявки: шапка, позиции, возмещение, журнал
pub async fn get_detail(
    db: &DatabaseConnection,
    id: ReturnRequestId,
) -> Result<ReturnRequestDetail> {
    let request = repository::get_required(db, id).await?;
    let items = repository::list_items(db, id).await?;
    let refund = refund::repository::get_by_request(db, id).await?;
    let activity = activity::repository::list_for_request(db, id).await?;
    Ok(ReturnRequestDetail {
        request,
        items,
        refund,
        activity,
    })
}

/// Поиск по человекочитаемому номеру
pub async fn get_by_code(db: &DatabaseConnection, code: &str) -> Result<ReturnRequest> {
    repository::get_by_code(db, code)
        .await?
        .ok_or_else(|| WorkflowError::NotFound {
            entity: "return request",
            id: code.to_string(),
        })
}

/// Заявки покупателя, новые сверху, с необязательным фильтром по статусу
pub async fn list_by_owner(
    db: &DatabaseConnection,
    user_id: i64,
    status: Option<ReturnStatus>,
) -> Result<Vec<ReturnRequest>> {
    Ok(repository::list_by_customer(db, user_id, status).await?)
}

/// Баланс кредита магазина: сумма завершённых STORE_CREDIT возмещений
pub async fn store_credit_balance(db: &DatabaseConnection, user_id: i64) -> Result<i64> {
    Ok(refund::repository::completed_store_credit_total(db, user_id).await?)
}
