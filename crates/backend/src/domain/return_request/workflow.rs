//! Операции жизненного цикла заявки.
//!
//! Каждая операция — одна транзакция: проверка перехода по таблице,
//! CAS-смена статуса, побочные эффекты этапа и запись журнала вместе
//! коммитятся или вместе откатываются. Инвентарь трогает одна-единственная
//! операция — complete_refund, и только на переходе PROCESSING→COMPLETED.

use chrono::Duration;
use contracts::domain::common::Actor;
use contracts::domain::refund::Refund;
use contracts::domain::return_request::{
    DispositionDecision, InspectionOutcome, RefundOutcome, ReturnRequest, ReturnRequestId,
    ShippingUpdate,
};
use contracts::enums::{Disposition, RefundMethod, ReturnStatus, WorkflowAction};
use sea_orm::{ConnectionTrait, DatabaseConnection, TransactionTrait};
use serde_json::json;

use super::{repository, transitions};
use crate::domain::activity;
use crate::domain::error::{Result, WorkflowError};
use crate::domain::product::adjuster;
use crate::domain::refund;
use crate::domain::sale;

/// Проверить действие по таблице переходов и применить его через CAS.
/// Нулевой CAS означает, что статус увели из-под нас конкурентно.
async fn advance<C: ConnectionTrait>(
    db: &C,
    request: &ReturnRequest,
    action: WorkflowAction,
) -> Result<ReturnStatus> {
    let to = transitions::next_status(request.status, action)?;
    if !repository::cas_status(db, request.id, request.status, to).await? {
        return Err(WorkflowError::PersistenceConflict);
    }
    Ok(to)
}

/// Провалидировать заявку: обе валидационные дуги одной транзакцией.
///
/// SUBMITTED→VALIDATING, затем проверки пригодности, затем
/// VALIDATING→APPROVED либо VALIDATING→REJECTED. Гарантийное окно
/// отсчитывается от момента подачи заявки, а не от момента валидации.
/// Провал проверок — не ошибка вызова: заявка закрывается как REJECTED.
pub async fn validate(
    db: &DatabaseConnection,
    actor: &Actor,
    id: ReturnRequestId,
    warranty_days: i64,
    notes: Option<String>,
) -> Result<ReturnRequest> {
    let txn = db.begin().await?;
    let mut request = repository::get_required(&txn, id).await?;

    let submitted = request.status;
    let validating = advance(&txn, &request, WorkflowAction::Validate).await?;
    activity::repository::append(
        &txn,
        id,
        WorkflowAction::Validate,
        Some(submitted),
        validating,
        actor,
        None,
        None,
    )
    .await?;
    request.status = validating;

    let sale = sale::repository::get(&txn, request.sale_id)
        .await?
        .ok_or_else(|| WorkflowError::not_found("sale", request.sale_id))?;

    let within_warranty =
        request.created_at - sale.sale_time <= Duration::days(warranty_days);
    let ownership_verified = sale.user_id == request.user_id;
    let approved = within_warranty && ownership_verified;

    let mut failures = Vec::new();
    if !within_warranty {
        failures.push("warranty window expired");
    }
    if !ownership_verified {
        failures.push("sale belongs to a different customer");
    }

    request.within_warranty = Some(within_warranty);
    request.ownership_verified = Some(ownership_verified);
    request.validation_notes = notes.or_else(|| {
        if failures.is_empty() {
            None
        } else {
            Some(failures.join("; "))
        }
    });

    let action = if approved {
        WorkflowAction::Approve
    } else {
        WorkflowAction::Reject
    };
    let outcome = advance(&txn, &request, action).await?;
    request.status = outcome;
    if outcome.is_terminal() {
        request.close();
    } else {
        request.touch_updated();
    }
    repository::update(&txn, &request).await?;

    activity::repository::append(
        &txn,
        id,
        action,
        Some(validating),
        outcome,
        actor,
        request.validation_notes.clone(),
        Some(json!({
            "withinWarranty": within_warranty,
            "ownershipVerified": ownership_verified,
        })),
    )
    .await?;

    txn.commit().await?;

    tracing::info!("Return request {} validated: {}", request.code, outcome);
    Ok(request)
}

/// APPROVED→SHIPPING: зафиксировать перевозчика и трек-номер
pub async fn update_shipping(
    db: &DatabaseConnection,
    actor: &Actor,
    id: ReturnRequestId,
    update: ShippingUpdate,
) -> Result<ReturnRequest> {
    if update.carrier.trim().is_empty() || update.tracking_code.trim().is_empty() {
        return Err(WorkflowError::Validation(
            "carrier and tracking code are required".into(),
        ));
    }

    let txn = db.begin().await?;
    let mut request = repository::get_required(&txn, id).await?;

    let from = request.status;
    let to = advance(&txn, &request, WorkflowAction::UpdateShipping).await?;
    request.status = to;
    request.carrier = Some(update.carrier.clone());
    request.tracking_code = Some(update.tracking_code.clone());
    request.touch_updated();
    repository::update(&txn, &request).await?;

    activity::repository::append(
        &txn,
        id,
        WorkflowAction::UpdateShipping,
        Some(from),
        to,
        actor,
        None,
        Some(json!({
            "carrier": update.carrier,
            "trackingCode": update.tracking_code,
        })),
    )
    .await?;

    txn.commit().await?;
    Ok(request)
}

/// SHIPPING→RECEIVED: склад подтвердил физическое получение
pub async fn mark_received(
    db: &DatabaseConnection,
    actor: &Actor,
    id: ReturnRequestId,
) -> Result<ReturnRequest> {
    let txn = db.begin().await?;
    let mut request = repository::get_required(&txn, id).await?;

    let from = request.status;
    let to = advance(&txn, &request, WorkflowAction::MarkReceived).await?;
    request.status = to;
    request.touch_updated();

    activity::repository::append(
        &txn,
        id,
        WorkflowAction::MarkReceived,
        Some(from),
        to,
        actor,
        None,
        None,
    )
    .await?;

    txn.commit().await?;
    Ok(request)
}

/// RECEIVED→INSPECTING
pub async fn start_inspection(
    db: &DatabaseConnection,
    actor: &Actor,
    id: ReturnRequestId,
) -> Result<ReturnRequest> {
    let txn = db.begin().await?;
    let mut request = repository::get_required(&txn, id).await?;

    let from = request.status;
    let to = advance(&txn, &request, WorkflowAction::StartInspection).await?;
    request.status = to;
    request.touch_updated();

    activity::repository::append(
        &txn,
        id,
        WorkflowAction::StartInspection,
        Some(from),
        to,
        actor,
        None,
        None,
    )
    .await?;

    txn.commit().await?;
    Ok(request)
}

/// INSPECTING→INSPECTED: зафиксировать вердикт инспектора
pub async fn complete_inspection(
    db: &DatabaseConnection,
    actor: &Actor,
    id: ReturnRequestId,
    outcome: InspectionOutcome,
) -> Result<ReturnRequest> {
    let txn = db.begin().await?;
    let mut request = repository::get_required(&txn, id).await?;

    let from = request.status;
    let to = advance(&txn, &request, WorkflowAction::CompleteInspection).await?;
    request.status = to;
    request.inspection_result = Some(outcome.result);
    request.inspection_notes = outcome.notes.clone();
    request.touch_updated();
    repository::update(&txn, &request).await?;

    activity::repository::append(
        &txn,
        id,
        WorkflowAction::CompleteInspection,
        Some(from),
        to,
        actor,
        outcome.notes,
        Some(json!({ "result": outcome.result.code() })),
    )
    .await?;

    txn.commit().await?;
    Ok(request)
}

/// INSPECTED→DISPOSITION: принять решение по товару.
///
/// Для денежных решений считается сумма возмещения: Σ(количество × цена
/// строки), но не больше оплаченного итога продажи. Явно переданная сумма
/// обязана не превышать этот потолок. Здесь же создаётся PENDING-строка
/// возмещения; неденежные решения строку не создают.
pub async fn set_disposition(
    db: &DatabaseConnection,
    actor: &Actor,
    id: ReturnRequestId,
    decision: DispositionDecision,
) -> Result<ReturnRequest> {
    let txn = db.begin().await?;
    let mut request = repository::get_required(&txn, id).await?;

    let from = request.status;
    let to = advance(&txn, &request, WorkflowAction::SetDisposition).await?;
    request.status = to;
    request.disposition = Some(decision.disposition);

    let mut metadata = json!({ "disposition": decision.disposition.code() });
    if decision.disposition.is_monetary() {
        let amount = resolve_refund_amount(&txn, &request, decision.refund_amount_cents).await?;
        let method = decision.method.unwrap_or(match decision.disposition {
            Disposition::StoreCredit => RefundMethod::StoreCredit,
            _ => RefundMethod::OriginalPayment,
        });
        request.refund_amount_cents = Some(amount);

        let pending = Refund::new_pending(id, amount, method);
        pending.validate().map_err(WorkflowError::Validation)?;
        refund::repository::insert(&txn, &pending).await?;

        metadata = json!({
            "disposition": decision.disposition.code(),
            "refundAmountCents": amount,
            "method": method.code(),
        });
    }

    request.touch_updated();
    repository::update(&txn, &request).await?;

    activity::repository::append(
        &txn,
        id,
        WorkflowAction::SetDisposition,
        Some(from),
        to,
        actor,
        None,
        Some(metadata),
    )
    .await?;

    txn.commit().await?;

    tracing::info!(
        "Return request {} disposition: {}",
        request.code,
        decision.disposition
    );
    Ok(request)
}

/// Сумма возмещения по позициям заявки с потолком в оплаченный итог продажи
async fn resolve_refund_amount<C: ConnectionTrait>(
    db: &C,
    request: &ReturnRequest,
    explicit: Option<i64>,
) -> Result<i64> {
    let sale = sale::repository::get(db, request.sale_id)
        .await?
        .ok_or_else(|| WorkflowError::not_found("sale", request.sale_id))?;
    let sale_items = sale::repository::get_items(db, sale.id).await?;
    let items = repository::list_items(db, request.id).await?;

    let mut line_total: i64 = 0;
    for item in &items {
        let sale_item = sale_items
            .iter()
            .find(|si| si.id == item.sale_item_id)
            .ok_or_else(|| WorkflowError::not_found("sale item", item.sale_item_id))?;
        line_total += i64::from(item.quantity) * sale_item.price_cents;
    }
    let cap = line_total.min(sale.total_cents);

    match explicit {
        Some(amount) if amount < 0 => Err(WorkflowError::Validation(
            "refund amount cannot be negative".into(),
        )),
        Some(amount) if amount > cap => Err(WorkflowError::Validation(format!(
            "refund amount {} exceeds the allowed cap {}",
            amount, cap
        ))),
        Some(amount) => Ok(amount),
        None => Ok(cap),
    }
}

/// DISPOSITION→PROCESSING: заявка уходит в обработку.
///
/// Для денежных решений строка возмещения переводится в PROCESSING.
/// Повторная попытка после неудачи — это повторный complete_refund,
/// отдельного перехода для неё нет.
pub async fn process_refund(
    db: &DatabaseConnection,
    actor: &Actor,
    id: ReturnRequestId,
) -> Result<ReturnRequest> {
    let txn = db.begin().await?;
    let mut request = repository::get_required(&txn, id).await?;

    let from = request.status;
    let to = advance(&txn, &request, WorkflowAction::ProcessRefund).await?;
    request.status = to;
    request.touch_updated();

    let monetary = request.disposition.map_or(false, |d| d.is_monetary());
    let flipped = refund::repository::mark_processing(&txn, id).await?;
    if monetary && !flipped {
        return Err(WorkflowError::not_found("refund", id));
    }

    activity::repository::append(
        &txn,
        id,
        WorkflowAction::ProcessRefund,
        Some(from),
        to,
        actor,
        None,
        None,
    )
    .await?;

    txn.commit().await?;
    Ok(request)
}

/// Завершить обработку заявки по исходу платёжного контура.
///
/// Успех — PROCESSING→COMPLETED одной транзакцией: возмещение закрывается,
/// инвентарь применяется по решению ровно один раз, для REFUND продажа
/// помечается REFUNDED, для REPLACEMENT создаётся нулевая продажа-замена.
/// Неудача статус НЕ меняет: строка возмещения уходит в FAILED с текстом
/// ошибки, попытку можно повторить этим же вызовом.
pub async fn complete_refund(
    db: &DatabaseConnection,
    actor: &Actor,
    id: ReturnRequestId,
    outcome: RefundOutcome,
) -> Result<ReturnRequest> {
    let txn = db.begin().await?;
    let mut request = repository::get_required(&txn, id).await?;

    if !outcome.success {
        // допустимость действия проверяем, не применяя переход
        transitions::next_status(request.status, WorkflowAction::CompleteRefund)?;

        let error = outcome
            .error
            .unwrap_or_else(|| "refund attempt failed".to_string());
        refund::repository::fail(&txn, id, &error).await?;
        activity::repository::append(
            &txn,
            id,
            WorkflowAction::CompleteRefund,
            Some(request.status),
            request.status,
            actor,
            Some(error),
            Some(json!({ "success": false })),
        )
        .await?;
        txn.commit().await?;

        tracing::warn!("Return request {} refund attempt failed", request.code);
        return Ok(request);
    }

    let from = request.status;
    let to = advance(&txn, &request, WorkflowAction::CompleteRefund).await?;
    let disposition = request
        .disposition
        .ok_or_else(|| WorkflowError::Validation("request has no disposition".into()))?;

    if disposition.is_monetary() {
        refund::repository::complete(&txn, id, outcome.gateway_ref.as_deref()).await?;
    }

    let items = repository::list_items(&txn, id).await?;
    let adjustments = adjuster::plan(disposition, &items);
    adjuster::apply(&txn, &adjustments).await?;

    let mut notes = None;
    match disposition {
        Disposition::Refund => {
            sale::repository::mark_refunded(&txn, request.sale_id).await?;
        }
        Disposition::Replacement => {
            let lines: Vec<(i64, i32)> =
                items.iter().map(|i| (i.product_id, i.quantity)).collect();
            let replacement_id =
                sale::repository::insert_replacement(&txn, request.user_id, &lines).await?;
            notes = Some(format!("Replacement order created: #{}", replacement_id));
        }
        _ => {}
    }

    request.status = to;
    request.close();
    repository::update(&txn, &request).await?;

    activity::repository::append(
        &txn,
        id,
        WorkflowAction::CompleteRefund,
        Some(from),
        to,
        actor,
        notes,
        Some(json!({
            "success": true,
            "gatewayRef": outcome.gateway_ref,
        })),
    )
    .await?;

    txn.commit().await?;

    tracing::info!("Return request {} completed ({})", request.code, disposition);
    Ok(request)
}

/// Отменить заявку. Разрешено только из SUBMITTED и APPROVED — после
/// передачи товара в доставку отмена невозможна.
pub async fn cancel(
    db: &DatabaseConnection,
    actor: &Actor,
    id: ReturnRequestId,
    reason: Option<String>,
) -> Result<ReturnRequest> {
    let txn = db.begin().await?;
    let mut request = repository::get_required(&txn, id).await?;

    let from = request.status;
    let to = advance(&txn, &request, WorkflowAction::Cancel).await?;
    request.status = to;
    request.close();
    repository::update(&txn, &request).await?;

    activity::repository::append(
        &txn,
        id,
        WorkflowAction::Cancel,
        Some(from),
        to,
        actor,
        reason,
        None,
    )
    .await?;

    txn.commit().await?;

    tracing::info!("Return request {} cancelled", request.code);
    Ok(request)
}
