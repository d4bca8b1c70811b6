use crate::domain::activity::ActivityEntry;
use crate::domain::common::AggregateId;
use crate::domain::refund::Refund;
use crate::enums::{
    Disposition, InspectionResult, RefundMethod, ReturnReason, ReturnStatus,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// ID типа для заявки на возврат
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReturnRequestId(pub Uuid);

impl ReturnRequestId {
    pub fn new(value: Uuid) -> Self {
        Self(value)
    }
    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }
    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl AggregateId for ReturnRequestId {
    fn as_string(&self) -> String {
        self.0.to_string()
    }
    fn from_string(s: &str) -> Result<Self, String> {
        Uuid::parse_str(s)
            .map(ReturnRequestId::new)
            .map_err(|e| format!("Invalid UUID: {}", e))
    }
}

impl std::fmt::Display for ReturnRequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Заявка на возврат товара (агрегат).
///
/// Статус меняется только через машину состояний движка; поля этапов
/// (валидация, доставка, инспекция, решение) заполняются по мере
/// прохождения жизненного цикла.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReturnRequest {
    pub id: ReturnRequestId,

    /// Человекочитаемый номер заявки: RMA-<ГГГГММДД>-<NNNN>
    pub code: String,

    /// Ссылка на исходную продажу (sale.id)
    #[serde(rename = "saleId")]
    pub sale_id: i64,

    /// Покупатель, подавший заявку (sale.user_id)
    #[serde(rename = "userId")]
    pub user_id: i64,

    /// Причина возврата
    pub reason: ReturnReason,

    /// Описание проблемы со слов покупателя
    pub description: String,

    /// Ссылки на фото/видео подтверждения
    #[serde(rename = "evidenceUrls")]
    pub evidence_urls: Vec<String>,

    /// Текущий статус жизненного цикла
    pub status: ReturnStatus,

    /// Итог проверки гарантийного окна (заполняется валидацией)
    #[serde(rename = "withinWarranty")]
    pub within_warranty: Option<bool>,

    /// Итог проверки принадлежности продажи покупателю
    #[serde(rename = "ownershipVerified")]
    pub ownership_verified: Option<bool>,

    /// Примечания валидатора
    #[serde(rename = "validationNotes")]
    pub validation_notes: Option<String>,

    /// Перевозчик обратной доставки
    pub carrier: Option<String>,

    /// Трек-номер обратной доставки
    #[serde(rename = "trackingCode")]
    pub tracking_code: Option<String>,

    /// Результат инспекции на складе
    #[serde(rename = "inspectionResult")]
    pub inspection_result: Option<InspectionResult>,

    /// Примечания инспектора
    #[serde(rename = "inspectionNotes")]
    pub inspection_notes: Option<String>,

    /// Принятое решение по товару
    pub disposition: Option<Disposition>,

    /// Сумма возмещения в копейках (для денежных решений)
    #[serde(rename = "refundAmountCents")]
    pub refund_amount_cents: Option<i64>,

    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,

    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,

    /// Момент входа в терминальный статус
    #[serde(rename = "closedAt")]
    pub closed_at: Option<DateTime<Utc>>,
}

impl ReturnRequest {
    pub fn new_for_submit(
        code: String,
        sale_id: i64,
        user_id: i64,
        reason: ReturnReason,
        description: String,
        evidence_urls: Vec<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: ReturnRequestId::new_v4(),
            code,
            sale_id,
            user_id,
            reason,
            description,
            evidence_urls,
            status: ReturnStatus::Submitted,
            within_warranty: None,
            ownership_verified: None,
            validation_notes: None,
            carrier: None,
            tracking_code: None,
            inspection_result: None,
            inspection_notes: None,
            disposition: None,
            refund_amount_cents: None,
            created_at: now,
            updated_at: now,
            closed_at: None,
        }
    }

    pub fn to_string_id(&self) -> String {
        self.id.as_string()
    }

    pub fn touch_updated(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Фиксирует вход в терминальный статус
    pub fn close(&mut self) {
        let now = Utc::now();
        self.closed_at = Some(now);
        self.updated_at = now;
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.code.trim().is_empty() {
            return Err("Номер заявки не может быть пустым".into());
        }
        if self.sale_id <= 0 {
            return Err("Ссылка на продажу обязательна".into());
        }
        if self.user_id <= 0 {
            return Err("Покупатель обязателен".into());
        }
        if let Some(amount) = self.refund_amount_cents {
            if amount < 0 {
                return Err("Сумма возмещения не может быть отрицательной".into());
            }
        }
        Ok(())
    }

    pub fn before_write(&mut self) {
        self.touch_updated();
    }
}

/// Позиция заявки: что именно возвращается и в каком количестве
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReturnItem {
    pub id: Uuid,

    #[serde(rename = "requestId")]
    pub request_id: ReturnRequestId,

    /// Строка исходной продажи (sale_item.id)
    #[serde(rename = "saleItemId")]
    pub sale_item_id: i64,

    #[serde(rename = "productId")]
    pub product_id: i64,

    pub quantity: i32,
}

impl ReturnItem {
    pub fn new(request_id: ReturnRequestId, sale_item_id: i64, product_id: i64, quantity: i32) -> Self {
        Self {
            id: Uuid::new_v4(),
            request_id,
            sale_item_id,
            product_id,
            quantity,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.quantity <= 0 {
            return Err("Количество должно быть положительным".into());
        }
        Ok(())
    }
}

// =============================================================================
// DTO
// =============================================================================

/// Заявка на возврат от покупателя
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitReturnRequest {
    #[serde(rename = "saleId")]
    pub sale_id: i64,
    pub reason: ReturnReason,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "evidenceUrls", default)]
    pub evidence_urls: Vec<String>,
    pub items: Vec<SubmitReturnItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitReturnItem {
    #[serde(rename = "saleItemId")]
    pub sale_item_id: i64,
    pub quantity: i32,
}

impl SubmitReturnRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.items.is_empty() {
            return Err("Заявка должна содержать хотя бы одну позицию".into());
        }
        let mut seen = std::collections::HashSet::new();
        for item in &self.items {
            if item.quantity <= 0 {
                return Err("Количество должно быть положительным".into());
            }
            if !seen.insert(item.sale_item_id) {
                return Err("Строка продажи указана в заявке дважды".into());
            }
        }
        Ok(())
    }
}

/// Данные обратной доставки
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShippingUpdate {
    pub carrier: String,
    #[serde(rename = "trackingCode")]
    pub tracking_code: String,
}

/// Итог инспекции
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InspectionOutcome {
    pub result: InspectionResult,
    pub notes: Option<String>,
}

/// Решение по товару. Для денежных решений сумма по умолчанию
/// считается из строк продажи, но может быть задана явно (не выше лимита).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispositionDecision {
    pub disposition: Disposition,
    #[serde(rename = "refundAmountCents")]
    pub refund_amount_cents: Option<i64>,
    pub method: Option<RefundMethod>,
}

impl DispositionDecision {
    pub fn new(disposition: Disposition) -> Self {
        Self {
            disposition,
            refund_amount_cents: None,
            method: None,
        }
    }
}

/// Зафиксированный исход попытки возмещения (ответ платёжного контура)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefundOutcome {
    pub success: bool,
    #[serde(rename = "gatewayRef")]
    pub gateway_ref: Option<String>,
    pub error: Option<String>,
}

impl RefundOutcome {
    pub fn succeeded(gateway_ref: impl Into<String>) -> Self {
        Self {
            success: true,
            gateway_ref: Some(gateway_ref.into()),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            gateway_ref: None,
            error: Some(error.into()),
        }
    }
}

/// Полный снимок заявки: шапка, позиции, возмещение и журнал активности
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReturnRequestDetail {
    pub request: ReturnRequest,
    pub items: Vec<ReturnItem>,
    pub refund: Option<Refund>,
    pub activity: Vec<ActivityEntry>,
}
