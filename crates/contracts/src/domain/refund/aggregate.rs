use crate::domain::common::AggregateId;
use crate::domain::return_request::ReturnRequestId;
use crate::enums::{RefundMethod, RefundStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// ID типа для записи возмещения
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RefundId(pub Uuid);

impl RefundId {
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

impl AggregateId for RefundId {
    fn as_string(&self) -> String {
        self.0.to_string()
    }
    fn from_string(s: &str) -> Result<Self, String> {
        Uuid::parse_str(s)
            .map(RefundId::new)
            .map_err(|e| format!("Invalid UUID: {}", e))
    }
}

/// Возмещение по заявке. Запись фиксирует намерение и исход,
/// сам платёжный контур остаётся снаружи движка.
/// На заявку существует не более одной записи.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Refund {
    pub id: RefundId,

    #[serde(rename = "requestId")]
    pub request_id: ReturnRequestId,

    /// Сумма в копейках
    #[serde(rename = "amountCents")]
    pub amount_cents: i64,

    pub method: RefundMethod,

    pub status: RefundStatus,

    /// Референс платёжного контура при успехе
    #[serde(rename = "gatewayRef")]
    pub gateway_ref: Option<String>,

    /// Текст ошибки при неудачной попытке
    pub error: Option<String>,

    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,

    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl Refund {
    pub fn new_pending(request_id: ReturnRequestId, amount_cents: i64, method: RefundMethod) -> Self {
        let now = Utc::now();
        Self {
            id: RefundId::new_v4(),
            request_id,
            amount_cents,
            method,
            status: RefundStatus::Pending,
            gateway_ref: None,
            error: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.amount_cents < 0 {
            return Err("Сумма возмещения не может быть отрицательной".into());
        }
        Ok(())
    }
}
