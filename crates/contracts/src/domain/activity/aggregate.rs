use crate::domain::common::Actor;
use crate::domain::return_request::ReturnRequestId;
use crate::enums::{ReturnStatus, WorkflowAction};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Запись журнала активности заявки. Журнал только дописывается:
/// по одной записи на каждый переход или значимое событие
/// (например, неудачную попытку возмещения).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub id: i64,

    #[serde(rename = "requestId")]
    pub request_id: ReturnRequestId,

    /// Выполненное действие
    pub action: WorkflowAction,

    /// Статус до перехода (None для подачи заявки)
    #[serde(rename = "fromStatus")]
    pub from_status: Option<ReturnStatus>,

    /// Статус после действия
    #[serde(rename = "toStatus")]
    pub to_status: ReturnStatus,

    pub actor: Actor,

    pub notes: Option<String>,

    /// Структурированные детали события (итоги проверок, исход платежа)
    pub metadata: Option<serde_json::Value>,

    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}
