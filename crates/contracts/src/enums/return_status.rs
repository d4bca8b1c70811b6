use serde::{Deserialize, Serialize};

/// Статусы заявки на возврат
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReturnStatus {
    Submitted,
    Validating,
    Approved,
    Rejected,
    Shipping,
    Received,
    Inspecting,
    Inspected,
    Disposition,
    Processing,
    Completed,
    Cancelled,
}

impl ReturnStatus {
    /// Код статуса для хранения в БД
    pub fn code(&self) -> &'static str {
        match self {
            ReturnStatus::Submitted => "SUBMITTED",
            ReturnStatus::Validating => "VALIDATING",
            ReturnStatus::Approved => "APPROVED",
            ReturnStatus::Rejected => "REJECTED",
            ReturnStatus::Shipping => "SHIPPING",
            ReturnStatus::Received => "RECEIVED",
            ReturnStatus::Inspecting => "INSPECTING",
            ReturnStatus::Inspected => "INSPECTED",
            ReturnStatus::Disposition => "DISPOSITION",
            ReturnStatus::Processing => "PROCESSING",
            ReturnStatus::Completed => "COMPLETED",
            ReturnStatus::Cancelled => "CANCELLED",
        }
    }

    /// Получить человекочитаемое название
    pub fn display_name(&self) -> &'static str {
        match self {
            ReturnStatus::Submitted => "Подана",
            ReturnStatus::Validating => "Проверяется",
            ReturnStatus::Approved => "Одобрена",
            ReturnStatus::Rejected => "Отклонена",
            ReturnStatus::Shipping => "Доставка",
            ReturnStatus::Received => "Получена складом",
            ReturnStatus::Inspecting => "Инспекция",
            ReturnStatus::Inspected => "Проинспектирована",
            ReturnStatus::Disposition => "Решение принято",
            ReturnStatus::Processing => "Обработка",
            ReturnStatus::Completed => "Завершена",
            ReturnStatus::Cancelled => "Отменена",
        }
    }

    /// Терминальный статус: исходящих переходов нет
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ReturnStatus::Rejected | ReturnStatus::Completed | ReturnStatus::Cancelled
        )
    }

    /// Активная заявка блокирует повторную подачу по той же продаже
    pub fn is_active(&self) -> bool {
        !self.is_terminal()
    }

    /// Все статусы в порядке жизненного цикла
    pub fn all() -> Vec<ReturnStatus> {
        vec![
            ReturnStatus::Submitted,
            ReturnStatus::Validating,
            ReturnStatus::Approved,
            ReturnStatus::Rejected,
            ReturnStatus::Shipping,
            ReturnStatus::Received,
            ReturnStatus::Inspecting,
            ReturnStatus::Inspected,
            ReturnStatus::Disposition,
            ReturnStatus::Processing,
            ReturnStatus::Completed,
            ReturnStatus::Cancelled,
        ]
    }

    /// Парсинг из кода БД
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "SUBMITTED" => Some(ReturnStatus::Submitted),
            "VALIDATING" => Some(ReturnStatus::Validating),
            "APPROVED" => Some(ReturnStatus::Approved),
            "REJECTED" => Some(ReturnStatus::Rejected),
            "SHIPPING" => Some(ReturnStatus::Shipping),
            "RECEIVED" => Some(ReturnStatus::Received),
            "INSPECTING" => Some(ReturnStatus::Inspecting),
            "INSPECTED" => Some(ReturnStatus::Inspected),
            "DISPOSITION" => Some(ReturnStatus::Disposition),
            "PROCESSING" => Some(ReturnStatus::Processing),
            "COMPLETED" => Some(ReturnStatus::Completed),
            "CANCELLED" => Some(ReturnStatus::Cancelled),
            _ => None,
        }
    }
}

impl std::fmt::Display for ReturnStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}
