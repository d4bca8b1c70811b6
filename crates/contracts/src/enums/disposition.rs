use serde::{Deserialize, Serialize};

/// Решение по возвращённому товару после инспекции
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Disposition {
    Refund,
    StoreCredit,
    Replacement,
    Repair,
    Reject,
}

impl Disposition {
    pub fn code(&self) -> &'static str {
        match self {
            Disposition::Refund => "REFUND",
            Disposition::StoreCredit => "STORE_CREDIT",
            Disposition::Replacement => "REPLACEMENT",
            Disposition::Repair => "REPAIR",
            Disposition::Reject => "REJECT",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Disposition::Refund => "Возврат денег",
            Disposition::StoreCredit => "Кредит магазина",
            Disposition::Replacement => "Замена",
            Disposition::Repair => "Ремонт",
            Disposition::Reject => "Отказ",
        }
    }

    /// Денежное решение: создаёт запись возмещения
    pub fn is_monetary(&self) -> bool {
        matches!(self, Disposition::Refund | Disposition::StoreCredit)
    }

    pub fn all() -> Vec<Disposition> {
        vec![
            Disposition::Refund,
            Disposition::StoreCredit,
            Disposition::Replacement,
            Disposition::Repair,
            Disposition::Reject,
        ]
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "REFUND" => Some(Disposition::Refund),
            "STORE_CREDIT" => Some(Disposition::StoreCredit),
            "REPLACEMENT" => Some(Disposition::Replacement),
            "REPAIR" => Some(Disposition::Repair),
            "REJECT" => Some(Disposition::Reject),
            _ => None,
        }
    }
}

impl std::fmt::Display for Disposition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}
