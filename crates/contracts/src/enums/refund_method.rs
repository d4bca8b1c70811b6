use serde::{Deserialize, Serialize};

/// Способ возмещения
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RefundMethod {
    OriginalPayment,
    StoreCredit,
}

impl RefundMethod {
    pub fn code(&self) -> &'static str {
        match self {
            RefundMethod::OriginalPayment => "ORIGINAL_PAYMENT",
            RefundMethod::StoreCredit => "STORE_CREDIT",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            RefundMethod::OriginalPayment => "На исходный способ оплаты",
            RefundMethod::StoreCredit => "Кредитом магазина",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "ORIGINAL_PAYMENT" => Some(RefundMethod::OriginalPayment),
            "STORE_CREDIT" => Some(RefundMethod::StoreCredit),
            _ => None,
        }
    }
}

impl std::fmt::Display for RefundMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}
