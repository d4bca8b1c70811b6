use serde::{Deserialize, Serialize};

/// Результат инспекции возвращённого товара
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InspectionResult {
    Defective,
    Damaged,
    NoFaultFound,
    WrongItem,
}

impl InspectionResult {
    pub fn code(&self) -> &'static str {
        match self {
            InspectionResult::Defective => "DEFECTIVE",
            InspectionResult::Damaged => "DAMAGED",
            InspectionResult::NoFaultFound => "NO_FAULT_FOUND",
            InspectionResult::WrongItem => "WRONG_ITEM",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            InspectionResult::Defective => "Брак",
            InspectionResult::Damaged => "Повреждение",
            InspectionResult::NoFaultFound => "Дефект не найден",
            InspectionResult::WrongItem => "Не тот товар",
        }
    }

    pub fn all() -> Vec<InspectionResult> {
        vec![
            InspectionResult::Defective,
            InspectionResult::Damaged,
            InspectionResult::NoFaultFound,
            InspectionResult::WrongItem,
        ]
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "DEFECTIVE" => Some(InspectionResult::Defective),
            "DAMAGED" => Some(InspectionResult::Damaged),
            "NO_FAULT_FOUND" => Some(InspectionResult::NoFaultFound),
            "WRONG_ITEM" => Some(InspectionResult::WrongItem),
            _ => None,
        }
    }
}

impl std::fmt::Display for InspectionResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}
