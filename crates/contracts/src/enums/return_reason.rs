use serde::{Deserialize, Serialize};

/// Причина возврата, указанная покупателем при подаче заявки
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReturnReason {
    Defective,
    Damaged,
    WrongItem,
    NotAsDescribed,
    ChangedMind,
    Other,
}

impl ReturnReason {
    pub fn code(&self) -> &'static str {
        match self {
            ReturnReason::Defective => "DEFECTIVE",
            ReturnReason::Damaged => "DAMAGED",
            ReturnReason::WrongItem => "WRONG_ITEM",
            ReturnReason::NotAsDescribed => "NOT_AS_DESCRIBED",
            ReturnReason::ChangedMind => "CHANGED_MIND",
            ReturnReason::Other => "OTHER",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ReturnReason::Defective => "Брак",
            ReturnReason::Damaged => "Повреждён при доставке",
            ReturnReason::WrongItem => "Прислан не тот товар",
            ReturnReason::NotAsDescribed => "Не соответствует описанию",
            ReturnReason::ChangedMind => "Передумал",
            ReturnReason::Other => "Другое",
        }
    }

    pub fn all() -> Vec<ReturnReason> {
        vec![
            ReturnReason::Defective,
            ReturnReason::Damaged,
            ReturnReason::WrongItem,
            ReturnReason::NotAsDescribed,
            ReturnReason::ChangedMind,
            ReturnReason::Other,
        ]
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "DEFECTIVE" => Some(ReturnReason::Defective),
            "DAMAGED" => Some(ReturnReason::Damaged),
            "WRONG_ITEM" => Some(ReturnReason::WrongItem),
            "NOT_AS_DESCRIBED" => Some(ReturnReason::NotAsDescribed),
            "CHANGED_MIND" => Some(ReturnReason::ChangedMind),
            "OTHER" => Some(ReturnReason::Other),
            _ => None,
        }
    }
}

impl std::fmt::Display for ReturnReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}
