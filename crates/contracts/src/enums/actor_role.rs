use serde::{Deserialize, Serialize};

/// Роль участника процесса возврата
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActorRole {
    Customer,
    Validator,
    Warehouse,
    Inspector,
    Finance,
    System,
}

impl ActorRole {
    pub fn code(&self) -> &'static str {
        match self {
            ActorRole::Customer => "CUSTOMER",
            ActorRole::Validator => "VALIDATOR",
            ActorRole::Warehouse => "WAREHOUSE",
            ActorRole::Inspector => "INSPECTOR",
            ActorRole::Finance => "FINANCE",
            ActorRole::System => "SYSTEM",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "CUSTOMER" => Some(ActorRole::Customer),
            "VALIDATOR" => Some(ActorRole::Validator),
            "WAREHOUSE" => Some(ActorRole::Warehouse),
            "INSPECTOR" => Some(ActorRole::Inspector),
            "FINANCE" => Some(ActorRole::Finance),
            "SYSTEM" => Some(ActorRole::System),
            _ => None,
        }
    }
}

impl std::fmt::Display for ActorRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}
