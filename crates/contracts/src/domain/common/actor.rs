use crate::enums::actor_role::ActorRole;
use serde::{Deserialize, Serialize};

/// Участник процесса возврата: кто выполнил действие и в какой роли.
/// Для покупателей id — это user_id продажи, для сотрудников — их логин.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: String,
    pub role: ActorRole,
}

impl Actor {
    pub fn new(id: impl Into<String>, role: ActorRole) -> Self {
        Self {
            id: id.into(),
            role,
        }
    }

    pub fn customer(user_id: i64) -> Self {
        Self::new(user_id.to_string(), ActorRole::Customer)
    }

    pub fn system() -> Self {
        Self::new("system", ActorRole::System)
    }
}
