use contracts::domain::common::AggregateId;
use contracts::enums::{ReturnStatus, WorkflowAction};
use sea_orm::DbErr;
use thiserror::Error;

/// Ошибки движка возвратов. Ошибки хранилища фатальны и пробрасываются,
/// остальные варианты — доменные отказы, осмысленные для вызывающего кода.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("database error: {0}")]
    Database(#[from] DbErr),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("illegal transition: no {action} from {from}")]
    IllegalTransition {
        from: ReturnStatus,
        action: WorkflowAction,
    },

    #[error("request is in terminal state {status}")]
    TerminalStateViolation { status: ReturnStatus },

    #[error("active return request already exists for sale {sale_id}")]
    DuplicateSubmission { sale_id: i64 },

    #[error("quantity {requested} exceeds available {available} for product {product_id}")]
    QuantityExceeded {
        product_id: i64,
        requested: i32,
        available: i32,
    },

    #[error("eligibility check failed: {reason}")]
    EligibilityFailed { reason: String },

    #[error("concurrent update lost the race, request state has moved on")]
    PersistenceConflict,

    #[error("validation failed: {0}")]
    Validation(String),
}

impl WorkflowError {
    pub fn not_found<I: AggregateId>(entity: &'static str, id: I) -> Self {
        WorkflowError::NotFound {
            entity,
            id: id.as_string(),
        }
    }
}

/// SQLite сообщает о нарушении UNIQUE текстом; отдельного кода sea-orm не даёт
pub fn is_unique_violation(err: &DbErr) -> bool {
    err.to_string().contains("UNIQUE constraint failed")
}

pub type Result<T> = std::result::Result<T, WorkflowError>;
