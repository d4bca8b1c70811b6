//! Складские эффекты решения по возврату. Таблица эффектов одна на весь
//! движок: REFUND и STORE_CREDIT возвращают товар на остаток, REPLACEMENT
//! списывает отгружаемую замену (возвращённая единица на остаток не
//! попадает), REPAIR и REJECT остаток не трогают.

use super::repository;
use crate::domain::error::{Result, WorkflowError};
use contracts::domain::return_request::ReturnItem;
use contracts::enums::Disposition;
use sea_orm::ConnectionTrait;

/// Подписанное изменение остатка одного товара
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockAdjustment {
    pub product_id: i64,
    pub delta: i32,
}

/// Чистое планирование: позиции заявки -> список изменений остатков
pub fn plan(disposition: Disposition, items: &[ReturnItem]) -> Vec<StockAdjustment> {
    match disposition {
        Disposition::Refund | Disposition::StoreCredit => items
            .iter()
            .map(|i| StockAdjustment {
                product_id: i.product_id,
                delta: i.quantity,
            })
            .collect(),
        Disposition::Replacement => items
            .iter()
            .map(|i| StockAdjustment {
                product_id: i.product_id,
                delta: -i.quantity,
            })
            .collect(),
        Disposition::Repair | Disposition::Reject => Vec::new(),
    }
}

/// Применить план внутри транзакции завершения. Списание, которое увело бы
/// остаток в минус, отклоняется до UPDATE, чтобы вернуть доменную ошибку,
/// а не нарушение CHECK.
pub async fn apply<C: ConnectionTrait>(db: &C, adjustments: &[StockAdjustment]) -> Result<()> {
    for adj in adjustments {
        if adj.delta < 0 {
            let product = repository::get(db, adj.product_id)
                .await?
                .ok_or_else(|| WorkflowError::not_found("product", adj.product_id))?;
            if product.stock + adj.delta < 0 {
                return Err(WorkflowError::QuantityExceeded {
                    product_id: adj.product_id,
                    requested: -adj.delta,
                    available: product.stock,
                });
            }
        }
        let updated = repository::adjust_stock(db, adj.product_id, adj.delta).await?;
        if !updated {
            return Err(WorkflowError::not_found("product", adj.product_id));
        }
    }
    Ok(())
}
