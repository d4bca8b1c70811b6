//! Машина состояний заявки на возврат.
//!
//! Единственный источник правды о разрешённых переходах — таблица RULES.
//! Любая операция жизненного цикла сначала спрашивает next_status(),
//! затем применяет переход через CAS в репозитории.

use contracts::enums::{ReturnStatus, WorkflowAction};
use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::domain::error::{Result, WorkflowError};

/// Разрешённые переходы: (откуда, действие, куда)
const RULES: &[(ReturnStatus, WorkflowAction, ReturnStatus)] = &[
    (
        ReturnStatus::Submitted,
        WorkflowAction::Validate,
        ReturnStatus::Validating,
    ),
    (
        ReturnStatus::Validating,
        WorkflowAction::Approve,
        ReturnStatus::Approved,
    ),
    (
        ReturnStatus::Validating,
        WorkflowAction::Reject,
        ReturnStatus::Rejected,
    ),
    (
        ReturnStatus::Approved,
        WorkflowAction::UpdateShipping,
        ReturnStatus::Shipping,
    ),
    (
        ReturnStatus::Shipping,
        WorkflowAction::MarkReceived,
        ReturnStatus::Received,
    ),
    (
        ReturnStatus::Received,
        WorkflowAction::StartInspection,
        ReturnStatus::Inspecting,
    ),
    (
        ReturnStatus::Inspecting,
        WorkflowAction::CompleteInspection,
        ReturnStatus::Inspected,
    ),
    (
        ReturnStatus::Inspected,
        WorkflowAction::SetDisposition,
        ReturnStatus::Disposition,
    ),
    (
        ReturnStatus::Disposition,
        WorkflowAction::ProcessRefund,
        ReturnStatus::Processing,
    ),
    (
        ReturnStatus::Processing,
        WorkflowAction::CompleteRefund,
        ReturnStatus::Completed,
    ),
    // Отмена доступна только до передачи товара в обратную доставку
    (
        ReturnStatus::Submitted,
        WorkflowAction::Cancel,
        ReturnStatus::Cancelled,
    ),
    (
        ReturnStatus::Approved,
        WorkflowAction::Cancel,
        ReturnStatus::Cancelled,
    ),
];

static TRANSITIONS: Lazy<HashMap<(ReturnStatus, WorkflowAction), ReturnStatus>> =
    Lazy::new(|| {
        RULES
            .iter()
            .map(|&(from, action, to)| ((from, action), to))
            .collect()
    });

/// Целевой статус для действия из текущего статуса.
///
/// Терминальные статусы отвергаются до просмотра таблицы: из них
/// не выйти никаким действием.
pub fn next_status(from: ReturnStatus, action: WorkflowAction) -> Result<ReturnStatus> {
    if from.is_terminal() {
        return Err(WorkflowError::TerminalStateViolation { status: from });
    }
    TRANSITIONS
        .get(&(from, action))
        .copied()
        .ok_or(WorkflowError::IllegalTransition { from, action })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use proptest::sample::select;

    #[test]
    fn test_happy_path_reaches_completed() {
        let steps = [
            (WorkflowAction::Validate, ReturnStatus::Validating),
            (WorkflowAction::Approve, ReturnStatus::Approved),
            (WorkflowAction::UpdateShipping, ReturnStatus::Shipping),
            (WorkflowAction::MarkReceived, ReturnStatus::Received),
            (WorkflowAction::StartInspection, ReturnStatus::Inspecting),
            (WorkflowAction::CompleteInspection, ReturnStatus::Inspected),
            (WorkflowAction::SetDisposition, ReturnStatus::Disposition),
            (WorkflowAction::ProcessRefund, ReturnStatus::Processing),
            (WorkflowAction::CompleteRefund, ReturnStatus::Completed),
        ];

        let mut current = ReturnStatus::Submitted;
        for (action, expected) in steps {
            current = next_status(current, action).unwrap();
            assert_eq!(current, expected);
        }
        assert!(current.is_terminal());
    }

    #[test]
    fn test_terminal_states_reject_every_action() {
        for status in [
            ReturnStatus::Rejected,
            ReturnStatus::Completed,
            ReturnStatus::Cancelled,
        ] {
            for &(_, action, _) in RULES {
                let err = next_status(status, action).unwrap_err();
                assert!(
                    matches!(err, WorkflowError::TerminalStateViolation { .. }),
                    "{} must be sealed against {}",
                    status,
                    action
                );
            }
        }
    }

    #[test]
    fn test_cancel_allowed_only_before_shipping() {
        assert_eq!(
            next_status(ReturnStatus::Submitted, WorkflowAction::Cancel).unwrap(),
            ReturnStatus::Cancelled
        );
        assert_eq!(
            next_status(ReturnStatus::Approved, WorkflowAction::Cancel).unwrap(),
            ReturnStatus::Cancelled
        );

        for status in [
            ReturnStatus::Validating,
            ReturnStatus::Shipping,
            ReturnStatus::Received,
            ReturnStatus::Inspecting,
            ReturnStatus::Inspected,
            ReturnStatus::Disposition,
            ReturnStatus::Processing,
        ] {
            let err = next_status(status, WorkflowAction::Cancel).unwrap_err();
            assert!(matches!(err, WorkflowError::IllegalTransition { .. }));
        }
    }

    #[test]
    fn test_every_status_reachable_from_submitted() {
        let mut reached = vec![ReturnStatus::Submitted];
        let mut frontier = vec![ReturnStatus::Submitted];
        while let Some(from) = frontier.pop() {
            for &(rule_from, _, to) in RULES {
                if rule_from == from && !reached.contains(&to) {
                    reached.push(to);
                    frontier.push(to);
                }
            }
        }
        for status in ReturnStatus::all() {
            assert!(reached.contains(&status), "{} is unreachable", status);
        }
    }

    #[test]
    fn test_rules_table_is_unambiguous() {
        // одна пара (статус, действие) — ровно один целевой статус
        assert_eq!(TRANSITIONS.len(), RULES.len());
    }

    fn arb_status() -> impl Strategy<Value = ReturnStatus> {
        select(ReturnStatus::all())
    }

    fn arb_action() -> impl Strategy<Value = WorkflowAction> {
        select(
            RULES
                .iter()
                .map(|&(_, action, _)| action)
                .collect::<Vec<_>>(),
        )
    }

    proptest! {
        /// Любая пара (статус, действие) даёт либо ответ из таблицы,
        /// либо детерминированный отказ нужного вида.
        #[test]
        fn prop_next_status_total_and_consistent(from in arb_status(), action in arb_action()) {
            match next_status(from, action) {
                Ok(to) => {
                    prop_assert!(!from.is_terminal());
                    prop_assert!(RULES.contains(&(from, action, to)));
                }
                Err(WorkflowError::TerminalStateViolation { status }) => {
                    prop_assert!(from.is_terminal());
                    prop_assert_eq!(status, from);
                }
                Err(WorkflowError::IllegalTransition { from: f, action: a }) => {
                    prop_assert!(!from.is_terminal());
                    prop_assert_eq!(f, from);
                    prop_assert_eq!(a, action);
                    prop_assert!(!RULES.iter().any(|&(rf, ra, _)| rf == from && ra == action));
                }
                Err(other) => prop_assert!(false, "unexpected error: {}", other),
            }
        }
    }
}
