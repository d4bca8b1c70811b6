use serde::{Deserialize, Serialize};

/// Действия над заявкой на возврат. Код действия пишется в журнал активности.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkflowAction {
    Submit,
    Validate,
    Approve,
    Reject,
    UpdateShipping,
    MarkReceived,
    StartInspection,
    CompleteInspection,
    SetDisposition,
    ProcessRefund,
    CompleteRefund,
    Cancel,
}

impl WorkflowAction {
    pub fn code(&self) -> &'static str {
        match self {
            WorkflowAction::Submit => "SUBMIT",
            WorkflowAction::Validate => "VALIDATE",
            WorkflowAction::Approve => "APPROVE",
            WorkflowAction::Reject => "REJECT",
            WorkflowAction::UpdateShipping => "UPDATE_SHIPPING",
            WorkflowAction::MarkReceived => "MARK_RECEIVED",
            WorkflowAction::StartInspection => "START_INSPECTION",
            WorkflowAction::CompleteInspection => "COMPLETE_INSPECTION",
            WorkflowAction::SetDisposition => "SET_DISPOSITION",
            WorkflowAction::ProcessRefund => "PROCESS_REFUND",
            WorkflowAction::CompleteRefund => "COMPLETE_REFUND",
            WorkflowAction::Cancel => "CANCEL",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "SUBMIT" => Some(WorkflowAction::Submit),
            "VALIDATE" => Some(WorkflowAction::Validate),
            "APPROVE" => Some(WorkflowAction::Approve),
            "REJECT" => Some(WorkflowAction::Reject),
            "UPDATE_SHIPPING" => Some(WorkflowAction::UpdateShipping),
            "MARK_RECEIVED" => Some(WorkflowAction::MarkReceived),
            "START_INSPECTION" => Some(WorkflowAction::StartInspection),
            "COMPLETE_INSPECTION" => Some(WorkflowAction::CompleteInspection),
            "SET_DISPOSITION" => Some(WorkflowAction::SetDisposition),
            "PROCESS_REFUND" => Some(WorkflowAction::ProcessRefund),
            "COMPLETE_REFUND" => Some(WorkflowAction::CompleteRefund),
            "CANCEL" => Some(WorkflowAction::Cancel),
            _ => None,
        }
    }
}

impl std::fmt::Display for WorkflowAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}
