pub mod actor_role;
pub mod disposition;
pub mod inspection_result;
pub mod refund_method;
pub mod refund_status;
pub mod return_reason;
pub mod return_status;
pub mod workflow_action;

pub use actor_role::ActorRole;
pub use disposition::Disposition;
pub use inspection_result::InspectionResult;
pub use refund_method::RefundMethod;
pub use refund_status::RefundStatus;
pub use return_reason::ReturnReason;
pub use return_status::ReturnStatus;
pub use workflow_action::WorkflowAction;
