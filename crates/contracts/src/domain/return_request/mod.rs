pub mod aggregate;

pub use aggregate::{
    DispositionDecision, InspectionOutcome, RefundOutcome, ReturnItem, ReturnRequest,
    ReturnRequestDetail, ReturnRequestId, ShippingUpdate, SubmitReturnItem, SubmitReturnRequest,
};
