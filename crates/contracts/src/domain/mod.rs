pub mod activity;
pub mod common;
pub mod refund;
pub mod return_request;
