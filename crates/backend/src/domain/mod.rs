pub mod activity;
pub mod error;
pub mod product;
pub mod refund;
pub mod return_request;
pub mod sale;
