pub mod aggregate;

pub use aggregate::{Refund, RefundId};
