//! Common types and traits for all aggregates

pub mod actor;
pub mod aggregate_id;

// Re-exports
pub use actor::Actor;
pub use aggregate_id::AggregateId;
