pub mod aggregate;

pub use aggregate::ActivityEntry;
