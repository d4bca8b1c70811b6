pub mod repository;
pub mod service;
pub mod transitions;
pub mod workflow;
