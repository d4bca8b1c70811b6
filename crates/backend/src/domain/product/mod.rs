pub mod adjuster;
pub mod repository;
