pub mod dto;

pub use dto::DailyMetricDto;
