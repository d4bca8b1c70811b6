pub mod daily_metrics;
