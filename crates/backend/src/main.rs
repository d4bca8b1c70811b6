use backend::dashboards::daily_metrics;
use backend::shared::{self, config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    // Создаем директорию для логов
    let log_dir = std::path::Path::new("target").join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file_path = log_dir.join("returns.log");
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file_path)?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| {
                // Отключаем логи SQL запросов, но оставляем логи приложения
                "info,sqlx=warn,sea_orm=warn".into()
            }),
        ))
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::sync::Arc::new(log_file))
                .with_ansi(false),
        )
        .init();

    let config = config::load_config()?;
    let db_path = config::get_database_path(&config)?;
    let db = shared::data::db::connect(&db_path.to_string_lossy()).await?;
    shared::data::schema::apply(&db).await?;

    tracing::info!(
        "Returns engine ready, database at {}, warranty window {} days",
        db_path.display(),
        config.returns.warranty_days
    );

    // Освежить витрины за вчера и сегодня
    let today = chrono::Utc::now().date_naive();
    let from = today.pred_opt().unwrap_or(today);
    let rows = daily_metrics::service::recompute_range(&db, from, today).await?;
    for row in rows {
        tracing::info!(
            "Metrics {}: {} submitted, {} completed, {} cents refunded",
            row.day,
            row.total_requests,
            row.completed_count,
            row.refunded_cents
        );
    }

    Ok(())
}
