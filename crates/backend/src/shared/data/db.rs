use sea_orm::{ConnectOptions, Database, DatabaseConnection};

/// Открыть файловую базу SQLite (создаёт файл и директорию при отсутствии).
/// Схему накатывает отдельный шаг: `schema::apply`.
pub async fn connect(db_path: &str) -> anyhow::Result<DatabaseConnection> {
    if let Some(parent) = std::path::Path::new(db_path).parent() {
        std::fs::create_dir_all(parent)?;
    }
    let absolute_path = if std::path::Path::new(db_path).is_absolute() {
        std::path::PathBuf::from(db_path)
    } else {
        std::env::current_dir()?.join(db_path)
    };
    // Normalize path separators and ensure proper URL form on Windows
    let normalized = absolute_path.to_string_lossy().replace('\\', "/");
    let needs_leading_slash = !normalized.starts_with('/') && normalized.contains(':');
    let prefix = if needs_leading_slash { "/" } else { "" };
    let db_url = format!("sqlite://{}{}?mode=rwc", prefix, normalized);
    let conn = Database::connect(&db_url).await?;
    Ok(conn)
}

/// База в памяти для тестов. Ровно одно соединение в пуле:
/// каждое соединение `sqlite::memory:` видит собственную пустую базу.
pub async fn connect_in_memory() -> anyhow::Result<DatabaseConnection> {
    let mut options = ConnectOptions::new("sqlite::memory:".to_owned());
    options.max_connections(1);
    let conn = Database::connect(options).await?;
    Ok(conn)
}
