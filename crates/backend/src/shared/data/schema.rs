use sea_orm::{ConnectionTrait, DatabaseBackend, Statement};

/// Накатить схему базы (идемпотентно). Таблицы создаются только при
/// отсутствии; закрытые перечисления статусов закреплены CHECK-ограничениями,
/// единственность активной заявки на продажу — частичным уникальным индексом.
pub async fn apply<C: ConnectionTrait>(db: &C) -> anyhow::Result<()> {
    for pragma in ["PRAGMA journal_mode=WAL;", "PRAGMA foreign_keys=ON;"] {
        db.execute(Statement::from_string(
            DatabaseBackend::Sqlite,
            pragma.to_string(),
        ))
        .await?;
    }

    ensure_table(
        db,
        "product",
        r#"
        CREATE TABLE product (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            price_cents INTEGER NOT NULL DEFAULT 0,
            stock INTEGER NOT NULL DEFAULT 0 CHECK (stock >= 0),
            active INTEGER NOT NULL DEFAULT 1
        );
    "#,
    )
    .await?;

    ensure_table(
        db,
        "sale",
        r#"
        CREATE TABLE sale (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            sale_time TEXT NOT NULL,
            total_cents INTEGER NOT NULL DEFAULT 0,
            status TEXT NOT NULL DEFAULT 'COMPLETED'
                CHECK (status IN ('PENDING','COMPLETED','REFUNDED','FAILED','CANCELLED'))
        );
    "#,
    )
    .await?;

    ensure_table(
        db,
        "sale_item",
        r#"
        CREATE TABLE sale_item (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            sale_id INTEGER NOT NULL REFERENCES sale(id),
            product_id INTEGER NOT NULL REFERENCES product(id),
            quantity INTEGER NOT NULL CHECK (quantity > 0),
            price_cents INTEGER NOT NULL DEFAULT 0
        );
    "#,
    )
    .await?;

    ensure_table(
        db,
        "rma_request",
        r#"
        CREATE TABLE rma_request (
            id TEXT PRIMARY KEY NOT NULL,
            code TEXT NOT NULL UNIQUE,
            sale_id INTEGER NOT NULL REFERENCES sale(id),
            user_id INTEGER NOT NULL,
            reason TEXT NOT NULL
                CHECK (reason IN ('DEFECTIVE','DAMAGED','WRONG_ITEM','NOT_AS_DESCRIBED','CHANGED_MIND','OTHER')),
            description TEXT NOT NULL DEFAULT '',
            evidence_urls TEXT NOT NULL DEFAULT '[]',
            status TEXT NOT NULL DEFAULT 'SUBMITTED'
                CHECK (status IN ('SUBMITTED','VALIDATING','APPROVED','REJECTED','SHIPPING',
                                  'RECEIVED','INSPECTING','INSPECTED','DISPOSITION','PROCESSING',
                                  'COMPLETED','CANCELLED')),
            within_warranty INTEGER,
            ownership_verified INTEGER,
            validation_notes TEXT,
            carrier TEXT,
            tracking_code TEXT,
            inspection_result TEXT
                CHECK (inspection_result IS NULL
                       OR inspection_result IN ('DEFECTIVE','DAMAGED','NO_FAULT_FOUND','WRONG_ITEM')),
            inspection_notes TEXT,
            disposition TEXT
                CHECK (disposition IS NULL
                       OR disposition IN ('REFUND','STORE_CREDIT','REPLACEMENT','REPAIR','REJECT')),
            refund_amount_cents INTEGER,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            closed_at TEXT
        );
    "#,
    )
    .await?;

    ensure_table(
        db,
        "rma_item",
        r#"
        CREATE TABLE rma_item (
            id TEXT PRIMARY KEY NOT NULL,
            request_id TEXT NOT NULL REFERENCES rma_request(id) ON DELETE CASCADE,
            sale_item_id INTEGER NOT NULL REFERENCES sale_item(id),
            product_id INTEGER NOT NULL REFERENCES product(id),
            quantity INTEGER NOT NULL CHECK (quantity > 0),
            UNIQUE (request_id, sale_item_id)
        );
    "#,
    )
    .await?;

    ensure_table(
        db,
        "refund",
        r#"
        CREATE TABLE refund (
            id TEXT PRIMARY KEY NOT NULL,
            request_id TEXT NOT NULL UNIQUE REFERENCES rma_request(id),
            amount_cents INTEGER NOT NULL CHECK (amount_cents >= 0),
            method TEXT NOT NULL CHECK (method IN ('ORIGINAL_PAYMENT','STORE_CREDIT')),
            status TEXT NOT NULL DEFAULT 'PENDING'
                CHECK (status IN ('PENDING','PROCESSING','COMPLETED','FAILED')),
            gateway_ref TEXT,
            error TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
    "#,
    )
    .await?;

    ensure_table(
        db,
        "rma_activity_log",
        r#"
        CREATE TABLE rma_activity_log (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            request_id TEXT NOT NULL REFERENCES rma_request(id),
            action TEXT NOT NULL
                CHECK (action IN ('SUBMIT','VALIDATE','APPROVE','REJECT','UPDATE_SHIPPING',
                                  'MARK_RECEIVED','START_INSPECTION','COMPLETE_INSPECTION',
                                  'SET_DISPOSITION','PROCESS_REFUND','COMPLETE_REFUND','CANCEL')),
            from_status TEXT,
            to_status TEXT NOT NULL,
            actor_id TEXT NOT NULL,
            actor_role TEXT NOT NULL
                CHECK (actor_role IN ('CUSTOMER','VALIDATOR','WAREHOUSE','INSPECTOR','FINANCE','SYSTEM')),
            notes TEXT,
            metadata TEXT,
            created_at TEXT NOT NULL
        );
    "#,
    )
    .await?;

    ensure_table(
        db,
        "rma_sequence",
        r#"
        CREATE TABLE rma_sequence (
            day TEXT PRIMARY KEY NOT NULL,
            value INTEGER NOT NULL DEFAULT 0
        );
    "#,
    )
    .await?;

    ensure_table(
        db,
        "daily_metric",
        r#"
        CREATE TABLE daily_metric (
            day TEXT PRIMARY KEY NOT NULL,
            total_requests INTEGER NOT NULL DEFAULT 0,
            approved_count INTEGER NOT NULL DEFAULT 0,
            rejected_count INTEGER NOT NULL DEFAULT 0,
            completed_count INTEGER NOT NULL DEFAULT 0,
            cancelled_count INTEGER NOT NULL DEFAULT 0,
            defective_count INTEGER NOT NULL DEFAULT 0,
            damaged_count INTEGER NOT NULL DEFAULT 0,
            no_fault_count INTEGER NOT NULL DEFAULT 0,
            wrong_item_count INTEGER NOT NULL DEFAULT 0,
            refunded_cents INTEGER NOT NULL DEFAULT 0,
            avg_validation_hours REAL,
            avg_inspection_hours REAL,
            avg_cycle_hours REAL,
            computed_at TEXT NOT NULL
        );
    "#,
    )
    .await?;

    // Одна активная (нетерминальная) заявка на продажу. Индекс закрывает
    // гонку проверь-потом-вставь: проигравший insert падает на UNIQUE.
    let indexes = [
        r#"
        CREATE UNIQUE INDEX IF NOT EXISTS idx_rma_request_active_sale
            ON rma_request (sale_id)
            WHERE status NOT IN ('REJECTED','COMPLETED','CANCELLED');
    "#,
        "CREATE INDEX IF NOT EXISTS idx_rma_request_user ON rma_request (user_id);",
        "CREATE INDEX IF NOT EXISTS idx_rma_activity_request ON rma_activity_log (request_id);",
    ];
    for ddl in indexes {
        db.execute(Statement::from_string(
            DatabaseBackend::Sqlite,
            ddl.to_string(),
        ))
        .await?;
    }

    Ok(())
}

/// Создать таблицу, если её ещё нет (проверка через sqlite_master)
async fn ensure_table<C: ConnectionTrait>(db: &C, name: &str, ddl: &str) -> anyhow::Result<()> {
    let check = format!(
        "SELECT name FROM sqlite_master WHERE type='table' AND name='{}';",
        name
    );
    let existing = db
        .query_all(Statement::from_string(DatabaseBackend::Sqlite, check))
        .await?;

    if existing.is_empty() {
        tracing::info!("Creating {} table", name);
        db.execute(Statement::from_string(
            DatabaseBackend::Sqlite,
            ddl.to_string(),
        ))
        .await?;
    }
    Ok(())
}
