use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, Statement,
};

/// Path value that selects a private in-memory database
pub const IN_MEMORY: &str = ":memory:";

/// Open the SQLite database at `db_path` (created if missing) and make sure
/// every table and index exists.
pub async fn initialize_database(db_path: &str) -> anyhow::Result<DatabaseConnection> {
    let conn = connect(db_path).await?;
    bootstrap_schema(&conn).await?;
    Ok(conn)
}

async fn connect(db_path: &str) -> anyhow::Result<DatabaseConnection> {
    if db_path == IN_MEMORY {
        // Every pooled connection would see its own empty memory database
        let mut options = ConnectOptions::new("sqlite::memory:".to_string());
        options
            .max_connections(1)
            .min_connections(1)
            .sqlx_logging(false);
        return Ok(Database::connect(options).await?);
    }

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

    tracing::info!("Connecting to database {}", db_url);
    Ok(Database::connect(&db_url).await?)
}

/// Table definitions: name, CREATE TABLE statement, index statements.
///
/// Unique indexes are the source of truth for uniqueness. `a001_company`
/// carries a `singleton_key` pinned to 1 with a unique index on it, so the
/// storage layer itself refuses a second company row.
const SCHEMA: &[(&str, &str, &[&str])] = &[
    (
        "a001_company",
        r#"
            CREATE TABLE a001_company (
                id TEXT PRIMARY KEY NOT NULL,
                singleton_key INTEGER NOT NULL DEFAULT 1 CHECK (singleton_key = 1),
                name TEXT NOT NULL,
                address TEXT NOT NULL,
                mission TEXT NOT NULL,
                vision TEXT NOT NULL,
                founding_year INTEGER NOT NULL,
                tax_id TEXT NOT NULL,
                image TEXT,
                created_at TEXT,
                updated_at TEXT,
                version INTEGER NOT NULL DEFAULT 0
            );
        "#,
        &[
            "CREATE UNIQUE INDEX IF NOT EXISTS ux_a001_company_singleton ON a001_company (singleton_key);",
            "CREATE UNIQUE INDEX IF NOT EXISTS ux_a001_company_tax_id ON a001_company (tax_id);",
        ],
    ),
    (
        "a002_worker",
        r#"
            CREATE TABLE a002_worker (
                id TEXT PRIMARY KEY NOT NULL,
                first_name TEXT NOT NULL,
                last_name TEXT NOT NULL,
                email TEXT NOT NULL,
                national_id TEXT NOT NULL,
                employee_code TEXT NOT NULL,
                image TEXT,
                created_at TEXT,
                updated_at TEXT,
                version INTEGER NOT NULL DEFAULT 0
            );
        "#,
        &[
            "CREATE UNIQUE INDEX IF NOT EXISTS ux_a002_worker_national_id ON a002_worker (national_id);",
            "CREATE UNIQUE INDEX IF NOT EXISTS ux_a002_worker_employee_code ON a002_worker (employee_code);",
            "CREATE INDEX IF NOT EXISTS ix_a002_worker_name ON a002_worker (first_name, last_name);",
        ],
    ),
    (
        "a003_product",
        r#"
            CREATE TABLE a003_product (
                id TEXT PRIMARY KEY NOT NULL,
                name TEXT NOT NULL,
                description TEXT NOT NULL,
                price TEXT NOT NULL,
                tax_rate INTEGER NOT NULL CHECK (tax_rate IN (0, 15)),
                image TEXT,
                created_at TEXT,
                updated_at TEXT,
                version INTEGER NOT NULL DEFAULT 0
            );
        "#,
        &["CREATE INDEX IF NOT EXISTS ix_a003_product_name ON a003_product (name);"],
    ),
    (
        "a004_supplier",
        r#"
            CREATE TABLE a004_supplier (
                id TEXT PRIMARY KEY NOT NULL,
                name TEXT NOT NULL,
                description TEXT NOT NULL,
                phone TEXT NOT NULL,
                country TEXT NOT NULL,
                email TEXT NOT NULL,
                address TEXT NOT NULL,
                created_at TEXT,
                updated_at TEXT,
                version INTEGER NOT NULL DEFAULT 0
            );
        "#,
        &["CREATE INDEX IF NOT EXISTS ix_a004_supplier_name ON a004_supplier (name);"],
    ),
];

/// Create missing tables and indexes
pub async fn bootstrap_schema(conn: &DatabaseConnection) -> anyhow::Result<()> {
    for (table, create_sql, indexes) in SCHEMA {
        if !table_exists(conn, table).await? {
            tracing::info!("Creating {} table", table);
            conn.execute(Statement::from_string(
                DatabaseBackend::Sqlite,
                create_sql.to_string(),
            ))
            .await?;
        }
        for index_sql in indexes.iter() {
            conn.execute(Statement::from_string(
                DatabaseBackend::Sqlite,
                index_sql.to_string(),
            ))
            .await?;
        }
    }
    Ok(())
}

async fn table_exists(conn: &DatabaseConnection, table: &str) -> anyhow::Result<bool> {
    let rows = conn
        .query_all(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            "SELECT name FROM sqlite_master WHERE type='table' AND name = ?;",
            [table.into()],
        ))
        .await?;
    Ok(!rows.is_empty())
}
