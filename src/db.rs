use std::time::Duration;

use sea_orm::{
    ColumnTrait, ConnectOptions, ConnectionTrait, Database, DatabaseConnection, EntityTrait,
    QueryFilter, Set, Statement,
};
use tracing::{debug, info};
use uuid::Uuid;

use crate::entities::merchant;
use crate::errors::ServiceError;

/// Type alias for a database connection pool
pub type DbPool = DatabaseConnection;

/// Email of the seeded test merchant, used by `/test/merchant`.
pub const TEST_MERCHANT_EMAIL: &str = "test@example.com";

/// Configuration for database connection
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout: Duration,
    pub idle_timeout: Duration,
    pub acquire_timeout: Duration,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: 10,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            acquire_timeout: Duration::from_secs(8),
        }
    }
}

/// Establishes a connection pool to the database.
pub async fn establish_connection(database_url: &str) -> Result<DbPool, ServiceError> {
    let config = DbConfig {
        url: database_url.to_string(),
        ..Default::default()
    };
    establish_connection_with_config(&config).await
}

/// Establishes a connection pool with custom pool settings.
pub async fn establish_connection_with_config(config: &DbConfig) -> Result<DbPool, ServiceError> {
    debug!("Configuring database connection with: {:?}", config);

    let mut opt = ConnectOptions::new(config.url.clone());
    opt.max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(config.connect_timeout)
        .acquire_timeout(config.acquire_timeout)
        .idle_timeout(config.idle_timeout)
        .sqlx_logging(false);

    info!(
        "Connecting to database with max_connections={}",
        config.max_connections
    );

    let db = Database::connect(opt).await?;
    Ok(db)
}

/// Generates an opaque prefixed identifier, e.g. `order_4f9a…`.
pub fn generate_id(prefix: &str) -> String {
    format!("{}{}", prefix, Uuid::new_v4().simple())
}

const SCHEMA_STATEMENTS: &[&str] = &[
    r#"CREATE TABLE IF NOT EXISTS merchants (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        email TEXT NOT NULL,
        api_key TEXT NOT NULL,
        api_secret TEXT NOT NULL,
        is_active BOOLEAN NOT NULL DEFAULT TRUE,
        created_at TIMESTAMP WITH TIME ZONE NOT NULL
    )"#,
    r#"CREATE TABLE IF NOT EXISTS orders (
        id TEXT PRIMARY KEY,
        merchant_id TEXT NOT NULL,
        amount BIGINT NOT NULL,
        currency TEXT NOT NULL,
        receipt TEXT,
        notes TEXT,
        status TEXT NOT NULL,
        created_at TIMESTAMP WITH TIME ZONE NOT NULL
    )"#,
    r#"CREATE TABLE IF NOT EXISTS payments (
        id TEXT PRIMARY KEY,
        order_id TEXT NOT NULL,
        merchant_id TEXT NOT NULL,
        amount BIGINT NOT NULL,
        currency TEXT NOT NULL,
        method TEXT NOT NULL,
        status TEXT NOT NULL,
        vpa TEXT,
        card_network TEXT,
        card_last4 TEXT,
        error_code TEXT,
        error_description TEXT,
        created_at TIMESTAMP WITH TIME ZONE NOT NULL,
        updated_at TIMESTAMP WITH TIME ZONE NOT NULL
    )"#,
    "CREATE INDEX IF NOT EXISTS idx_orders_merchant ON orders (merchant_id)",
    "CREATE INDEX IF NOT EXISTS idx_payments_merchant ON payments (merchant_id)",
    "CREATE INDEX IF NOT EXISTS idx_payments_order ON payments (order_id)",
];

/// Creates the tables if they do not exist. Statements are idempotent, so
/// running this on every startup is safe.
pub async fn init_schema(db: &DbPool) -> Result<(), ServiceError> {
    let backend = db.get_database_backend();
    for sql in SCHEMA_STATEMENTS {
        db.execute(Statement::from_string(backend, (*sql).to_string()))
            .await?;
    }
    info!("Database schema initialized");
    Ok(())
}

/// Seeds the fixed test merchant if it is not present yet. The dashboard and
/// checkout demo bootstrap their credentials from this row.
pub async fn seed_test_merchant(db: &DbPool) -> Result<(), ServiceError> {
    let existing = merchant::Entity::find()
        .filter(merchant::Column::Email.eq(TEST_MERCHANT_EMAIL))
        .one(db)
        .await?;

    if existing.is_some() {
        debug!("Test merchant already seeded");
        return Ok(());
    }

    let seeded = merchant::ActiveModel {
        id: Set(generate_id("merchant_")),
        name: Set("Test Merchant".to_string()),
        email: Set(TEST_MERCHANT_EMAIL.to_string()),
        api_key: Set("key_test_abc123".to_string()),
        api_secret: Set("secret_test_abc123".to_string()),
        is_active: Set(true),
        created_at: Set(chrono::Utc::now()),
    };
    merchant::Entity::insert(seeded).exec(db).await?;

    info!("Seeded test merchant ({})", TEST_MERCHANT_EMAIL);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_carry_the_prefix_and_are_unique() {
        let a = generate_id("order_");
        let b = generate_id("order_");
        assert!(a.starts_with("order_"));
        assert_ne!(a, b);
        assert_eq!(a.len(), "order_".len() + 32);
    }
}
