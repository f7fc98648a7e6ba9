//! Database connection management and schema bootstrap

use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

/// PostgreSQL database connection pool
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new database connection pool
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .acquire_timeout(Duration::from_secs(5))
            .connect(database_url)
            .await?;

        tracing::info!("PostgreSQL connection pool established");
        Ok(Self { pool })
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Check database health
    pub async fn health_check(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

const CREATE_PROFILES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS profiles (
    profile_id   BIGSERIAL PRIMARY KEY,
    profile_type SMALLINT NOT NULL,
    first_name   TEXT NOT NULL,
    last_name    TEXT NOT NULL,
    profession   TEXT NOT NULL,
    balance      NUMERIC(20, 2) NOT NULL DEFAULT 0
)
"#;

const CREATE_CONTRACTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS contracts (
    contract_id   BIGSERIAL PRIMARY KEY,
    client_id     BIGINT NOT NULL REFERENCES profiles(profile_id),
    contractor_id BIGINT NOT NULL REFERENCES profiles(profile_id),
    terms         TEXT NOT NULL DEFAULT '',
    status        SMALLINT NOT NULL DEFAULT 1
)
"#;

const CREATE_JOBS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS jobs (
    job_id       BIGSERIAL PRIMARY KEY,
    contract_id  BIGINT NOT NULL REFERENCES contracts(contract_id),
    description  TEXT NOT NULL DEFAULT '',
    price        NUMERIC(20, 2) NOT NULL,
    paid         BOOLEAN,
    payment_date TIMESTAMPTZ
)
"#;

const CREATE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_jobs_contract ON jobs (contract_id)",
    "CREATE INDEX IF NOT EXISTS idx_jobs_payment_date ON jobs (payment_date) WHERE paid IS TRUE",
    "CREATE INDEX IF NOT EXISTS idx_contracts_client ON contracts (client_id)",
    "CREATE INDEX IF NOT EXISTS idx_contracts_contractor ON contracts (contractor_id)",
];

/// Create the profiles/contracts/jobs tables if they do not exist yet.
/// Idempotent; runs at every startup.
pub async fn init_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    tracing::info!("Initializing PostgreSQL schema...");

    sqlx::query(CREATE_PROFILES_TABLE).execute(pool).await?;
    sqlx::query(CREATE_CONTRACTS_TABLE).execute(pool).await?;
    sqlx::query(CREATE_JOBS_TABLE).execute(pool).await?;
    for stmt in CREATE_INDEXES {
        sqlx::query(stmt).execute(pool).await?;
    }

    Ok(())
}
