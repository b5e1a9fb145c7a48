//! Database configuration for the console's local store.
//!
//! Only operator sessions and stock-correction drafts are stored locally. Tables are
//! generated from the entity definitions with `Schema::create_table_from_entity`, so
//! the schema always matches the Rust structs.

use crate::entities::{OperatorSession, StockCorrection};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};
use std::path::Path;

const DEFAULT_DATABASE_URL: &str = "sqlite://data/ops_console.sqlite?mode=rwc";

/// At most one pending stock draft per product.
const ONE_PENDING_DRAFT_INDEX: &str = "CREATE UNIQUE INDEX IF NOT EXISTS \
    idx_stock_corrections_pending_product ON stock_corrections (product_id) \
    WHERE status = 'pending'";

/// Gets the database URL from `DATABASE_URL` or returns the default `SQLite` path.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection to the local `SQLite` store.
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url();
    if let Some(parent) = sqlite_parent_dir(&database_url) {
        std::fs::create_dir_all(parent)?;
    }
    tracing::debug!("Connecting to local store at {}", database_url);
    Database::connect(&database_url).await.map_err(Into::into)
}

/// Directory that must exist before `SQLite` can create the file behind `url`.
fn sqlite_parent_dir(url: &str) -> Option<&Path> {
    let file = url.strip_prefix("sqlite://")?.split('?').next()?;
    Path::new(file)
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
}

/// Creates the local tables if they do not exist yet.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut session_table = schema.create_table_from_entity(OperatorSession);
    let mut draft_table = schema.create_table_from_entity(StockCorrection);

    db.execute(builder.build(session_table.if_not_exists()))
        .await?;
    db.execute(builder.build(draft_table.if_not_exists())).await?;
    db.execute_unprepared(ONE_PENDING_DRAFT_INDEX).await?;

    Ok(())
}
