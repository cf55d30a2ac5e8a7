//! Process-wide database connection pool.

use once_cell::sync::OnceCell;
use sea_orm::{Database, DatabaseConnection, DbErr};

static DB_POOL: OnceCell<DatabaseConnection> = OnceCell::new();

/// Connects to the database and stores the pool. Later calls keep the first pool.
pub async fn init_db(database_url: String) -> Result<(), DbErr> {
    if DB_POOL.get().is_some() {
        log::debug!("init_db: pool already initialized");
        return Ok(());
    }

    let pool = Database::connect(&database_url).await?;
    if DB_POOL.set(pool).is_err() {
        log::warn!("init_db: lost a race initializing the pool, keeping the existing one");
    }

    Ok(())
}

/// Returns the shared pool.
///
/// # Panics
/// When called before [`init_db`].
pub fn get_db_pool() -> &'static DatabaseConnection {
    DB_POOL
        .get()
        .expect("Database pool requested before init_db() was called.")
}
