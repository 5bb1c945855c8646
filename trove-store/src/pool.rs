use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use trove_core::TroveError;

use crate::store_err;

/// Open a connection pool against `database_url`.
///
/// # Errors
/// Returns [`TroveError::Store`] when the pool cannot be established.
pub async fn connect(database_url: &str) -> Result<PgPool, TroveError> {
    PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
        .map_err(store_err)
}

/// Apply the embedded schema migrations.
///
/// # Errors
/// Returns [`TroveError::Store`] when a migration fails.
pub async fn migrate(pool: &PgPool) -> Result<(), TroveError> {
    sqlx::migrate!()
        .run(pool)
        .await
        .map_err(|e| TroveError::store(e.to_string()))
}
