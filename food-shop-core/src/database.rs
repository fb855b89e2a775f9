use diesel::{Connection, ConnectionError};
use diesel_async::{
    async_connection_wrapper::AsyncConnectionWrapper,
    pooled_connection::{deadpool::BuildError, deadpool::Pool, AsyncDieselConnectionManager},
    AsyncPgConnection,
};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use thiserror::Error;
use tracing::info;

use crate::repositories::DbPool;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("./migrations");

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("cannot connect: {0}")]
    Connection(#[from] ConnectionError),
    #[error("cannot build pool: {0}")]
    Pool(#[from] BuildError),
    #[error("migration failed: {0}")]
    Migration(Box<dyn std::error::Error + Send + Sync>),
    #[error("migration task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

pub fn create_pool(database_url: &str, max_size: usize) -> Result<DbPool, DatabaseError> {
    let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(database_url);
    Ok(Pool::builder(manager).max_size(max_size).build()?)
}

/// Applies pending embedded migrations and returns how many ran.
pub async fn run_migrations(database_url: &str) -> Result<usize, DatabaseError> {
    let url = database_url.to_string();
    let applied = tokio::task::spawn_blocking(move || {
        let mut conn = AsyncConnectionWrapper::<AsyncPgConnection>::establish(&url)?;
        conn.run_pending_migrations(MIGRATIONS)
            .map(|versions| versions.len())
            .map_err(DatabaseError::Migration)
    })
    .await??;

    info!(applied, "migrations complete");
    Ok(applied)
}
