// server/src/db/mod.rs

//! Runtime SQL queries, grouped by table.

pub mod bookings;
pub mod cars;
pub mod dashboard;
pub mod payments;
pub mod payouts;
pub mod reference;
pub mod reviews;
pub mod seed;
pub mod sessions;
pub mod support;
pub mod users;

use crate::errors::Result as AppResult;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

pub async fn connect(database_url: &str, max_connections: u32) -> AppResult<PgPool> {
  let pool = PgPoolOptions::new()
    .max_connections(max_connections)
    .connect(database_url)
    .await?;
  info!(max_connections, "Connected to the database.");
  Ok(pool)
}

pub async fn run_migrations(pool: &PgPool) -> AppResult<()> {
  MIGRATOR.run(pool).await?;
  info!("Database migrations applied.");
  Ok(())
}
