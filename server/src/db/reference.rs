// server/src/db/reference.rs

use crate::errors::Result as AppResult;
use crate::models::{CarCategory, TransmissionType};
use sqlx::PgPool;
use tracing::info;

pub const TRANSMISSIONS: [&str; 2] = ["automatic", "manual"];

pub const CATEGORIES: [(&str, &str); 5] = [
  ("Economy", "Affordable cars for everyday trips"),
  ("Comfort", "Comfortable cars for longer journeys"),
  ("Business", "Premium cars for business trips"),
  ("SUV", "Spacious off-road vehicles"),
  ("Premium", "Luxury cars for special occasions"),
];

pub async fn list_transmissions(pool: &PgPool) -> AppResult<Vec<TransmissionType>> {
  Ok(
    sqlx::query_as::<_, TransmissionType>("SELECT id, name FROM transmission_types ORDER BY id")
      .fetch_all(pool)
      .await?,
  )
}

pub async fn list_categories(pool: &PgPool) -> AppResult<Vec<CarCategory>> {
  Ok(
    sqlx::query_as::<_, CarCategory>("SELECT id, name, description FROM car_categories ORDER BY id")
      .fetch_all(pool)
      .await?,
  )
}

pub async fn transmission_id(pool: &PgPool, name: &str) -> AppResult<Option<i32>> {
  Ok(
    sqlx::query_scalar::<_, i32>("SELECT id FROM transmission_types WHERE name = $1")
      .bind(name)
      .fetch_optional(pool)
      .await?,
  )
}

pub async fn category_id(pool: &PgPool, name: &str) -> AppResult<Option<i32>> {
  Ok(
    sqlx::query_scalar::<_, i32>("SELECT id FROM car_categories WHERE name = $1")
      .bind(name)
      .fetch_optional(pool)
      .await?,
  )
}

/// Inserts the fixed transmissions and categories; rows that exist are left alone.
/// Returns how many rows were created.
pub async fn load_initial_data(pool: &PgPool) -> AppResult<u64> {
  let mut created = 0;
  for name in TRANSMISSIONS {
    created += sqlx::query("INSERT INTO transmission_types (name) VALUES ($1) ON CONFLICT (name) DO NOTHING")
      .bind(name)
      .execute(pool)
      .await?
      .rows_affected();
  }
  for (name, description) in CATEGORIES {
    created += sqlx::query(
      "INSERT INTO car_categories (name, description) VALUES ($1, $2) ON CONFLICT (name) DO NOTHING",
    )
    .bind(name)
    .bind(description)
    .execute(pool)
    .await?
    .rows_affected();
  }
  info!(created, "Reference data loaded.");
  Ok(created)
}
