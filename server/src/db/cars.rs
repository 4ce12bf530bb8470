// server/src/db/cars.rs

use crate::db::bookings::blocking_statuses_sql;
use crate::errors::Result as AppResult;
use crate::models::car::CAR_COLUMNS;
use crate::models::{Car, CarImage, CarListing};
use carshare_core::CarStatus;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

/// Listing order for the car catalogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CarSort {
  PriceAsc,
  PriceDesc,
  #[default]
  Newest,
}

impl CarSort {
  /// Unknown values fall back to newest first.
  pub fn parse(raw: Option<&str>) -> Self {
    match raw.map(str::trim) {
      Some("price_asc") => CarSort::PriceAsc,
      Some("price_desc") => CarSort::PriceDesc,
      _ => CarSort::Newest,
    }
  }

  fn order_by(self) -> &'static str {
    match self {
      CarSort::PriceAsc => "c.price_per_hour_cents ASC, c.created_at DESC",
      CarSort::PriceDesc => "c.price_per_hour_cents DESC, c.created_at DESC",
      CarSort::Newest => "c.created_at DESC",
    }
  }
}

/// Fields a partner supplies when listing or editing a car.
#[derive(Debug, Clone, Deserialize)]
pub struct CarInput {
  pub brand: String,
  pub model: String,
  pub year: i32,
  pub transmission_id: i32,
  pub engine_type: String,
  #[serde(default)]
  pub description: String,
  pub price_per_hour_cents: i64,
  pub price_per_day_cents: i64,
  pub mileage_limit: Option<i32>,
  pub latitude: Option<f64>,
  pub longitude: Option<f64>,
  #[serde(default)]
  pub address: String,
  pub category_id: Option<i32>,
}

fn listing_select() -> String {
  format!(
    "SELECT {}, t.name AS transmission_name, cat.name AS category_name, u.username AS partner_username, \
       (SELECT i.url FROM car_images i WHERE i.car_id = c.id ORDER BY i.is_primary DESC, i.created_at ASC LIMIT 1) \
         AS primary_image_url \
     FROM cars c \
     JOIN transmission_types t ON t.id = c.transmission_id \
     LEFT JOIN car_categories cat ON cat.id = c.category_id \
     JOIN users u ON u.id = c.partner_id",
    CAR_COLUMNS
  )
}

/// `%term%` with the LIKE metacharacters of `term` escaped, so user input matches literally.
fn contains_pattern(term: &str) -> String {
  let mut pattern = String::with_capacity(term.len() + 2);
  pattern.push('%');
  for c in term.chars() {
    if matches!(c, '\\' | '%' | '_') {
      pattern.push('\\');
    }
    pattern.push(c);
  }
  pattern.push('%');
  pattern
}

/// Up to `limit` available cars, optionally filtered by a case-insensitive search over
/// brand, model and description.
pub async fn home_cars(pool: &PgPool, search: Option<&str>, limit: i64) -> AppResult<Vec<CarListing>> {
  let pattern = search.map(str::trim).filter(|s| !s.is_empty()).map(contains_pattern);
  let sql = format!(
    "{} WHERE c.status = 'available' \
       AND ($1::text IS NULL OR c.brand ILIKE $1 OR c.model ILIKE $1 OR c.description ILIKE $1) \
     ORDER BY c.created_at DESC LIMIT $2",
    listing_select()
  );
  Ok(
    sqlx::query_as::<_, CarListing>(&sql)
      .bind(pattern)
      .bind(limit)
      .fetch_all(pool)
      .await?,
  )
}

pub async fn list_available(pool: &PgPool, category_id: Option<i32>, sort: CarSort) -> AppResult<Vec<CarListing>> {
  let sql = format!(
    "{} WHERE c.status = 'available' AND ($1::int IS NULL OR c.category_id = $1) ORDER BY {}",
    listing_select(),
    sort.order_by()
  );
  Ok(sqlx::query_as::<_, CarListing>(&sql).bind(category_id).fetch_all(pool).await?)
}

pub async fn list_all(pool: &PgPool) -> AppResult<Vec<CarListing>> {
  let sql = format!("{} ORDER BY c.created_at DESC", listing_select());
  Ok(sqlx::query_as::<_, CarListing>(&sql).fetch_all(pool).await?)
}

pub async fn list_by_partner(pool: &PgPool, partner_id: Uuid) -> AppResult<Vec<CarListing>> {
  let sql = format!("{} WHERE c.partner_id = $1 ORDER BY c.created_at DESC", listing_select());
  Ok(sqlx::query_as::<_, CarListing>(&sql).bind(partner_id).fetch_all(pool).await?)
}

pub async fn get_listing(pool: &PgPool, id: Uuid) -> AppResult<Option<CarListing>> {
  let sql = format!("{} WHERE c.id = $1", listing_select());
  Ok(sqlx::query_as::<_, CarListing>(&sql).bind(id).fetch_optional(pool).await?)
}

pub async fn get_car<'e>(exec: impl PgExecutor<'e>, id: Uuid) -> AppResult<Option<Car>> {
  let sql = format!("SELECT {} FROM cars c WHERE c.id = $1", CAR_COLUMNS);
  Ok(sqlx::query_as::<_, Car>(&sql).bind(id).fetch_optional(exec).await?)
}

pub async fn insert_car(pool: &PgPool, partner_id: Uuid, input: &CarInput) -> AppResult<Car> {
  let sql = format!(
    "INSERT INTO cars AS c (brand, model, year, transmission_id, engine_type, description, price_per_hour_cents, \
       price_per_day_cents, mileage_limit, latitude, longitude, address, category_id, partner_id) \
     VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14) RETURNING {}",
    CAR_COLUMNS
  );
  Ok(
    bind_input(sqlx::query_as::<_, Car>(&sql), input)
      .bind(partner_id)
      .fetch_one(pool)
      .await?,
  )
}

pub async fn update_car(pool: &PgPool, id: Uuid, input: &CarInput) -> AppResult<Option<Car>> {
  let sql = format!(
    "UPDATE cars AS c SET brand = $1, model = $2, year = $3, transmission_id = $4, engine_type = $5, \
       description = $6, price_per_hour_cents = $7, price_per_day_cents = $8, mileage_limit = $9, \
       latitude = $10, longitude = $11, address = $12, category_id = $13, updated_at = NOW() \
     WHERE c.id = $14 RETURNING {}",
    CAR_COLUMNS
  );
  Ok(
    bind_input(sqlx::query_as::<_, Car>(&sql), input)
      .bind(id)
      .fetch_optional(pool)
      .await?,
  )
}

fn bind_input<'q>(
  query: sqlx::query::QueryAs<'q, sqlx::Postgres, Car, sqlx::postgres::PgArguments>,
  input: &'q CarInput,
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, Car, sqlx::postgres::PgArguments> {
  query
    .bind(&input.brand)
    .bind(&input.model)
    .bind(input.year)
    .bind(input.transmission_id)
    .bind(&input.engine_type)
    .bind(&input.description)
    .bind(input.price_per_hour_cents)
    .bind(input.price_per_day_cents)
    .bind(input.mileage_limit)
    .bind(input.latitude)
    .bind(input.longitude)
    .bind(&input.address)
    .bind(input.category_id)
}

pub async fn delete_car(pool: &PgPool, id: Uuid) -> AppResult<bool> {
  let result = sqlx::query("DELETE FROM cars WHERE id = $1").bind(id).execute(pool).await?;
  Ok(result.rows_affected() > 0)
}

pub async fn set_status<'e>(exec: impl PgExecutor<'e>, id: Uuid, status: CarStatus) -> AppResult<()> {
  sqlx::query("UPDATE cars SET status = $2, updated_at = NOW() WHERE id = $1")
    .bind(id)
    .bind(status)
    .execute(exec)
    .await?;
  Ok(())
}

/// True when no confirmed or active booking of the car overlaps `[start, end)`.
pub async fn is_available_for(pool: &PgPool, car_id: Uuid, start: DateTime<Utc>, end: DateTime<Utc>) -> AppResult<bool> {
  let sql = format!(
    "SELECT NOT EXISTS(SELECT 1 FROM bookings WHERE car_id = $1 AND status IN ({}) \
       AND start_date < $3 AND end_date > $2)",
    blocking_statuses_sql()
  );
  Ok(
    sqlx::query_scalar::<_, bool>(&sql)
      .bind(car_id)
      .bind(start)
      .bind(end)
      .fetch_one(pool)
      .await?,
  )
}

pub async fn list_images(pool: &PgPool, car_id: Uuid) -> AppResult<Vec<CarImage>> {
  Ok(
    sqlx::query_as::<_, CarImage>(
      "SELECT id, car_id, url, is_primary, created_at FROM car_images WHERE car_id = $1 \
       ORDER BY is_primary DESC, created_at ASC",
    )
    .bind(car_id)
    .fetch_all(pool)
    .await?,
  )
}

/// Attaches an image; a new primary image demotes the previous one.
pub async fn add_image(pool: &PgPool, car_id: Uuid, url: &str, is_primary: bool) -> AppResult<CarImage> {
  let mut tx = pool.begin().await?;
  if is_primary {
    sqlx::query("UPDATE car_images SET is_primary = FALSE WHERE car_id = $1")
      .bind(car_id)
      .execute(&mut *tx)
      .await?;
  }
  let image = sqlx::query_as::<_, CarImage>(
    "INSERT INTO car_images (car_id, url, is_primary) VALUES ($1, $2, $3) \
     RETURNING id, car_id, url, is_primary, created_at",
  )
  .bind(car_id)
  .bind(url)
  .bind(is_primary)
  .fetch_one(&mut *tx)
  .await?;
  tx.commit().await?;
  Ok(image)
}

pub async fn delete_image(pool: &PgPool, car_id: Uuid, image_id: Uuid) -> AppResult<bool> {
  let result = sqlx::query("DELETE FROM car_images WHERE id = $1 AND car_id = $2")
    .bind(image_id)
    .bind(car_id)
    .execute(pool)
    .await?;
  Ok(result.rows_affected() > 0)
}

pub async fn count_cars(pool: &PgPool, status: Option<CarStatus>) -> AppResult<i64> {
  Ok(
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM cars WHERE ($1::car_status IS NULL OR status = $1)")
      .bind(status)
      .fetch_one(pool)
      .await?,
  )
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn sort_parsing_falls_back_to_newest() {
    assert_eq!(CarSort::parse(Some("price_asc")), CarSort::PriceAsc);
    assert_eq!(CarSort::parse(Some("price_desc")), CarSort::PriceDesc);
    assert_eq!(CarSort::parse(Some("rating")), CarSort::Newest);
    assert_eq!(CarSort::parse(None), CarSort::Newest);
    assert!(CarSort::PriceAsc.order_by().starts_with("c.price_per_hour_cents ASC"));
  }

  #[test]
  fn search_terms_match_literally() {
    assert_eq!(contains_pattern("golf"), "%golf%");
    assert_eq!(contains_pattern("100%"), "%100\\%%");
    assert_eq!(contains_pattern("x_drive"), "%x\\_drive%");
    assert_eq!(contains_pattern(r"a\b"), r"%a\\b%");
  }

  #[test]
  fn listing_query_selects_every_car_column() {
    let sql = listing_select();
    for column in CAR_COLUMNS.split(',') {
      assert!(sql.contains(column.trim()), "missing {}", column);
    }
    assert!(sql.contains("primary_image_url"));
  }
}
