// server/src/db/bookings.rs

use crate::errors::Result as AppResult;
use crate::models::booking::BOOKING_COLUMNS;
use crate::models::{Booking, BookingSummary};
use carshare_core::BookingStatus;
use chrono::{DateTime, Utc};
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

/// `'confirmed', 'active'`, for `status IN (...)` clauses.
pub fn blocking_statuses_sql() -> String {
  BookingStatus::BLOCKING
    .iter()
    .map(|s| format!("'{}'", s.as_str()))
    .collect::<Vec<_>>()
    .join(", ")
}

fn summary_select() -> String {
  format!(
    "SELECT {}, c.brand AS car_brand, c.model AS car_model, c.partner_id AS car_partner_id, \
       u.username AS client_username \
     FROM bookings b JOIN cars c ON c.id = b.car_id JOIN users u ON u.id = b.client_id",
    BOOKING_COLUMNS
  )
}

/// Whether a blocking booking of `car_id` overlaps `[start, end)`.
pub async fn has_overlap<'e>(
  exec: impl PgExecutor<'e>,
  car_id: Uuid,
  start: DateTime<Utc>,
  end: DateTime<Utc>,
) -> AppResult<bool> {
  let sql = format!(
    "SELECT EXISTS(SELECT 1 FROM bookings WHERE car_id = $1 AND status IN ({}) \
       AND start_date < $3 AND end_date > $2)",
    blocking_statuses_sql()
  );
  Ok(
    sqlx::query_scalar::<_, bool>(&sql)
      .bind(car_id)
      .bind(start)
      .bind(end)
      .fetch_one(exec)
      .await?,
  )
}

/// Inserts a `confirmed` booking whose final price starts out equal to the calculated one.
pub async fn insert_booking<'e>(
  exec: impl PgExecutor<'e>,
  client_id: Uuid,
  car_id: Uuid,
  start: DateTime<Utc>,
  end: DateTime<Utc>,
  price_cents: i64,
) -> AppResult<Booking> {
  let sql = format!(
    "INSERT INTO bookings AS b (client_id, car_id, start_date, end_date, calculated_price_cents, final_price_cents, status) \
     VALUES ($1, $2, $3, $4, $5, $5, $6) RETURNING {}",
    BOOKING_COLUMNS
  );
  Ok(
    sqlx::query_as::<_, Booking>(&sql)
      .bind(client_id)
      .bind(car_id)
      .bind(start)
      .bind(end)
      .bind(price_cents)
      .bind(BookingStatus::Confirmed)
      .fetch_one(exec)
      .await?,
  )
}

pub async fn get_booking<'e>(exec: impl PgExecutor<'e>, id: Uuid) -> AppResult<Option<Booking>> {
  let sql = format!("SELECT {} FROM bookings b WHERE b.id = $1", BOOKING_COLUMNS);
  Ok(sqlx::query_as::<_, Booking>(&sql).bind(id).fetch_optional(exec).await?)
}

pub async fn get_summary(pool: &PgPool, id: Uuid) -> AppResult<Option<BookingSummary>> {
  let sql = format!("{} WHERE b.id = $1", summary_select());
  Ok(sqlx::query_as::<_, BookingSummary>(&sql).bind(id).fetch_optional(pool).await?)
}

pub async fn list_for_client(pool: &PgPool, client_id: Uuid) -> AppResult<Vec<BookingSummary>> {
  let sql = format!("{} WHERE b.client_id = $1 ORDER BY b.created_at DESC", summary_select());
  Ok(sqlx::query_as::<_, BookingSummary>(&sql).bind(client_id).fetch_all(pool).await?)
}

pub async fn list_for_partner(pool: &PgPool, partner_id: Uuid) -> AppResult<Vec<BookingSummary>> {
  let sql = format!("{} WHERE c.partner_id = $1 ORDER BY b.created_at DESC", summary_select());
  Ok(sqlx::query_as::<_, BookingSummary>(&sql).bind(partner_id).fetch_all(pool).await?)
}

pub async fn list_all(pool: &PgPool, status: Option<BookingStatus>) -> AppResult<Vec<BookingSummary>> {
  let sql = format!(
    "{} WHERE ($1::booking_status IS NULL OR b.status = $1) ORDER BY b.created_at DESC",
    summary_select()
  );
  Ok(sqlx::query_as::<_, BookingSummary>(&sql).bind(status).fetch_all(pool).await?)
}

pub async fn recent(pool: &PgPool, limit: i64) -> AppResult<Vec<BookingSummary>> {
  let sql = format!("{} ORDER BY b.created_at DESC LIMIT $1", summary_select());
  Ok(sqlx::query_as::<_, BookingSummary>(&sql).bind(limit).fetch_all(pool).await?)
}

/// Field changes that go with a status transition. `None` keeps the stored value.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatusChange {
  pub start_mileage: Option<i32>,
  pub end_mileage: Option<i32>,
  pub final_price_cents: Option<i64>,
}

pub async fn update_status<'e>(
  exec: impl PgExecutor<'e>,
  id: Uuid,
  status: BookingStatus,
  change: StatusChange,
) -> AppResult<Booking> {
  let sql = format!(
    "UPDATE bookings AS b SET status = $2, \
       start_mileage = COALESCE($3, b.start_mileage), \
       end_mileage = COALESCE($4, b.end_mileage), \
       final_price_cents = COALESCE($5, b.final_price_cents), \
       updated_at = NOW() \
     WHERE b.id = $1 RETURNING {}",
    BOOKING_COLUMNS
  );
  Ok(
    sqlx::query_as::<_, Booking>(&sql)
      .bind(id)
      .bind(status)
      .bind(change.start_mileage)
      .bind(change.end_mileage)
      .bind(change.final_price_cents)
      .fetch_one(exec)
      .await?,
  )
}

/// Active bookings whose end date has passed.
pub async fn find_expired_active(pool: &PgPool, now: DateTime<Utc>) -> AppResult<Vec<Booking>> {
  let sql = format!(
    "SELECT {} FROM bookings b WHERE b.status = 'active' AND b.end_date < $1 ORDER BY b.end_date",
    BOOKING_COLUMNS
  );
  Ok(sqlx::query_as::<_, Booking>(&sql).bind(now).fetch_all(pool).await?)
}

pub async fn count_bookings(pool: &PgPool, status: Option<BookingStatus>) -> AppResult<i64> {
  Ok(
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM bookings WHERE ($1::booking_status IS NULL OR status = $1)")
      .bind(status)
      .fetch_one(pool)
      .await?,
  )
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn blocking_clause_lists_confirmed_and_active() {
    assert_eq!(blocking_statuses_sql(), "'confirmed', 'active'");
  }
}
