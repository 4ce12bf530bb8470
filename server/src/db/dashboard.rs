// server/src/db/dashboard.rs

use crate::db::{bookings, cars, payments};
use crate::errors::Result as AppResult;
use crate::models::BookingSummary;
use carshare_core::{BookingStatus, CarStatus};
use serde::Serialize;
use sqlx::PgPool;

pub const RECENT_BOOKINGS: i64 = 10;

#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
  pub total_cars: i64,
  pub available_cars: i64,
  pub total_bookings: i64,
  pub active_bookings: i64,
  pub total_users: i64,
  pub total_revenue_cents: i64,
  pub recent_bookings: Vec<BookingSummary>,
}

pub async fn fetch_stats(pool: &PgPool) -> AppResult<DashboardStats> {
  let total_users = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users").fetch_one(pool).await?;
  Ok(DashboardStats {
    total_cars: cars::count_cars(pool, None).await?,
    available_cars: cars::count_cars(pool, Some(CarStatus::Available)).await?,
    total_bookings: bookings::count_bookings(pool, None).await?,
    active_bookings: bookings::count_bookings(pool, Some(BookingStatus::Active)).await?,
    total_users,
    total_revenue_cents: payments::total_revenue(pool).await?,
    recent_bookings: bookings::recent(pool, RECENT_BOOKINGS).await?,
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::db::bookings::StatusChange;
  use crate::pipelines::test_support::{at, db_test_state, insert_test_booking, insert_test_car, insert_test_user};
  use carshare_core::Role;

  #[tokio::test]
  async fn revenue_sums_final_prices_of_every_booking() {
    let Some(state) = db_test_state().await else { return };
    let pool = &state.db_pool;
    assert_eq!(fetch_stats(pool).await.unwrap().total_revenue_cents, 0);

    let partner = insert_test_user(&state, Role::Partner).await;
    let client = insert_test_user(&state, Role::Client).await;
    let car = insert_test_car(&state, &partner).await;
    insert_test_booking(&state, &client, &car, at("2099-07-01T10:00"), at("2099-07-02T10:00"), 100_000).await;
    let active = insert_test_booking(&state, &client, &car, at("2099-07-03T10:00"), at("2099-07-03T12:00"), 2_000).await;
    bookings::update_status(pool, active.id, BookingStatus::Active, StatusChange::default())
      .await
      .unwrap();
    let cancelled = insert_test_booking(&state, &client, &car, at("2099-07-04T10:00"), at("2099-07-04T11:00"), 1_000).await;
    bookings::update_status(pool, cancelled.id, BookingStatus::Cancelled, StatusChange::default())
      .await
      .unwrap();

    let stats = fetch_stats(pool).await.unwrap();
    assert_eq!(stats.total_revenue_cents, 103_000);
    assert_eq!(stats.total_bookings, 3);
    assert_eq!(stats.active_bookings, 1);
    assert_eq!(stats.total_users, 2);
    assert_eq!((stats.total_cars, stats.available_cars), (1, 1));
    assert_eq!(stats.recent_bookings.len(), 3);
  }
}
