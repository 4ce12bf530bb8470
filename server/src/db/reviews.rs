// server/src/db/reviews.rs

use crate::errors::{AppError, Result as AppResult};
use crate::models::{Review, ReviewWithAuthor};
use carshare_core::review::Ratings;
use sqlx::PgPool;
use uuid::Uuid;

pub async fn exists_for_booking(pool: &PgPool, booking_id: Uuid) -> AppResult<bool> {
  Ok(
    sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM reviews WHERE booking_id = $1)")
      .bind(booking_id)
      .fetch_one(pool)
      .await?,
  )
}

/// The unique index on `booking_id` turns a concurrent duplicate into `Conflict`.
pub async fn insert_review(pool: &PgPool, booking_id: Uuid, ratings: &Ratings, comment: &str) -> AppResult<Review> {
  sqlx::query_as::<_, Review>(
    "INSERT INTO reviews (booking_id, rating, comment, car_rating, partner_rating) VALUES ($1, $2, $3, $4, $5) \
     RETURNING id, booking_id, rating, comment, car_rating, partner_rating, created_at",
  )
  .bind(booking_id)
  .bind(ratings.rating)
  .bind(comment)
  .bind(ratings.car_rating)
  .bind(ratings.partner_rating)
  .fetch_one(pool)
  .await
  .map_err(|e| AppError::conflict_on_unique(e, "You have already reviewed this booking."))
}

pub async fn list_for_car(pool: &PgPool, car_id: Uuid) -> AppResult<Vec<ReviewWithAuthor>> {
  Ok(
    sqlx::query_as::<_, ReviewWithAuthor>(
      "SELECT r.id, r.booking_id, r.rating, r.comment, r.car_rating, r.partner_rating, r.created_at, \
         u.username AS author_username \
       FROM reviews r JOIN bookings b ON b.id = r.booking_id JOIN users u ON u.id = b.client_id \
       WHERE b.car_id = $1 ORDER BY r.created_at DESC",
    )
    .bind(car_id)
    .fetch_all(pool)
    .await?,
  )
}

pub async fn get_for_booking(pool: &PgPool, booking_id: Uuid) -> AppResult<Option<Review>> {
  Ok(
    sqlx::query_as::<_, Review>(
      "SELECT id, booking_id, rating, comment, car_rating, partner_rating, created_at FROM reviews WHERE booking_id = $1",
    )
    .bind(booking_id)
    .fetch_optional(pool)
    .await?,
  )
}
