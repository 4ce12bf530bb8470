// server/src/models/review.rs

use carshare_core::review::Ratings;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Review {
  pub id: Uuid,
  pub booking_id: Uuid,
  pub rating: i32,
  pub comment: String,
  pub car_rating: Option<i32>,
  pub partner_rating: Option<i32>,
  pub created_at: DateTime<Utc>,
}

impl Review {
  pub fn ratings(&self) -> Ratings {
    Ratings {
      rating: self.rating,
      car_rating: self.car_rating,
      partner_rating: self.partner_rating,
    }
  }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ReviewWithAuthor {
  #[sqlx(flatten)]
  #[serde(flatten)]
  pub review: Review,
  pub author_username: String,
}
