// server/src/models/booking.rs

use carshare_core::booking::BookingPeriod;
use carshare_core::{BookingStatus, DomainResult};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Booking {
  pub id: Uuid,
  pub client_id: Uuid,
  pub car_id: Uuid,
  pub start_date: DateTime<Utc>,
  pub end_date: DateTime<Utc>,
  pub calculated_price_cents: i64,
  pub final_price_cents: i64,
  pub status: BookingStatus,
  pub start_mileage: Option<i32>,
  pub end_mileage: Option<i32>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Booking {
  pub fn period(&self) -> DomainResult<BookingPeriod> {
    BookingPeriod::new(self.start_date, self.end_date)
  }
}

/// A booking with the car and client names lists show.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct BookingSummary {
  #[sqlx(flatten)]
  #[serde(flatten)]
  pub booking: Booking,
  pub car_brand: String,
  pub car_model: String,
  pub car_partner_id: Uuid,
  pub client_username: String,
}

pub const BOOKING_COLUMNS: &str = "b.id, b.client_id, b.car_id, b.start_date, b.end_date, b.calculated_price_cents, \
   b.final_price_cents, b.status, b.start_mileage, b.end_mileage, b.created_at, b.updated_at";
