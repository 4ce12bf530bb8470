// server/src/models/car.rs

use carshare_core::pricing::Rates;
use carshare_core::CarStatus;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Car {
  pub id: Uuid,
  pub brand: String,
  pub model: String,
  pub year: i32,
  pub transmission_id: i32,
  pub engine_type: String,
  pub description: String,
  pub price_per_hour_cents: i64,
  pub price_per_day_cents: i64,
  pub mileage_limit: Option<i32>,
  pub status: CarStatus,
  pub latitude: Option<f64>,
  pub longitude: Option<f64>,
  pub address: String,
  pub partner_id: Uuid,
  pub category_id: Option<i32>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Car {
  pub fn rates(&self) -> Rates {
    Rates {
      per_hour_cents: self.price_per_hour_cents,
      per_day_cents: self.price_per_day_cents,
    }
  }

  pub fn title(&self) -> String {
    format!("{} {} ({})", self.brand, self.model, self.year)
  }
}

/// A car joined with the names a listing shows next to it.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CarListing {
  #[sqlx(flatten)]
  #[serde(flatten)]
  pub car: Car,
  pub transmission_name: String,
  pub category_name: Option<String>,
  pub partner_username: String,
  pub primary_image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CarImage {
  pub id: Uuid,
  pub car_id: Uuid,
  pub url: String,
  pub is_primary: bool,
  pub created_at: DateTime<Utc>,
}

pub const CAR_COLUMNS: &str = "c.id, c.brand, c.model, c.year, c.transmission_id, c.engine_type, c.description, \
   c.price_per_hour_cents, c.price_per_day_cents, c.mileage_limit, c.status, c.latitude, c.longitude, c.address, \
   c.partner_id, c.category_id, c.created_at, c.updated_at";
