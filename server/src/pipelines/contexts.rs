// server/src/pipelines/contexts.rs

//! Data structs the pipelines run over. Handlers receive them wrapped in `ContextData`.
//! Each struct is the registry key of exactly one pipeline.

use crate::models::{Booking, Car, PartnerPayout, Payment, Review, User};
use crate::pipelines::expired_bookings_pipeline::SweepReport;
use crate::services::payment_mock::MockPaymentIntent;
use crate::state::AppState;
use carshare_core::booking::BookingPeriod;
use carshare_core::payout::PartnerBalance;
use carshare_core::review::Ratings;
use carshare_core::{BookingStatus, PaymentType};
use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Clone)]
pub struct SignupCtxData {
  pub app_state: AppState,
  pub email: String,
  pub username: String,
  pub password: String,
  pub first_name: String,
  pub last_name: String,
  pub phone: Option<String>,
  pub driver_license: Option<String>,
  pub created_user: Option<User>,
  pub session_token: Option<String>,
  pub welcome_sent: bool,
}

#[derive(Clone)]
pub struct SigninCtxData {
  pub app_state: AppState,
  pub email: String,
  pub password: String,
  pub user: Option<User>,
  pub session_token: Option<String>,
}

#[derive(Clone)]
pub struct BookingCtxData {
  pub app_state: AppState,
  pub client: User,
  pub car_id: Uuid,
  pub start_raw: String,
  pub end_raw: String,
  pub now: DateTime<Utc>,
  pub period: Option<BookingPeriod>,
  pub car: Option<Car>,
  pub price_cents: Option<i64>,
  pub booking: Option<Booking>,
  pub notification_sent: bool,
}

impl BookingCtxData {
  pub fn new(app_state: AppState, client: User, car_id: Uuid, start_raw: String, end_raw: String) -> Self {
    Self {
      app_state,
      client,
      car_id,
      start_raw,
      end_raw,
      now: Utc::now(),
      period: None,
      car: None,
      price_cents: None,
      booking: None,
      notification_sent: false,
    }
  }
}

#[derive(Clone)]
pub struct BookingStatusCtxData {
  pub app_state: AppState,
  pub actor: User,
  pub booking_id: Uuid,
  pub target: BookingStatus,
  pub start_mileage: Option<i32>,
  pub end_mileage: Option<i32>,
  pub final_price_cents: Option<i64>,
  pub booking: Option<Booking>,
  pub updated: Option<Booking>,
}

#[derive(Clone)]
pub struct PaymentCtxData {
  pub app_state: AppState,
  pub client: User,
  pub booking_id: Uuid,
  pub payment_type: PaymentType,
  pub booking: Option<Booking>,
  pub amount_cents: Option<i64>,
  pub intent: Option<MockPaymentIntent>,
  pub payment: Option<Payment>,
}

#[derive(Clone)]
pub struct ReviewCtxData {
  pub app_state: AppState,
  pub client: User,
  pub booking_id: Uuid,
  pub ratings: Ratings,
  pub comment: String,
  pub booking: Option<Booking>,
  pub review: Option<Review>,
}

#[derive(Clone)]
pub struct PayoutRequestCtxData {
  pub app_state: AppState,
  pub partner: User,
  pub amount_cents: i64,
  pub balance: Option<PartnerBalance>,
  pub payout: Option<PartnerPayout>,
}

#[derive(Clone)]
pub struct ExpiredBookingsCtxData {
  pub app_state: AppState,
  pub now: DateTime<Utc>,
  pub expired: Vec<Booking>,
  pub report: SweepReport,
}
