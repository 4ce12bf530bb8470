// server/src/models/payment.rs

use carshare_core::payment::PaymentEntry;
use carshare_core::{PaymentStatus, PaymentType};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Payment {
  pub id: Uuid,
  pub booking_id: Uuid,
  pub amount_cents: i64,
  pub payment_type: PaymentType,
  pub status: PaymentStatus,
  pub transaction_id: Option<String>,
  pub payment_date: DateTime<Utc>,
}

impl Payment {
  pub fn entry(&self) -> PaymentEntry {
    PaymentEntry {
      amount_cents: self.amount_cents,
      payment_type: self.payment_type,
      status: self.status,
    }
  }
}
