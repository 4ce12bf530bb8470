// server/src/models/payout.rs

use carshare_core::PayoutStatus;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PartnerPayout {
  pub id: Uuid,
  pub partner_id: Uuid,
  pub amount_cents: i64,
  pub status: PayoutStatus,
  pub processed_by: Option<Uuid>,
  pub requested_at: DateTime<Utc>,
  pub processed_at: Option<DateTime<Utc>>,
}
