// server/src/models/support.rs

use carshare_core::ChatStatus;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct SupportChat {
  pub id: Uuid,
  pub client_id: Uuid,
  pub subject: String,
  pub status: ChatStatus,
  pub manager_id: Option<Uuid>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct SupportMessage {
  pub id: Uuid,
  pub chat_id: Uuid,
  pub sender_id: Uuid,
  pub body: String,
  pub created_at: DateTime<Utc>,
}
