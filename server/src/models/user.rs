// server/src/models/user.rs

use carshare_core::Role;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
  pub id: Uuid,
  pub email: String,
  pub username: String,
  #[serde(skip_serializing)]
  pub password_hash: String,
  pub first_name: String,
  pub last_name: String,
  pub phone: Option<String>,
  pub driver_license: Option<String>,
  pub is_verified: bool,
  pub role: Role,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl User {
  /// "First Last", falling back to the username when both are blank.
  pub fn full_name(&self) -> String {
    let name = format!("{} {}", self.first_name.trim(), self.last_name.trim());
    let name = name.trim();
    if name.is_empty() {
      self.username.clone()
    } else {
      name.to_string()
    }
  }
}

pub const USER_COLUMNS: &str = "id, email, username, password_hash, first_name, last_name, phone, driver_license, \
   is_verified, role, created_at, updated_at";
