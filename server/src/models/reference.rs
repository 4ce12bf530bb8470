// server/src/models/reference.rs

use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct TransmissionType {
  pub id: i32,
  pub name: String,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CarCategory {
  pub id: i32,
  pub name: String,
  pub description: String,
}
