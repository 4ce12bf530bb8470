// server/src/db/sessions.rs

use crate::errors::{AppError, Result as AppResult};
use crate::models::user::USER_COLUMNS;
use crate::models::{Session, User};
use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

pub async fn create_session(pool: &PgPool, token: &str, user_id: Uuid, ttl_hours: i64) -> AppResult<Session> {
  let expires_at = session_expiry(Utc::now(), ttl_hours)?;
  let session = sqlx::query_as::<_, Session>(
    "INSERT INTO sessions (token, user_id, expires_at) VALUES ($1, $2, $3) \
     RETURNING token, user_id, created_at, expires_at",
  )
  .bind(token)
  .bind(user_id)
  .bind(expires_at)
  .fetch_one(pool)
  .await?;
  Ok(session)
}

fn session_expiry(now: DateTime<Utc>, ttl_hours: i64) -> AppResult<DateTime<Utc>> {
  Duration::try_hours(ttl_hours)
    .and_then(|ttl| now.checked_add_signed(ttl))
    .ok_or_else(|| AppError::Config(format!("Session TTL of {} hours is out of range.", ttl_hours)))
}

/// The user behind an unexpired session token.
pub async fn find_user_by_token(pool: &PgPool, token: &str) -> AppResult<Option<User>> {
  let columns = USER_COLUMNS
    .split(',')
    .map(|c| format!("u.{}", c.trim()))
    .collect::<Vec<_>>()
    .join(", ");
  let sql = format!(
    "SELECT {} FROM sessions s JOIN users u ON u.id = s.user_id WHERE s.token = $1 AND s.expires_at > NOW()",
    columns
  );
  Ok(sqlx::query_as::<_, User>(&sql).bind(token).fetch_optional(pool).await?)
}

pub async fn delete_session(pool: &PgPool, token: &str) -> AppResult<bool> {
  let result = sqlx::query("DELETE FROM sessions WHERE token = $1").bind(token).execute(pool).await?;
  Ok(result.rows_affected() > 0)
}

pub async fn purge_expired(pool: &PgPool) -> AppResult<u64> {
  let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= NOW()").execute(pool).await?;
  Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn session_expiry_rejects_out_of_range_ttls() {
    let now = Utc::now();
    assert_eq!(session_expiry(now, 72).unwrap(), now + Duration::hours(72));
    assert!(matches!(session_expiry(now, i64::MAX), Err(AppError::Config(_))));
    assert!(matches!(session_expiry(now, i64::MAX / 3_600_000), Err(AppError::Config(_))));
  }
}
