// server/src/db/users.rs

use crate::errors::Result as AppResult;
use crate::models::user::{User, USER_COLUMNS};
use carshare_core::Role;
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct NewUser {
  pub email: String,
  pub username: String,
  pub password_hash: String,
  pub first_name: String,
  pub last_name: String,
  pub phone: Option<String>,
  pub driver_license: Option<String>,
  pub role: Role,
}

#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
  pub first_name: Option<String>,
  pub last_name: Option<String>,
  pub phone: Option<String>,
  pub driver_license: Option<String>,
}

pub async fn find_by_email(pool: &PgPool, email: &str) -> AppResult<Option<User>> {
  let sql = format!("SELECT {} FROM users WHERE LOWER(email) = LOWER($1)", USER_COLUMNS);
  Ok(sqlx::query_as::<_, User>(&sql).bind(email).fetch_optional(pool).await?)
}

/// Which of the two unique identifiers is already in use, if any.
pub async fn taken_identifier(pool: &PgPool, email: &str, username: &str) -> AppResult<Option<&'static str>> {
  let (email_taken, username_taken): (bool, bool) = sqlx::query_as(
    "SELECT EXISTS(SELECT 1 FROM users WHERE LOWER(email) = LOWER($1)), \
            EXISTS(SELECT 1 FROM users WHERE LOWER(username) = LOWER($2))",
  )
  .bind(email)
  .bind(username)
  .fetch_one(pool)
  .await?;
  Ok(if email_taken {
    Some("email")
  } else if username_taken {
    Some("username")
  } else {
    None
  })
}

pub async fn insert_user<'e>(exec: impl PgExecutor<'e>, new_user: &NewUser) -> AppResult<User> {
  let sql = format!(
    "INSERT INTO users (email, username, password_hash, first_name, last_name, phone, driver_license, role) \
     VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {}",
    USER_COLUMNS
  );
  let user = sqlx::query_as::<_, User>(&sql)
    .bind(&new_user.email)
    .bind(&new_user.username)
    .bind(&new_user.password_hash)
    .bind(&new_user.first_name)
    .bind(&new_user.last_name)
    .bind(&new_user.phone)
    .bind(&new_user.driver_license)
    .bind(new_user.role)
    .fetch_one(exec)
    .await?;
  Ok(user)
}

pub async fn update_profile(pool: &PgPool, id: Uuid, update: &ProfileUpdate) -> AppResult<Option<User>> {
  let sql = format!(
    "UPDATE users SET \
       first_name = COALESCE($2, first_name), \
       last_name = COALESCE($3, last_name), \
       phone = COALESCE($4, phone), \
       driver_license = COALESCE($5, driver_license), \
       updated_at = NOW() \
     WHERE id = $1 RETURNING {}",
    USER_COLUMNS
  );
  Ok(
    sqlx::query_as::<_, User>(&sql)
      .bind(id)
      .bind(&update.first_name)
      .bind(&update.last_name)
      .bind(&update.phone)
      .bind(&update.driver_license)
      .fetch_optional(pool)
      .await?,
  )
}

pub async fn list_users(pool: &PgPool, role: Option<Role>) -> AppResult<Vec<User>> {
  let sql = format!(
    "SELECT {} FROM users WHERE ($1::user_role IS NULL OR role = $1) ORDER BY created_at DESC",
    USER_COLUMNS
  );
  Ok(sqlx::query_as::<_, User>(&sql).bind(role).fetch_all(pool).await?)
}

pub async fn set_role(pool: &PgPool, id: Uuid, role: Role) -> AppResult<Option<User>> {
  let sql = format!(
    "UPDATE users SET role = $2, updated_at = NOW() WHERE id = $1 RETURNING {}",
    USER_COLUMNS
  );
  Ok(sqlx::query_as::<_, User>(&sql).bind(id).bind(role).fetch_optional(pool).await?)
}
